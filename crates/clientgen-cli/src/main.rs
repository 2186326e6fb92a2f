//! clientgen CLI entrypoint
//! Parses command-line arguments and dispatches to the core generator.

// Internal imports (std, crate)
use std::path::PathBuf;

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use clientgen_core::{Config, GenerationReport, PassReport};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "clientgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate API clients from an OpenAPI spec
    Generate(GenerateArgs),
    /// Write a configuration file with every default filled in
    Init {
        /// Path or URL of the OpenAPI spec the config points at
        #[arg(long)]
        spec: String,
        /// Where to write the config (YAML, JSON or TOML by extension)
        #[arg(long, default_value = "clientgen.yaml")]
        output: PathBuf,
    },
}

#[derive(clap::Args, Debug, Default)]
pub struct GenerateArgs {
    /// Path or URL to the OpenAPI spec (YAML or JSON)
    ///
    /// Example: --spec openapi.yaml
    /// Example: --spec https://example.com/openapi.json
    #[arg(long)]
    spec: Option<String>,
    /// Configuration file (YAML, JSON or TOML)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Generate the Go backend client
    #[arg(long)]
    backend: bool,
    /// Generate the TypeScript client, models and mocks
    #[arg(long)]
    frontend: bool,
    /// Output directory for the Go client
    #[arg(long)]
    backend_dir: Option<PathBuf>,
    /// Output directory for the TypeScript client
    #[arg(long)]
    frontend_client_dir: Option<PathBuf>,
    /// Output directory for the TypeScript models
    #[arg(long)]
    frontend_models_dir: Option<PathBuf>,
    /// Output directory for the Playwright mocks
    #[arg(long)]
    frontend_mocks_dir: Option<PathBuf>,
    /// Template override root
    #[arg(long)]
    template_dir: Option<PathBuf>,
    /// Skip generated test files
    #[arg(long)]
    no_tests: bool,
}

impl GenerateArgs {
    /// Load the config file (if any) and apply flag overrides on top
    async fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = match (&self.config, &self.spec) {
            (Some(path), _) => Config::from_file(path)
                .await
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            (None, Some(spec)) => Config::new(spec.clone()),
            (None, None) => anyhow::bail!("either --spec or --config is required"),
        };

        if let Some(spec) = &self.spec {
            config.spec_location = spec.clone();
        }
        if self.backend || self.frontend {
            config.targets.backend = self.backend;
            config.targets.frontend = self.frontend;
        }
        if let Some(dir) = &self.backend_dir {
            config.output.backend_dir = dir.clone();
        }
        if let Some(dir) = &self.frontend_client_dir {
            config.output.frontend_client_dir = dir.clone();
        }
        if let Some(dir) = &self.frontend_models_dir {
            config.output.frontend_models_dir = dir.clone();
        }
        if let Some(dir) = &self.frontend_mocks_dir {
            config.output.frontend_mocks_dir = dir.clone();
        }
        if let Some(dir) = &self.template_dir {
            config.template_dir = Some(dir.clone());
        }
        if self.no_tests {
            config.include_tests = false;
        }

        Ok(config)
    }
}

fn log_pass(bundle: &str, pass: &PassReport) {
    tracing::info!(
        bundle,
        files = pass.files_written,
        operations = pass.operations_rendered,
        schemas = pass.schemas_lowered,
        skipped = pass.skipped_schemas.len(),
        "pass complete"
    );
    for entry in &pass.unused_overrides {
        tracing::warn!(bundle, entry = entry.as_str(), "unused enum override");
    }
}

fn log_report(report: &GenerationReport) {
    if let Some(pass) = &report.backend {
        log_pass("backend", pass);
    }
    if let Some(pass) = &report.frontend {
        log_pass("frontend", pass);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Generate(args) => {
            let config = args.resolve_config().await?;
            if !config.targets.any() {
                tracing::warn!("neither --backend nor --frontend selected; nothing to do");
            }

            let report = clientgen_core::generate(&config)
                .await
                .with_context(|| format!("Failed to generate clients from {}", config.spec_location))?;
            log_report(&report);
        }
        Commands::Init { spec, output } => {
            Config::new(spec.clone())
                .save(output)
                .await
                .with_context(|| format!("Failed to write config to {}", output.display()))?;
            tracing::info!(path = %output.display(), "wrote config");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_args(args: &[&str]) -> GenerateArgs {
        let cli = Cli::try_parse_from(["clientgen", "generate"].iter().chain(args)).unwrap();
        match cli.command {
            Commands::Generate(args) => args,
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_generate_flags() {
        let args = generate_args(&[
            "--spec",
            "openapi.yaml",
            "--backend",
            "--backend-dir",
            "out/go",
            "--no-tests",
        ]);
        assert_eq!(args.spec.as_deref(), Some("openapi.yaml"));
        assert!(args.backend);
        assert!(!args.frontend);
        assert_eq!(args.backend_dir, Some(PathBuf::from("out/go")));
        assert!(args.no_tests);
    }

    #[test]
    fn test_parse_init() {
        let cli = Cli::try_parse_from(["clientgen", "init", "--spec", "openapi.yaml"]).unwrap();
        match cli.command {
            Commands::Init { spec, output } => {
                assert_eq!(spec, "openapi.yaml");
                assert_eq!(output, PathBuf::from("clientgen.yaml"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_flags_override_config_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("clientgen.yaml");
        let mut saved = Config::new("from-file.yaml");
        saved.targets.backend = true;
        saved.targets.frontend = true;
        saved.save(&path).await?;

        let args = generate_args(&[
            "--config",
            path.to_str().unwrap(),
            "--frontend",
            "--frontend-mocks-dir",
            "mocks",
        ]);
        let config = args.resolve_config().await?;
        assert_eq!(config.spec_location, "from-file.yaml");
        assert!(!config.targets.backend);
        assert!(config.targets.frontend);
        assert_eq!(config.output.frontend_mocks_dir, PathBuf::from("mocks"));
        assert!(config.include_tests);
        Ok(())
    }

    #[tokio::test]
    async fn test_spec_or_config_required() {
        let args = GenerateArgs::default();
        assert!(args.resolve_config().await.is_err());
    }
}
