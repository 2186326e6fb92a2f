//! Configuration management for clientgen code generation.
//!
//! This module defines the `Config` struct and related functionality for managing
//! code generation settings. The configuration can be loaded from a YAML, JSON or
//! TOML file (chosen by extension), created programmatically, or assembled from
//! command-line arguments.
//!
//! # Examples
//!
//! ```no_run
//! use clientgen_core::config::Config;
//!
//! # async fn example() -> clientgen_core::Result<()> {
//! // Create a new config programmatically
//! let mut config = Config::new("openapi.yaml");
//! config.targets.backend = true;
//! config.backend.module_path = "github.com/example/backend".to_string();
//!
//! // Or load from a config file
//! let config = Config::from_file("clientgen.yaml").await?;
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

// External imports (alphabetized)
use serde::{Deserialize, Deserializer, Serialize};
use serde_value::Value as SerdeValue;
use tokio::fs;

pub const DEFAULT_GO_PACKAGE: &str = "apiclient";
pub const DEFAULT_GO_MODULE: &str = "github.com/example/backend";
pub const DEFAULT_MODELS_IMPORT: &str = "@api/models";
pub const DEFAULT_ENUMS_IMPORT: &str = "./_unions";
pub const DEFAULT_BROWSER_BASE_URL: &str = "/api/proxy";
pub const DEFAULT_LOCAL_BASE_URL: &str = "http://localhost:8000";

/// Configuration for one generator run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path or http(s) URL of the OpenAPI document
    pub spec_location: String,

    /// Optional template override directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<PathBuf>,

    /// Whether to emit test files
    #[serde(default = "default_true")]
    pub include_tests: bool,

    /// Which target bundles to generate
    #[serde(default)]
    pub targets: Targets,

    /// Where each bundle is written
    #[serde(default)]
    pub output: OutputDirs,

    /// Go target settings
    #[serde(default)]
    pub backend: BackendSettings,

    /// TypeScript target settings
    #[serde(default)]
    pub frontend: FrontendSettings,

    /// Commands run after each pass
    #[serde(default)]
    pub post_generate: PostGenerateHooks,

    /// Extra `"Component.property" → Type` overrides merged onto the built-in table
    #[serde(default)]
    pub enum_overrides: BTreeMap<String, String>,

    /// Default literal for each overridden enum type
    #[serde(default)]
    pub enum_defaults: BTreeMap<String, String>,
}

/// Target selection; both off means there is nothing to do
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Targets {
    #[serde(default)]
    pub backend: bool,
    #[serde(default)]
    pub frontend: bool,
}

impl Targets {
    pub fn any(&self) -> bool {
        self.backend || self.frontend
    }
}

/// Output directories, one per bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputDirs {
    pub backend_dir: PathBuf,
    pub frontend_client_dir: PathBuf,
    pub frontend_models_dir: PathBuf,
    pub frontend_mocks_dir: PathBuf,
}

impl Default for OutputDirs {
    fn default() -> Self {
        Self {
            backend_dir: PathBuf::from("generated/golang"),
            frontend_client_dir: PathBuf::from("generated/typescript/client"),
            frontend_models_dir: PathBuf::from("generated/typescript/models"),
            frontend_mocks_dir: PathBuf::from("generated/typescript/mocks"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Package clause of the generated files
    pub package_name: String,
    /// Module path support packages are imported from
    pub module_path: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            package_name: DEFAULT_GO_PACKAGE.to_string(),
            module_path: DEFAULT_GO_MODULE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendSettings {
    /// Module specifier the client, tests and mocks import models from
    pub models_import: String,
    /// Module specifier models import enum unions from
    pub enums_import: String,
    pub browser_base_url: String,
    pub local_base_url: String,
}

impl Default for FrontendSettings {
    fn default() -> Self {
        Self {
            models_import: DEFAULT_MODELS_IMPORT.to_string(),
            enums_import: DEFAULT_ENUMS_IMPORT.to_string(),
            browser_base_url: DEFAULT_BROWSER_BASE_URL.to_string(),
            local_base_url: DEFAULT_LOCAL_BASE_URL.to_string(),
        }
    }
}

/// Post-generation commands; each accepts a single string or a list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostGenerateHooks {
    /// Run in the backend output directory
    #[serde(default, deserialize_with = "deserialize_commands")]
    pub backend: Vec<String>,

    /// Run in each frontend output directory
    #[serde(default, deserialize_with = "deserialize_commands")]
    pub frontend: Vec<String>,
}

impl Config {
    /// Create a new Config with default values
    pub fn new(spec_location: impl Into<String>) -> Self {
        Self {
            spec_location: spec_location.into(),
            template_dir: None,
            include_tests: true,
            targets: Targets::default(),
            output: OutputDirs::default(),
            backend: BackendSettings::default(),
            frontend: FrontendSettings::default(),
            post_generate: PostGenerateHooks::default(),
            enum_overrides: BTreeMap::new(),
            enum_defaults: BTreeMap::new(),
        }
    }

    /// Load configuration from a file; the format follows the extension
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::config(format!("failed to read {}: {}", path.display(), e))
        })?;

        let config = match ConfigFormat::from_path(path) {
            ConfigFormat::Yaml => serde_yaml::from_str(&content)?,
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };
        Ok(config)
    }

    /// Save configuration to a file; the format follows the extension
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match ConfigFormat::from_path(path) {
            ConfigFormat::Yaml => serde_yaml::to_string(self)?,
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };
        fs::write(path, content).await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    /// Anything that is not `.json` or `.toml` is read as YAML
    fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("json") => Self::Json,
            Some("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Helper function to deserialize either a single command or a list of commands
fn deserialize_commands<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = SerdeValue::deserialize(deserializer)?;

    match value {
        SerdeValue::String(s) => Ok(vec![s]),
        SerdeValue::Seq(seq) => {
            let mut result = Vec::new();
            for item in seq {
                if let SerdeValue::String(s) = item {
                    result.push(s);
                } else {
                    return Err(serde::de::Error::custom(
                        "Expected string or array of strings",
                    ));
                }
            }
            Ok(result)
        }
        _ => Err(serde::de::Error::custom(
            "Expected string or array of strings",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> Config {
        let mut config = Config::new("openapi.yaml");
        config.targets.backend = true;
        config.targets.frontend = true;
        config.template_dir = Some(PathBuf::from("my-templates"));
        config.backend.module_path = "github.com/acme/backend".to_string();
        config.post_generate.backend = vec!["gofmt -w .".to_string()];
        config
            .enum_overrides
            .insert("Recipe.kind".to_string(), "RecipeKind".to_string());
        config
            .enum_defaults
            .insert("RecipeKind".to_string(), "'main'".to_string());
        config
    }

    #[tokio::test]
    async fn test_config_roundtrip() -> crate::Result<()> {
        let dir = tempdir()?;

        for name in ["config.yaml", "config.json", "config.toml"] {
            let file_path = dir.path().join(name);
            let config = sample();
            config.save(&file_path).await?;

            let loaded = Config::from_file(&file_path).await?;
            assert_eq!(loaded, config, "round trip through {}", name);
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_defaults_fill_missing_fields() -> crate::Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("minimal.yaml");
        tokio::fs::write(
            &file_path,
            "spec_location: api.yaml\npost_generate:\n  frontend: npx prettier --write .\n",
        )
        .await?;

        let config = Config::from_file(&file_path).await?;
        assert_eq!(config.spec_location, "api.yaml");
        assert!(config.include_tests);
        assert!(!config.targets.any());
        assert_eq!(config.output, OutputDirs::default());
        assert_eq!(config.backend.package_name, DEFAULT_GO_PACKAGE);
        assert_eq!(
            config.post_generate.frontend,
            vec!["npx prettier --write .".to_string()]
        );
        assert!(config.post_generate.backend.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_hook_list_must_be_strings() -> crate::Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("bad.yaml");
        tokio::fs::write(
            &file_path,
            "spec_location: api.yaml\npost_generate:\n  backend: [1, 2]\n",
        )
        .await?;

        let err = Config::from_file(&file_path).await.unwrap_err();
        assert!(err.to_string().contains("Expected string or array of strings"));

        Ok(())
    }
}
