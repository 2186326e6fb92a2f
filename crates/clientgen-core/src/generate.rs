//! Code generation passes, one per enabled target

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::{
    builders::{GoContextBuilder, TypeScriptContextBuilder},
    classify::classify_all,
    config::Config,
    emit::{self, GeneratedFile},
    error::Result,
    ir::OperationIr,
    openapi::OpenApiContext,
    render::{
        golang::{self, GO_STATIC_FILES},
        typescript::{self, FrontendOutput, TS_STATIC_FILES},
        GoRenderer, TypeScriptRenderer,
    },
    schema::{enum_first_values, EnumOverrides, LoweredSchemas, LoweringProfile, SchemaLowerer},
    templates::{TemplateKind, TemplateManager, TemplateOptions},
};

use serde_json::Value as JsonValue;

/// What one target pass produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub files_written: usize,
    pub operations_rendered: usize,
    pub schemas_lowered: usize,
    pub skipped_schemas: Vec<String>,
    pub unused_overrides: Vec<String>,
}

impl PassReport {
    fn new(written: usize, operations: &[OperationIr], lowered: LoweredSchemas) -> Self {
        Self {
            files_written: written,
            operations_rendered: operations.len(),
            schemas_lowered: lowered.types.len(),
            skipped_schemas: lowered.skipped,
            unused_overrides: lowered.unused_overrides,
        }
    }
}

/// Reports of the passes that ran
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub backend: Option<PassReport>,
    pub frontend: Option<PassReport>,
}

/// Main entry point for code generation
pub async fn generate(config: &Config) -> Result<GenerationReport> {
    let mut report = GenerationReport::default();
    if !config.targets.any() {
        log::info!("No target selected; nothing to generate");
        return Ok(report);
    }

    // 1. Load the OpenAPI document
    let spec = OpenApiContext::from_file_or_url(&config.spec_location).await?;
    log::info!(
        "Loaded {} {} from {}",
        spec.title().unwrap_or("untitled API"),
        spec.version().unwrap_or("(unversioned)"),
        config.spec_location
    );

    // 2. Classify operations once; both targets render the same IR
    let operations = classify_all(&spec.operations()?)?;
    let components = spec.component_schemas();
    let options = TemplateOptions::from(config);
    log::info!(
        "Classified {} operation(s), {} component schema(s)",
        operations.len(),
        components.len()
    );

    // 3. Run each enabled pass, then its hooks
    if config.targets.backend {
        let pass = generate_backend(config, &options, &components, &operations).await?;
        log::info!(
            "Backend: wrote {} file(s) to {}",
            pass.files_written,
            config.output.backend_dir.display()
        );
        TemplateManager::execute_post_generation_hooks(
            &config.post_generate.backend,
            &config.output.backend_dir,
        )
        .await?;
        report.backend = Some(pass);
    }

    if config.targets.frontend {
        let pass = generate_frontend(config, &options, &components, &operations).await?;
        log::info!("Frontend: wrote {} file(s)", pass.files_written);
        for dir in frontend_dirs(config) {
            TemplateManager::execute_post_generation_hooks(&config.post_generate.frontend, &dir)
                .await?;
        }
        report.frontend = Some(pass);
    }

    Ok(report)
}

async fn generate_backend(
    config: &Config,
    options: &TemplateOptions,
    components: &BTreeMap<&str, &JsonValue>,
    operations: &[OperationIr],
) -> Result<PassReport> {
    let dir = &config.output.backend_dir;
    let kind = TemplateKind::Golang;
    emit::remove_stale(dir).await?;

    let lowered =
        SchemaLowerer::new(LoweringProfile::Backend, components, EnumOverrides::empty()).lower_all()?;
    let renderer = GoRenderer::new(
        TemplateManager::new(kind, config.template_dir.clone()).await?,
        GoContextBuilder::new(options.clone(), &lowered.types),
    );
    let package = options.go_package.as_str();

    let mut files = Vec::new();
    for op in operations {
        let id = op.operation_id.as_str();
        log::debug!("Rendering {} {} ({})", op.method.as_str(), op.path, id);

        let rendered = renderer.render_operation(op).map_err(|e| e.in_operation(id))?;
        files.push(GeneratedFile::new(
            dir.join(emit::operation_file_name(id, kind)),
            emit::go_source(package, &rendered),
        ));

        if options.include_tests {
            let rendered = renderer.render_test(op).map_err(|e| e.in_operation(id))?;
            files.push(GeneratedFile::new(
                dir.join(emit::test_file_name(id, kind)),
                emit::go_source(package, &rendered),
            ));
        }
    }

    for def in &lowered.types {
        let rendered = renderer.render_type(def)?;
        files.push(GeneratedFile::new(
            dir.join(emit::type_file_name(&def.name, kind)),
            emit::go_source(package, &rendered),
        ));
    }

    for name in GO_STATIC_FILES {
        let test_only = golang::is_test_only_static(name);
        if test_only && !options.include_tests {
            continue;
        }
        files.push(GeneratedFile::new(
            dir.join(emit::static_file_name(name, kind, test_only)),
            emit::static_source(&renderer.render_static(name)?),
        ));
    }

    let written = emit::write_all(&files).await?;
    Ok(PassReport::new(written, operations, lowered))
}

async fn generate_frontend(
    config: &Config,
    options: &TemplateOptions,
    components: &BTreeMap<&str, &JsonValue>,
    operations: &[OperationIr],
) -> Result<PassReport> {
    let kind = TemplateKind::TypeScript;
    let client_dir = &config.output.frontend_client_dir;
    let models_dir = &config.output.frontend_models_dir;
    let mocks_dir = &config.output.frontend_mocks_dir;

    // directories may coincide, so clear them all before writing any
    for dir in frontend_dirs(config) {
        emit::remove_stale(&dir).await?;
    }

    let overrides = EnumOverrides::default().extend(
        config.enum_overrides.clone(),
        config.enum_defaults.clone(),
    );
    let lowered =
        SchemaLowerer::new(LoweringProfile::Frontend, components, overrides.clone()).lower_all()?;
    let renderer = TypeScriptRenderer::new(
        TemplateManager::new(kind, config.template_dir.clone()).await?,
        TypeScriptContextBuilder::new(options.clone(), overrides, enum_first_values(components)),
    );

    let mut files = Vec::new();
    let mut model_modules = BTreeSet::new();

    // Models
    for def in &lowered.types {
        let rendered = renderer.render_model(def)?;
        let file_name = emit::type_file_name(&def.name, kind);
        model_modules.insert(module_name(&file_name));
        files.push(GeneratedFile::new(
            models_dir.join(file_name),
            emit::ts_source(&rendered),
        ));
    }

    for (name, output) in TS_STATIC_FILES {
        let test_only = typescript::is_test_only_static(name);
        if test_only && !options.include_tests {
            continue;
        }
        let file_name = emit::static_file_name(name, kind, test_only);
        if output == FrontendOutput::Models {
            model_modules.insert(module_name(&file_name));
        }
        files.push(GeneratedFile::new(
            output_dir(config, output).join(file_name),
            emit::static_source(&renderer.render_static(name)?),
        ));
    }

    let model_modules: Vec<String> = model_modules.into_iter().collect();
    files.push(GeneratedFile::new(
        models_dir.join(emit::INDEX_FILE),
        emit::ts_source(&renderer.render_models_index(&model_modules)?),
    ));

    // Client
    files.push(GeneratedFile::new(
        client_dir.join(emit::CLIENT_FILE),
        emit::ts_source(&renderer.render_client(operations)?),
    ));
    files.push(GeneratedFile::new(
        client_dir.join(emit::INDEX_FILE),
        emit::ts_source(&renderer.render_index()?),
    ));

    for op in operations {
        let id = op.operation_id.as_str();

        if options.include_tests {
            let rendered = renderer.render_test(op).map_err(|e| e.in_operation(id))?;
            files.push(GeneratedFile::new(
                client_dir.join(emit::test_file_name(id, kind)),
                emit::ts_source(&rendered),
            ));
        }

        // Mocks
        let rendered = renderer.render_mock(op).map_err(|e| e.in_operation(id))?;
        files.push(GeneratedFile::new(
            mocks_dir.join(emit::mock_file_name(id)),
            emit::ts_source(&rendered),
        ));
    }

    let written = emit::write_all(&files).await?;
    Ok(PassReport::new(written, operations, lowered))
}

fn output_dir(config: &Config, output: FrontendOutput) -> &Path {
    match output {
        FrontendOutput::Client => &config.output.frontend_client_dir,
        FrontendOutput::Models => &config.output.frontend_models_dir,
        FrontendOutput::Mocks => &config.output.frontend_mocks_dir,
    }
}

/// Distinct frontend output directories, in client, models, mocks order
fn frontend_dirs(config: &Config) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::with_capacity(3);
    for dir in [
        &config.output.frontend_client_dir,
        &config.output.frontend_models_dir,
        &config.output.frontend_mocks_dir,
    ] {
        if !dirs.iter().any(|d| d == dir) {
            dirs.push(dir.clone());
        }
    }
    dirs
}

/// Module specifier of a generated TypeScript file (`type.Recipe.gen.ts` → `type.Recipe.gen`)
fn module_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_targets_is_noop() -> Result<()> {
        let config = Config::new("does-not-exist.yaml");
        let report = generate(&config).await?;
        assert_eq!(report, GenerationReport::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_spec_fails_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new(dir.path().join("missing.yaml").display().to_string());
        config.targets.backend = true;
        config.output.backend_dir = dir.path().join("golang");

        assert!(generate(&config).await.is_err());
        assert!(!config.output.backend_dir.exists());
    }

    #[test]
    fn test_frontend_dirs_are_deduplicated() {
        let mut config = Config::new("openapi.yaml");
        config.output.frontend_mocks_dir = config.output.frontend_client_dir.clone();
        assert_eq!(
            frontend_dirs(&config),
            vec![
                config.output.frontend_client_dir.clone(),
                config.output.frontend_models_dir.clone(),
            ]
        );
    }

    #[test]
    fn test_module_name() {
        assert_eq!(module_name("type.Recipe.gen.ts"), "type.Recipe.gen");
        assert_eq!(module_name("core.api_response.gen.ts"), "core.api_response.gen");
    }
}
