//! Template system for code generation

// Internal imports (std, crate)
use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::task;

use crate::error::{Error, Result};
use crate::utils;

use super::{embedded_templates, TemplateDir, TemplateKind};

// External imports (alphabetized)
use serde::Serialize;
use tera::{Context, Tera};

/// Manages loading and rendering of code generation templates
#[derive(Debug, Clone)]
pub struct TemplateManager {
    /// Tera engine holding the embedded templates plus any overrides
    tera: Arc<Tera>,
    /// The target language this manager renders for
    kind: TemplateKind,
    /// Override directory the engine was loaded from, if any
    template_dir: Option<TemplateDir>,
}

impl TemplateManager {
    /// Create a new TemplateManager for the given template kind
    ///
    /// # Arguments
    /// * `template_kind` - The kind of template to use
    /// * `template_dir` - Optional override root. If None, the standard locations are
    ///   searched and the embedded templates are used when none has templates for this kind.
    ///
    /// # Returns
    /// A new `TemplateManager` or an error if an explicit directory is missing or a template fails to parse.
    pub async fn new(template_kind: TemplateKind, template_dir: Option<PathBuf>) -> Result<Self> {
        let template_dir = match template_dir {
            Some(dir) => Some(TemplateDir::from_root(template_kind, &dir)?),
            None => TemplateDir::discover(template_kind),
        };

        let mut tera = Self::embedded_engine(template_kind)?;

        if let Some(dir) = &template_dir {
            let overrides = Self::discover_template_files(dir.clone()).await?;
            log::debug!(
                "Loading {} template override(s) from {}",
                overrides.len(),
                dir.display()
            );
            tera.add_template_files(
                overrides
                    .into_iter()
                    .map(|(path, name)| (path, Some(name)))
                    .collect::<Vec<_>>(),
            )
            .map_err(|e| Error::template(format!("Failed to parse templates: {}", error_chain(&e))))?;
        }

        Ok(Self {
            tera: Arc::new(tera),
            kind: template_kind,
            template_dir,
        })
    }

    /// Create a manager backed only by the embedded templates
    pub fn with_embedded(template_kind: TemplateKind) -> Result<Self> {
        Ok(Self {
            tera: Arc::new(Self::embedded_engine(template_kind)?),
            kind: template_kind,
            template_dir: None,
        })
    }

    fn embedded_engine(kind: TemplateKind) -> Result<Tera> {
        let mut tera = Tera::default();
        register_filters(&mut tera);
        tera.add_raw_templates(embedded_templates(kind).to_vec())
            .map_err(|e| Error::template(format!("Failed to parse templates: {}", error_chain(&e))))?;
        Ok(tera)
    }

    /// Collects override files off the async runtime
    async fn discover_template_files(dir: TemplateDir) -> Result<Vec<(PathBuf, String)>> {
        task::spawn_blocking(move || dir.template_files())
            .await
            .map_err(|e| {
                io::Error::new(
                    io::ErrorKind::Other,
                    format!("Failed to join blocking task: {}", e),
                )
            })?
            .map_err(Error::from)
    }

    /// Get the template kind this template manager is configured for
    pub fn template_kind(&self) -> TemplateKind {
        self.kind
    }

    /// Get the override directory, if one was loaded
    pub fn template_dir(&self) -> Option<&TemplateDir> {
        self.template_dir.as_ref()
    }

    /// Check if a template exists
    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template(name).is_ok()
    }

    /// Render `template_name` with a serializable context
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        if !self.has_template(template_name) {
            return Err(Error::UnknownTemplate {
                key: template_name.to_string(),
            });
        }

        let tera_context = Context::from_serialize(context).map_err(|e| {
            Error::template(format!("Failed to serialize context: {}", error_chain(&e)))
        })?;

        log::debug!("Rendering template: {}", template_name);
        self.tera
            .render(template_name, &tera_context)
            .map_err(|e| {
                log::error!("Template rendering failed for '{}': {}", template_name, e);
                Error::template(format!(
                    "Failed to render template '{}': {}",
                    template_name,
                    error_chain(&e)
                ))
            })
    }

    /// Run post-generation commands through `sh -c` inside `output_path`
    pub async fn execute_post_generation_hooks(
        commands: &[String],
        output_path: &Path,
    ) -> Result<()> {
        use tokio::process::Command as AsyncCommand;

        for command in commands {
            log::info!("Running post-generation hook: {}", command);
            let output = AsyncCommand::new("sh")
                .arg("-c")
                .arg(command)
                .current_dir(output_path)
                .output()
                .await
                .map_err(|e| {
                    io::Error::new(
                        io::ErrorKind::Other,
                        format!(
                            "Failed to execute post-generation hook '{}': {}",
                            command, e
                        ),
                    )
                })?;

            if !output.status.success() {
                return Err(Error::Hook {
                    command: command.clone(),
                    status: output.status.to_string(),
                    output: format!(
                        "{}{}",
                        String::from_utf8_lossy(&output.stderr),
                        String::from_utf8_lossy(&output.stdout)
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Name helpers available to every template, embedded or overridden
fn register_filters(tera: &mut Tera) {
    tera.register_filter("upper_first", string_filter(utils::upper_first));
    tera.register_filter("title", string_filter(utils::title));
    tera.register_filter("observability_key", string_filter(utils::observability_key));
    tera.register_filter("invalid_id_key", string_filter(utils::invalid_id_key));
}

fn string_filter(
    f: fn(&str) -> String,
) -> impl Fn(&tera::Value, &HashMap<String, tera::Value>) -> tera::Result<tera::Value> + Sync + Send {
    move |value, _| {
        let s = tera::try_get_value!("string_filter", "value", String, value);
        Ok(tera::Value::String(f(&s)))
    }
}

/// Tera keeps the useful detail in the source chain
fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
