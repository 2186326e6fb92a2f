//! Target metadata handed to the context builders.
//!
//! [`TemplateOptions`] carries everything a renderer needs to know about the
//! project it generates into: the Go package and module path used for
//! imports, the TypeScript module specifiers models and enums are imported
//! from, and whether test files are emitted at all.
//!
//! # Example
//!
//! ```rust
//! use clientgen_core::templates::TemplateOptions;
//!
//! let options = TemplateOptions {
//!     go_module: "github.com/example/backend".to_string(),
//!     ..Default::default()
//! };
//! assert_eq!(
//!     options.go_import("internal/lib/observability"),
//!     "github.com/example/backend/internal/lib/observability"
//! );
//! ```

use crate::config::{Config, DEFAULT_GO_MODULE, DEFAULT_GO_PACKAGE};

/// Configuration struct for controlling template-based code generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateOptions {
    /// Whether to generate test files next to operations
    pub include_tests: bool,

    /// Package clause of every generated Go file
    pub go_package: String,

    /// Go module path the support packages are imported from
    pub go_module: String,

    /// Module specifier generated TypeScript imports models from
    pub models_import: String,

    /// Module specifier models import hand-maintained enum unions from
    pub enums_import: String,

    /// Base URL of the browser-side client
    pub browser_base_url: String,

    /// Base URL of the local development client
    pub local_base_url: String,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            include_tests: true,
            go_package: DEFAULT_GO_PACKAGE.to_string(),
            go_module: DEFAULT_GO_MODULE.to_string(),
            models_import: crate::config::DEFAULT_MODELS_IMPORT.to_string(),
            enums_import: crate::config::DEFAULT_ENUMS_IMPORT.to_string(),
            browser_base_url: crate::config::DEFAULT_BROWSER_BASE_URL.to_string(),
            local_base_url: crate::config::DEFAULT_LOCAL_BASE_URL.to_string(),
        }
    }
}

impl From<&Config> for TemplateOptions {
    fn from(config: &Config) -> Self {
        Self {
            include_tests: config.include_tests,
            go_package: config.backend.package_name.clone(),
            go_module: config.backend.module_path.trim_end_matches('/').to_string(),
            models_import: config.frontend.models_import.clone(),
            enums_import: config.frontend.enums_import.clone(),
            browser_base_url: config.frontend.browser_base_url.clone(),
            local_base_url: config.frontend.local_base_url.clone(),
        }
    }
}

impl TemplateOptions {
    /// Full import path of a package inside the configured Go module
    pub fn go_import(&self, package: &str) -> String {
        format!("{}/{}", self.go_module, package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_trims_module_slash() {
        let mut config = Config::new("openapi.yaml");
        config.backend.module_path = "github.com/acme/api/".to_string();
        config.backend.package_name = "acmeclient".to_string();
        config.include_tests = false;

        let options = TemplateOptions::from(&config);
        assert_eq!(options.go_package, "acmeclient");
        assert_eq!(
            options.go_import("internal/lib/fake"),
            "github.com/acme/api/internal/lib/fake"
        );
        assert!(!options.include_tests);
    }
}
