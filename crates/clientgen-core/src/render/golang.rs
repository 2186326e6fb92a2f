//! Go backend renderer.

use super::{Rendered, TemplateSelection};
use crate::builders::{EndpointContextBuilder, GoContextBuilder, ModelContextBuilder};
use crate::error::Result;
use crate::ir::{OperationIr, TypeDef};
use crate::templates::{TemplateKind, TemplateManager};

/// Static support files shipped with every backend client, by template stem
pub const GO_STATIC_FILES: [&str; 8] = [
    "client",
    "credentials",
    "errors",
    "options",
    "query_filter",
    "roundtripper",
    "test_helpers",
    "uploads",
];

/// Static files only compiled into the package's tests
pub fn is_test_only_static(name: &str) -> bool {
    name == "test_helpers"
}

#[derive(Debug, Clone)]
pub struct GoRenderer {
    manager: TemplateManager,
    builder: GoContextBuilder,
}

impl GoRenderer {
    pub fn new(manager: TemplateManager, builder: GoContextBuilder) -> Self {
        Self { manager, builder }
    }

    pub fn builder(&self) -> &GoContextBuilder {
        &self.builder
    }

    /// The operation function and the imports it uses
    pub fn render_operation(&self, op: &OperationIr) -> Result<Rendered> {
        let built = self.builder.build(op)?;
        let template = TemplateSelection::for_operation(op).operation_template(TemplateKind::Golang);
        let body = self.manager.render(&template, &built.context)?;
        Ok(Rendered::new(body.trim_end().to_string(), built.imports))
    }

    /// The `TestClient_<Name>` function and the imports it uses
    pub fn render_test(&self, op: &OperationIr) -> Result<Rendered> {
        let built = self.builder.build_test(op)?;
        let template = TemplateSelection::for_operation(op).test_template(TemplateKind::Golang);
        let body = self.manager.render(&template, &built.context)?;
        Ok(Rendered::new(body.trim_end().to_string(), built.imports))
    }

    pub fn render_type(&self, def: &TypeDef) -> Result<Rendered> {
        let built = self.builder.build_model(def)?;
        let body = self.manager.render("golang/type.go.tera", &built.context)?;
        Ok(Rendered::new(body.trim_end().to_string(), built.imports))
    }

    /// A complete static file, package clause and imports included
    pub fn render_static(&self, name: &str) -> Result<String> {
        self.manager.render(
            &format!("golang/static/{}.go.tera", name),
            &self.builder.static_context(),
        )
    }
}
