//! TypeScript frontend renderer.

use super::{ImportSet, Rendered, TemplateSelection};
use crate::builders::{
    EndpointContext, EndpointContextBuilder, ModelContextBuilder, TypeScriptContextBuilder,
};
use crate::error::Result;
use crate::ir::{OperationIr, TypeDef};
use crate::templates::{TemplateKind, TemplateManager};

/// Output directory a frontend file is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontendOutput {
    Client,
    Models,
    Mocks,
}

/// Static support files, by template stem, and where each one lives
pub const TS_STATIC_FILES: [(&str, FrontendOutput); 5] = [
    ("api_response", FrontendOutput::Models),
    ("query_filter", FrontendOutput::Models),
    ("ranges", FrontendOutput::Models),
    ("response_config", FrontendOutput::Mocks),
    ("test_helpers", FrontendOutput::Client),
];

/// Static files only needed when tests are generated
pub fn is_test_only_static(name: &str) -> bool {
    name == "test_helpers"
}

#[derive(Debug, Clone)]
pub struct TypeScriptRenderer {
    manager: TemplateManager,
    builder: TypeScriptContextBuilder,
}

impl TypeScriptRenderer {
    pub fn new(manager: TemplateManager, builder: TypeScriptContextBuilder) -> Self {
        Self { manager, builder }
    }

    pub fn builder(&self) -> &TypeScriptContextBuilder {
        &self.builder
    }

    /// One `APIClient` method and the imports it uses
    pub fn render_method(&self, op: &OperationIr) -> Result<Rendered> {
        let built = self.builder.build(op)?;
        self.render_built(op, built.context, built.imports)
    }

    fn render_built(
        &self,
        op: &OperationIr,
        context: serde_json::Value,
        imports: ImportSet,
    ) -> Result<Rendered> {
        let template =
            TemplateSelection::for_operation(op).operation_template(TemplateKind::TypeScript);
        let body = self.manager.render(&template, &context)?;
        Ok(Rendered::new(body.trim_end().to_string(), imports))
    }

    /// The whole `APIClient` class, methods ordered by operation id
    pub fn render_client(&self, operations: &[OperationIr]) -> Result<Rendered> {
        let mut methods = Vec::with_capacity(operations.len());
        let mut imports = ImportSet::new();
        for (op, built) in EndpointContext::transform_endpoints(&self.builder, operations)? {
            let rendered = self
                .render_built(op, built.context, built.imports)
                .map_err(|e| e.in_operation(&op.operation_id))?;
            imports.extend(&rendered.imports);
            methods.push(rendered.body);
        }

        let built = self.builder.build_client(&methods, &imports);
        let body = self.manager.render("typescript/client.ts.tera", &built.context)?;
        Ok(Rendered::new(body.trim_end().to_string(), built.imports))
    }

    /// The `describe` block for one operation
    pub fn render_test(&self, op: &OperationIr) -> Result<Rendered> {
        let built = self.builder.build_test(op)?;
        let template =
            TemplateSelection::for_operation(op).test_template(TemplateKind::TypeScript);
        let body = self.manager.render(&template, &built.context)?;
        Ok(Rendered::new(body.trim_end().to_string(), built.imports))
    }

    /// The Playwright route mock for one operation
    pub fn render_mock(&self, op: &OperationIr) -> Result<Rendered> {
        let built = self.builder.build_mock(op)?;
        let body = self.manager.render("typescript/mock.ts.tera", &built.context)?;
        Ok(Rendered::new(body.trim_end().to_string(), built.imports))
    }

    pub fn render_model(&self, def: &TypeDef) -> Result<Rendered> {
        let built = self.builder.build_model(def)?;
        let body = self.manager.render("typescript/model.ts.tera", &built.context)?;
        Ok(Rendered::new(body.trim_end().to_string(), built.imports))
    }

    /// `export * from` lines for every model module, given without extension
    pub fn render_models_index(&self, modules: &[String]) -> Result<Rendered> {
        let built = self.builder.build_models_index(modules);
        let body = self
            .manager
            .render("typescript/models_index.ts.tera", &built.context)?;
        Ok(Rendered::new(body.trim_end().to_string(), built.imports))
    }

    /// Client factories exported from the client package's `index.ts`
    pub fn render_index(&self) -> Result<Rendered> {
        let built = self.builder.build_index();
        let body = self.manager.render("typescript/index.ts.tera", &built.context)?;
        Ok(Rendered::new(body.trim_end().to_string(), built.imports))
    }

    /// A complete static file, imports included
    pub fn render_static(&self, name: &str) -> Result<String> {
        self.manager.render(
            &format!("typescript/static/{}.ts.tera", name),
            &self.builder.static_context(),
        )
    }
}
