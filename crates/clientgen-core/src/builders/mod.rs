//! Context builder traits and adapters for language-specific codegen.
pub mod golang;
pub mod typescript;

pub use golang::GoContextBuilder;
pub use typescript::TypeScriptContextBuilder;

use crate::ir::{OperationIr, TypeDef};
use crate::render::ImportSet;
use serde_json::Value as JsonValue;

/// A template context and the imports the rendered text will need
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltContext {
    pub context: JsonValue,
    pub imports: ImportSet,
}

impl BuiltContext {
    pub fn new(context: JsonValue, imports: ImportSet) -> Self {
        Self { context, imports }
    }
}

/// Trait for converting a classified operation into a language-specific context.
pub trait EndpointContextBuilder {
    /// Context for the operation itself
    fn build(&self, op: &OperationIr) -> crate::Result<BuiltContext>;

    /// Context for the operation's tests
    fn build_test(&self, op: &OperationIr) -> crate::Result<BuiltContext>;
}

/// Trait for converting a lowered schema into a language-specific model context.
pub trait ModelContextBuilder {
    fn build_model(&self, def: &TypeDef) -> crate::Result<BuiltContext>;
}

pub struct EndpointContext;

impl EndpointContext {
    /// Build contexts for every operation, sorted by operation id for consistent output
    pub fn transform_endpoints<'a>(
        builder: &dyn EndpointContextBuilder,
        operations: &'a [OperationIr],
    ) -> crate::Result<Vec<(&'a OperationIr, BuiltContext)>> {
        let mut contexts = Vec::with_capacity(operations.len());
        for op in operations {
            let built = builder
                .build(op)
                .map_err(|e| e.in_operation(&op.operation_id))?;
            contexts.push((op, built));
        }

        contexts.sort_by(|(a, _), (b, _)| a.operation_id.cmp(&b.operation_id));
        Ok(contexts)
    }
}
