//! Target renderers.
//!
//! A renderer turns IR into `Rendered` bodies plus the imports the body uses.
//! Which template renders an operation is decided by [`TemplateSelection`],
//! the method × query-filtered matrix shared by every target.

pub mod golang;
pub mod imports;
pub mod typescript;

pub use golang::GoRenderer;
pub use imports::ImportSet;
pub use typescript::TypeScriptRenderer;

// Internal imports (std, crate)
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::ir::{HttpMethod, OperationIr};
use crate::templates::TemplateKind;

// External imports (alphabetized)
use serde::Serialize;

/// Template selection matrix keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateSelection {
    /// GET with the pagination filter
    ListReader,
    /// GET without it
    ScalarReader,
    /// POST
    Create,
    /// PUT, no response body surfaced
    Update,
    /// PATCH, no response body surfaced
    Patch,
    /// DELETE
    Archive,
}

impl TemplateSelection {
    pub fn select(method: HttpMethod, query_filtered: bool) -> Self {
        match (method, query_filtered) {
            (HttpMethod::Get, true) => Self::ListReader,
            (HttpMethod::Get, false) => Self::ScalarReader,
            (HttpMethod::Post, _) => Self::Create,
            (HttpMethod::Put, _) => Self::Update,
            (HttpMethod::Patch, _) => Self::Patch,
            (HttpMethod::Delete, _) => Self::Archive,
        }
    }

    pub fn for_operation(op: &OperationIr) -> Self {
        Self::select(op.method, op.query_filtered)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListReader => "list_reader",
            Self::ScalarReader => "scalar_reader",
            Self::Create => "create",
            Self::Update => "update",
            Self::Patch => "patch",
            Self::Archive => "archive",
        }
    }

    /// Whether the rendered function hands a decoded value back to the caller
    pub fn returns_value(&self) -> bool {
        matches!(self, Self::ListReader | Self::ScalarReader | Self::Create)
    }

    /// Name of the operation template for `kind`
    pub fn operation_template(&self, kind: TemplateKind) -> String {
        format!("{}/op.{}.{}.tera", kind, self.as_str(), kind.extension())
    }

    /// Name of the test template for `kind`
    pub fn test_template(&self, kind: TemplateKind) -> String {
        format!("{}/test.{}.{}.tera", kind, self.as_str(), kind.extension())
    }

    pub fn all() -> impl Iterator<Item = Self> {
        use TemplateSelection::*;
        [ListReader, ScalarReader, Create, Update, Patch, Archive]
            .iter()
            .copied()
    }
}

impl FromStr for TemplateSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .find(|selection| selection.as_str() == s)
            .ok_or_else(|| Error::UnknownTemplate { key: s.to_string() })
    }
}

impl fmt::Display for TemplateSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rendered body and the imports it needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub body: String,
    pub imports: ImportSet,
}

impl Rendered {
    pub fn new(body: String, imports: ImportSet) -> Self {
        Self { body, imports }
    }
}
