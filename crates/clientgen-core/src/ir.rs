//! Intermediate representation shared by the classifier, lowering and renderers.
//!
//! `OperationIr` and `TypeDef` are the only types that cross from the
//! classifier/lowering side into the renderers. Renderers never look back at
//! the raw OpenAPI document.

// Internal imports (std, crate)
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::classify::TOTP_TOLERANT_OPERATIONS;
use crate::utils::{
    backend_path_template, frontend_path_template, is_scalar_type, lower_first, SEARCH_QUERY_PARAM,
};

// External imports (alphabetized)
use serde::Serialize;

/// HTTP methods the generator knows how to render, in walk order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Put,
    Patch,
    Post,
    Delete,
}

impl HttpMethod {
    /// Upper-case wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }

    /// Key of this method inside an OpenAPI path item
    pub fn path_item_key(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Post => "post",
            Self::Delete => "delete",
        }
    }

    /// All methods in the order operations are walked within a path item
    pub fn all() -> impl Iterator<Item = Self> {
        use HttpMethod::*;
        [Get, Put, Patch, Post, Delete].iter().copied()
    }

    /// Whether requests with this method may carry a JSON body
    pub fn carries_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "POST" => Ok(Self::Post),
            "DELETE" => Ok(Self::Delete),
            _ => Err(format!("Unsupported HTTP method: {}", s)),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter travels on the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
}

/// A path or query parameter that survived filter removal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: String,
    /// OpenAPI scalar type (`string`, `integer`, ...)
    #[serde(rename = "type")]
    pub type_name: String,
    pub location: ParamLocation,
}

impl Param {
    pub fn path(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            location: ParamLocation::Path,
        }
    }

    pub fn query(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            location: ParamLocation::Query,
        }
    }

    /// The free-text search parameter never lands in the path
    pub fn is_search(&self) -> bool {
        self.name == SEARCH_QUERY_PARAM
    }
}

/// Request body DTO; both fields empty when the operation sends no body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InputParam {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl InputParam {
    pub fn from_type(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self {
            name: lower_first(&type_name),
            type_name,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.type_name.is_empty()
    }
}

/// Shape of the decoded response payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResponseTypeDesc {
    /// Leaf element type (`Recipe`, `string`, ...)
    pub type_name: String,
    /// Envelope wrapping the payload; empty when there is none
    pub generic_container: String,
    pub is_array: bool,
}

impl ResponseTypeDesc {
    pub fn has_container(&self) -> bool {
        !self.generic_container.is_empty()
    }
}

/// A classified operation, ready for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationIr {
    /// Operation id exactly as declared
    pub operation_id: String,
    pub method: HttpMethod,
    /// Raw OpenAPI path (`/api/v1/recipes/{recipeID}`)
    pub path: String,
    pub params: Vec<Param>,
    pub input: InputParam,
    pub response: ResponseTypeDesc,
    pub default_status_code: u16,
    pub returns_list: bool,
    pub return_raw_response: bool,
    pub query_filtered: bool,
    pub description: String,
}

impl OperationIr {
    /// Name used by the backend renderer: casing preserved
    pub fn backend_name(&self) -> &str {
        &self.operation_id
    }

    /// Name used by the frontend renderer: first letter lower-cased
    pub fn frontend_name(&self) -> String {
        lower_first(&self.operation_id)
    }

    /// Path with `%s` positional markers
    pub fn backend_path_template(&self) -> String {
        backend_path_template(&self.path)
    }

    /// Path with `${name}` interpolation markers
    pub fn frontend_path_template(&self) -> String {
        frontend_path_template(&self.path)
    }

    /// Parameters substituted into the path, in order
    pub fn path_params(&self) -> impl Iterator<Item = &Param> {
        self.params
            .iter()
            .filter(|p| p.location == ParamLocation::Path && !p.is_search())
    }

    /// Query parameters carried alongside the path, search included
    pub fn query_params(&self) -> impl Iterator<Item = &Param> {
        self.params
            .iter()
            .filter(|p| p.location == ParamLocation::Query || p.is_search())
    }

    pub fn has_search_param(&self) -> bool {
        self.params.iter().any(Param::is_search)
    }

    pub fn has_input(&self) -> bool {
        !self.input.is_empty()
    }

    /// Whether a "totp required" envelope error is handed back instead of raised
    pub fn tolerates_totp_required(&self) -> bool {
        self.return_raw_response
            && TOTP_TOLERANT_OPERATIONS.contains(&self.frontend_name().as_str())
    }
}

/// One field of a generated model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub nullable: bool,
    pub array: bool,
}

/// One generated model, lowered from a component schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeDef {
    pub name: String,
    /// Keyed by field name, so iteration is alphabetical
    pub fields: BTreeMap<String, Field>,
    /// Other models the fields refer to
    pub imports: BTreeSet<String>,
}

impl TypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a field, recording its type as an import unless it is a scalar or this model
    pub fn insert_field(&mut self, field: Field) {
        if !is_scalar_type(&field.type_name) && field.type_name != self.name {
            self.imports.insert(field.type_name.clone());
        }
        self.fields.insert(field.name.clone(), field);
    }
}
