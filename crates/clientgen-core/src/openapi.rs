//! OpenAPI specification loading and the read-only view used by the generator.
//!
//! The document is kept as raw JSON. Operations are enumerated in a stable
//! order (paths lexicographically, then `GET, PUT, PATCH, POST, DELETE`), and
//! parameter `$ref`s are resolved against the document. Schema `$ref`s are
//! left as opaque strings; the generator only ever extracts names from them.
//!
//! # Examples
//!
//! ```no_run
//! use clientgen_core::openapi::OpenApiContext;
//! use clientgen_core::error::Result;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let spec = OpenApiContext::from_file("openapi.yaml").await?;
//!
//! if let Some(title) = spec.title() {
//!     println!("API Title: {}", title);
//! }
//! for op in spec.operations()? {
//!     println!("{} {} ({})", op.method, op.path, op.id);
//! }
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::collections::BTreeMap;
use std::path::Path;

use crate::ir::HttpMethod;
use crate::Error;

// External imports (alphabetized)
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};
use tokio::fs;
use url::Url;

/// JSON media type used for request and response bodies
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Non-JSON media type honored for the 200 response slot
pub const MERMAID_CONTENT_TYPE: &str = "text/mermaid";

/// Represents an OpenAPI specification
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct OpenApiContext {
    /// The raw JSON value of the OpenAPI spec
    pub json: JsonValue,
}

impl OpenApiContext {
    /// Load a spec from a file path or an http(s) URL (YAML or JSON)
    pub async fn from_file_or_url<P: AsRef<str>>(location: P) -> crate::Result<Self> {
        let location = location.as_ref();

        match Url::parse(location) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                Self::from_url(url.as_str()).await
            }
            _ => Self::from_file(location).await,
        }
    }

    /// Load a spec from a file (YAML or JSON)
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::openapi(format!(
                "Failed to read OpenAPI spec at {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse_content(&content).map_err(|e| {
            Error::openapi(format!(
                "Failed to parse OpenAPI spec at {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Fetch a spec over HTTP (YAML or JSON)
    pub async fn from_url(url: &str) -> crate::Result<Self> {
        let response = reqwest::get(url).await.map_err(|e| {
            Error::openapi(format!("Failed to fetch OpenAPI spec from {}: {}", url, e))
        })?;

        if !response.status().is_success() {
            return Err(Error::openapi(format!(
                "Failed to fetch OpenAPI spec from {}: HTTP {}",
                url,
                response.status()
            )));
        }

        let content = response.text().await.map_err(|e| {
            Error::openapi(format!("Failed to read response from {}: {}", url, e))
        })?;

        Self::parse_content(&content).map_err(|e| {
            Error::openapi(format!("Failed to parse OpenAPI spec from {}: {}", url, e))
        })
    }

    /// Parse content as either JSON or YAML
    pub fn parse_content(content: &str) -> Result<Self, String> {
        if let Ok(json) = serde_json::from_str(content) {
            return Ok(Self { json });
        }

        serde_yaml::from_str(content)
            .map(|json| Self { json })
            .map_err(|e| format!("content is neither valid JSON nor YAML: {}", e))
    }

    /// Get a reference to the raw JSON value
    pub fn as_json(&self) -> &JsonValue {
        &self.json
    }

    /// Get the title of the API
    pub fn title(&self) -> Option<&str> {
        self.json.get("info")?.get("title")?.as_str()
    }

    /// Get the version of the API
    pub fn version(&self) -> Option<&str> {
        self.json.get("info")?.get("version")?.as_str()
    }

    /// Component schemas keyed by name, in name order
    pub fn component_schemas(&self) -> BTreeMap<&str, &JsonValue> {
        self.json
            .pointer("/components/schemas")
            .and_then(JsonValue::as_object)
            .map(|schemas| schemas.iter().map(|(k, v)| (k.as_str(), v)).collect())
            .unwrap_or_default()
    }

    /// Every operation in the document, in path then method order
    pub fn operations(&self) -> crate::Result<Vec<OpenApiOperation>> {
        let paths = self
            .json
            .get("paths")
            .and_then(JsonValue::as_object)
            .ok_or_else(|| Error::openapi("Missing 'paths' object"))?;

        let ordered: BTreeMap<&String, &JsonValue> = paths.iter().collect();

        let mut operations = Vec::new();
        for (path, item) in ordered {
            let shared_params = self.extract_parameters(path, item);

            for method in HttpMethod::all() {
                let Some(op) = item.get(method.path_item_key()).and_then(JsonValue::as_object)
                else {
                    continue;
                };

                let id = op
                    .get("operationId")
                    .and_then(JsonValue::as_str)
                    .map(String::from)
                    .ok_or_else(|| {
                        Error::openapi(format!("{} {} has no operationId", method, path))
                    })?;

                let parameters =
                    merge_parameters(&shared_params, self.extract_parameters_map(&id, op));

                operations.push(OpenApiOperation {
                    method,
                    path: path.clone(),
                    description: op
                        .get("description")
                        .and_then(JsonValue::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    parameters,
                    request_body: op
                        .get("requestBody")
                        .and_then(|body| decode(&id, "request body", self.resolve_ref(body))),
                    responses: self.extract_responses(&id, op),
                    id,
                });
            }
        }
        Ok(operations)
    }

    /// Parameters declared on a path item or operation, `$ref`s resolved.
    /// `owner` (a path or operation id) labels the warning for a malformed entry.
    pub fn extract_parameters(&self, owner: &str, item: &JsonValue) -> Vec<OpenApiParameter> {
        item.as_object()
            .map(|obj| self.extract_parameters_map(owner, obj))
            .unwrap_or_default()
    }

    fn extract_parameters_map(
        &self,
        owner: &str,
        item: &JsonMap<String, JsonValue>,
    ) -> Vec<OpenApiParameter> {
        item.get("parameters")
            .and_then(JsonValue::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|param| decode(owner, "parameter", self.resolve_ref(param)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Responses keyed by status string
    pub fn extract_responses(
        &self,
        op_id: &str,
        op: &JsonMap<String, JsonValue>,
    ) -> BTreeMap<String, OpenApiResponse> {
        op.get("responses")
            .and_then(JsonValue::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(status, resp)| {
                        let what = format!("{} response", status);
                        decode(op_id, &what, self.resolve_ref(resp))
                            .map(|resp| (status.clone(), resp))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Follow a local `$ref` (`#/components/...`) once; anything else is returned as-is
    fn resolve_ref<'a>(&'a self, value: &'a JsonValue) -> &'a JsonValue {
        value
            .get("$ref")
            .and_then(JsonValue::as_str)
            .and_then(|r| r.strip_prefix('#'))
            .and_then(|pointer| self.json.pointer(pointer))
            .unwrap_or(value)
    }
}

/// Deserialize one document fragment, warning and dropping it when malformed
fn decode<T: DeserializeOwned>(owner: &str, what: &str, value: &JsonValue) -> Option<T> {
    match T::deserialize(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            log::warn!("{}: dropping malformed {}: {}", owner, what, e);
            None
        }
    }
}

/// Operation-level parameters override path-level ones with the same name and location
fn merge_parameters(
    shared: &[OpenApiParameter],
    own: Vec<OpenApiParameter>,
) -> Vec<OpenApiParameter> {
    let mut merged: Vec<OpenApiParameter> = shared
        .iter()
        .filter(|p| !own.iter().any(|o| o.name == p.name && o.in_ == p.in_))
        .cloned()
        .collect();
    merged.extend(own);
    merged
}

/// One operation of the document
#[derive(Debug, Clone)]
pub struct OpenApiOperation {
    pub id: String,
    pub method: HttpMethod,
    pub path: String,
    pub description: String,
    pub parameters: Vec<OpenApiParameter>,
    pub request_body: Option<OpenApiRequestBody>,
    pub responses: BTreeMap<String, OpenApiResponse>,
}

/// Information about a single parameter in an OpenAPI operation.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OpenApiParameter {
    /// The name of the parameter. Parameter names are case sensitive.
    pub name: String,
    /// The location of the parameter: "query", "header", "path", or "cookie".
    #[serde(rename = "in")]
    pub in_: String,
    /// Determines whether this parameter is mandatory.
    pub required: Option<bool>,
    /// The schema defining the type used for the parameter.
    pub schema: Option<JsonValue>,
}

impl OpenApiParameter {
    /// The scalar `schema.type`, when declared as a plain string
    pub fn schema_type(&self) -> Option<&str> {
        self.schema.as_ref()?.get("type")?.as_str()
    }
}

/// A media-type entry (`content.<media type>`)
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct OpenApiMediaType {
    #[serde(default)]
    pub schema: Option<JsonValue>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct OpenApiRequestBody {
    pub description: Option<String>,
    #[serde(default)]
    pub content: BTreeMap<String, OpenApiMediaType>,
}

impl OpenApiRequestBody {
    pub fn schema_for(&self, media_type: &str) -> Option<&JsonValue> {
        self.content.get(media_type)?.schema.as_ref()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct OpenApiResponse {
    /// A short description of the response.
    pub description: Option<String>,
    /// Payload descriptions keyed by media type.
    #[serde(default)]
    pub content: BTreeMap<String, OpenApiMediaType>,
}

impl OpenApiResponse {
    pub fn schema_for(&self, media_type: &str) -> Option<&JsonValue> {
        self.content.get(media_type)?.schema.as_ref()
    }
}
