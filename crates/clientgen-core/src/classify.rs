//! Operation classification: raw OpenAPI operation → `OperationIr`.
//!
//! The classifier detects the pagination filter, picks the success status,
//! lowers the request and response bodies to type names, and flags the
//! credential endpoints whose callers need the raw transport response.

// Internal imports (std, crate)
use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::ir::{HttpMethod, InputParam, OperationIr, Param, ResponseTypeDesc};
use crate::openapi::{OpenApiOperation, OpenApiParameter, JSON_CONTENT_TYPE, MERMAID_CONTENT_TYPE};
use crate::utils::{lower_first, path_placeholders, strip_component_prefix};

// External imports (alphabetized)
use serde_json::Value as JsonValue;

/// Health probes that never get a client function
pub const SKIPPED_OPERATIONS: [&str; 2] = ["CheckForLiveness", "CheckForReadiness"];

/// Body-carrying paths whose payload is semantically absent
pub const SKIPPED_BODY_PATHS: [&str; 3] = [
    "/api/v1/households/{householdID}/default",
    "/api/v1/recipes/{recipeID}/clone",
    "/api/v1/meal_plans/{mealPlanID}/finalize",
];

/// Credential flows whose caller inspects the transport response itself
pub const RAW_RESPONSE_OPERATIONS: [&str; 3] =
    ["updatePassword", "loginForToken", "adminLoginForToken"];

/// Raw-response operations whose "totp required" envelope error continues the login flow
pub const TOTP_TOLERANT_OPERATIONS: [&str; 2] = ["loginForToken", "adminLoginForToken"];

/// Envelope error message the login flows pass through
pub const TOTP_REQUIRED_MESSAGE: &str = "totp required";

/// The canonical pagination filter parameter names
pub const QUERY_FILTER_PARAMS: [&str; 8] = [
    "limit",
    "page",
    "createdBefore",
    "createdAfter",
    "updatedBefore",
    "updatedAfter",
    "sortBy",
    "includeArchived",
];

/// Success statuses in priority order; the last one present wins
const STATUS_PRIORITY: [u16; 4] = [200, 201, 202, 204];

pub fn is_skipped_operation(operation_id: &str) -> bool {
    SKIPPED_OPERATIONS.contains(&operation_id)
}

/// Classify every operation, dropping skipped ones and rejecting duplicate ids
pub fn classify_all(operations: &[OpenApiOperation]) -> Result<Vec<OperationIr>> {
    let mut seen = BTreeSet::new();
    let mut classified = Vec::with_capacity(operations.len());

    for op in operations {
        if !seen.insert(op.id.as_str()) {
            return Err(Error::openapi(format!("duplicate operationId {}", op.id)));
        }
        if let Some(ir) = classify(op).map_err(|e| e.in_operation(&op.id))? {
            classified.push(ir);
        }
    }

    Ok(classified)
}

/// Classify one operation; `None` for operations on the skip list
pub fn classify(op: &OpenApiOperation) -> Result<Option<OperationIr>> {
    if is_skipped_operation(&op.id) {
        log::debug!("skipping operation {}", op.id);
        return Ok(None);
    }

    let (query_filtered, remaining) = split_query_filter(&op.parameters);
    let params = lower_params(&op.id, &op.path, remaining)?;

    let (default_status_code, schema, from_mermaid) = select_response_schema(op);

    let input = lower_input(op);

    let (response, saw_list) = schema.map(lower_response).unwrap_or_default();
    if from_mermaid && response.type_name != "string" {
        log::warn!(
            "{}: text/mermaid response declares type '{}', expected string",
            op.id,
            response.type_name
        );
    }

    Ok(Some(OperationIr {
        operation_id: op.id.clone(),
        method: op.method,
        path: op.path.clone(),
        params,
        input,
        response,
        default_status_code,
        returns_list: query_filtered || saw_list,
        return_raw_response: RAW_RESPONSE_OPERATIONS.contains(&lower_first(&op.id).as_str()),
        query_filtered,
        description: op.description.clone(),
    }))
}

/// Remove every filter parameter; the op is filtered only if all eight were present
fn split_query_filter(params: &[OpenApiParameter]) -> (bool, Vec<&OpenApiParameter>) {
    let mut present = BTreeSet::new();
    let mut remaining = Vec::new();

    for param in params {
        if QUERY_FILTER_PARAMS.contains(&param.name.as_str()) {
            present.insert(param.name.as_str());
        } else {
            remaining.push(param);
        }
    }

    (present.len() == QUERY_FILTER_PARAMS.len(), remaining)
}

/// Keep typed path/query params; path params are put in placeholder order
fn lower_params(op_id: &str, path: &str, params: Vec<&OpenApiParameter>) -> Result<Vec<Param>> {
    let placeholders = path_placeholders(path);

    let mut path_params = Vec::with_capacity(placeholders.len());
    for placeholder in &placeholders {
        let declared = params
            .iter()
            .find(|p| p.in_ == "path" && &p.name == placeholder)
            .ok_or_else(|| {
                Error::openapi(format!(
                    "path placeholder {{{}}} in {} has no declared parameter",
                    placeholder, path
                ))
            })?;
        let type_name = declared.schema_type().ok_or_else(|| {
            Error::openapi(format!("path parameter {} has no schema type", placeholder))
        })?;
        path_params.push(Param::path(placeholder.clone(), type_name));
    }

    let mut lowered = path_params;
    for param in params.iter().filter(|p| p.in_ == "query") {
        match param.schema_type() {
            Some(type_name) => lowered.push(Param::query(param.name.clone(), type_name)),
            None => log::warn!(
                "{}: dropping query parameter {} without a scalar schema type",
                op_id,
                param.name
            ),
        }
    }

    Ok(lowered)
}

/// Walk 200, 201, 202, 204; the last present status wins, its JSON schema replaces any earlier one
fn select_response_schema(op: &OpenApiOperation) -> (u16, Option<&JsonValue>, bool) {
    let mut status = None;
    let mut schema = None;
    let mut from_mermaid = false;

    for code in STATUS_PRIORITY {
        let Some(response) = op.responses.get(&code.to_string()) else {
            continue;
        };
        status = Some(code);

        if let Some(json) = response.schema_for(JSON_CONTENT_TYPE) {
            schema = Some(json);
            from_mermaid = false;
        }
        if code == 200 {
            if let Some(mermaid) = response.schema_for(MERMAID_CONTENT_TYPE) {
                schema = Some(mermaid);
                from_mermaid = true;
            }
        }
    }

    (status.unwrap_or(200), schema, from_mermaid)
}

fn lower_input(op: &OpenApiOperation) -> InputParam {
    if !op.method.carries_body() || SKIPPED_BODY_PATHS.contains(&op.path.as_str()) {
        return InputParam::default();
    }

    op.request_body
        .as_ref()
        .and_then(|body| body.schema_for(JSON_CONTENT_TYPE))
        .and_then(|schema| schema.get("$ref"))
        .and_then(JsonValue::as_str)
        .map(|reference| InputParam::from_type(strip_component_prefix(reference)))
        .unwrap_or_default()
}

/// Lower a response schema; the flag reports an `items` payload (a list)
fn lower_response(schema: &JsonValue) -> (ResponseTypeDesc, bool) {
    let mut desc = ResponseTypeDesc::default();
    let mut saw_list = false;

    if let Some(branches) = schema.get("allOf") {
        for branch in branches.as_array().into_iter().flatten() {
            if let Some(container) = branch.get("$ref").and_then(JsonValue::as_str) {
                desc.generic_container = container.to_string();
            }

            let Some(data) = branch.pointer("/properties/data") else {
                continue;
            };
            if let Some(reference) = data.get("$ref") {
                if let Some(reference) = reference.as_str() {
                    desc.type_name = reference.to_string();
                }
            } else if let Some(items) = data.get("items") {
                desc.is_array = true;
                saw_list = true;
                if let Some(reference) = items.get("$ref").and_then(JsonValue::as_str) {
                    desc.type_name = reference.to_string();
                }
            } else if let Some(scalar) = data.get("type").and_then(JsonValue::as_str) {
                desc.type_name = scalar.to_string();
            }
        }
    } else if let Some(scalar) = schema.get("type").and_then(JsonValue::as_str) {
        desc.type_name = scalar.to_string();
    }

    desc.generic_container = strip_component_prefix(&desc.generic_container).to_string();
    desc.type_name = strip_component_prefix(&desc.type_name).to_string();

    (desc, saw_list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi::OpenApiContext;
    use serde_json::json;

    fn filter_params() -> Vec<JsonValue> {
        QUERY_FILTER_PARAMS
            .iter()
            .map(|name| json!({"name": name, "in": "query", "schema": {"type": "string"}}))
            .collect()
    }

    fn envelope(data: JsonValue) -> JsonValue {
        json!({"content": {"application/json": {"schema": {"allOf": [
            {"$ref": "#/components/schemas/APIResponse"},
            {"properties": {"data": data}}
        ]}}}})
    }

    fn ops(paths: JsonValue) -> Vec<OpenApiOperation> {
        OpenApiContext {
            json: json!({"openapi": "3.1.0", "paths": paths}),
        }
        .operations()
        .unwrap()
    }

    fn only(paths: JsonValue) -> OperationIr {
        let mut classified = classify_all(&ops(paths)).unwrap();
        assert_eq!(classified.len(), 1);
        classified.remove(0)
    }

    #[test]
    fn test_scalar_get() {
        let ir = only(json!({
            "/api/v1/recipes/{recipeID}": {"get": {
                "operationId": "GetRecipe",
                "parameters": [{"name": "recipeID", "in": "path", "schema": {"type": "string"}}],
                "responses": {"200": envelope(json!({"$ref": "#/components/schemas/Recipe"}))}
            }}
        }));

        assert_eq!(ir.backend_path_template(), "/api/v1/recipes/%s");
        assert_eq!(ir.params, vec![Param::path("recipeID", "string")]);
        assert_eq!(ir.response.type_name, "Recipe");
        assert_eq!(ir.response.generic_container, "APIResponse");
        assert!(!ir.response.is_array);
        assert!(!ir.returns_list);
        assert!(!ir.query_filtered);
        assert_eq!(ir.default_status_code, 200);
    }

    #[test]
    fn test_filtered_list_get() {
        let ir = only(json!({
            "/api/v1/recipes": {"get": {
                "operationId": "GetRecipes",
                "parameters": filter_params(),
                "responses": {"200": envelope(json!({"type": "array", "items": {"$ref": "#/components/schemas/Recipe"}}))}
            }}
        }));

        assert!(ir.query_filtered);
        assert!(ir.returns_list);
        assert!(ir.response.is_array);
        assert!(ir.params.is_empty());
    }

    #[test]
    fn test_partial_filter_is_stripped_but_not_filtered() {
        let ir = only(json!({
            "/api/v1/things": {"get": {
                "operationId": "GetThings",
                "parameters": [
                    {"name": "limit", "in": "query", "schema": {"type": "integer"}},
                    {"name": "page", "in": "query", "schema": {"type": "integer"}}
                ],
                "responses": {}
            }}
        }));

        assert!(!ir.query_filtered);
        assert!(ir.params.is_empty());
    }

    #[test]
    fn test_search_param_preserved() {
        let mut params = filter_params();
        params.push(json!({"name": "q", "in": "query", "schema": {"type": "string"}}));
        let ir = only(json!({
            "/api/v1/recipes/search": {"get": {
                "operationId": "SearchForRecipes",
                "parameters": params,
                "responses": {"200": envelope(json!({"type": "array", "items": {"$ref": "#/components/schemas/Recipe"}}))}
            }}
        }));

        assert!(ir.query_filtered);
        assert!(ir.has_search_param());
        assert_eq!(ir.path_params().count(), 0);
        assert_eq!(ir.backend_path_template(), "/api/v1/recipes/search");
    }

    #[test]
    fn test_post_with_body_and_later_status_wins() {
        let ir = only(json!({
            "/api/v1/recipes": {"post": {
                "operationId": "CreateRecipe",
                "requestBody": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/RecipeCreationRequestInput"}}}},
                "responses": {
                    "200": envelope(json!({"type": "string"})),
                    "201": envelope(json!({"$ref": "#/components/schemas/Recipe"}))
                }
            }}
        }));

        assert_eq!(ir.default_status_code, 201);
        assert_eq!(ir.input.type_name, "RecipeCreationRequestInput");
        assert_eq!(ir.input.name, "recipeCreationRequestInput");
        assert_eq!(ir.response.type_name, "Recipe");
    }

    #[test]
    fn test_skip_body_path() {
        let ir = only(json!({
            "/api/v1/recipes/{recipeID}/clone": {"post": {
                "operationId": "CloneRecipe",
                "parameters": [{"name": "recipeID", "in": "path", "schema": {"type": "string"}}],
                "requestBody": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/Recipe"}}}},
                "responses": {"201": envelope(json!({"$ref": "#/components/schemas/Recipe"}))}
            }}
        }));

        assert!(!ir.has_input());
    }

    #[test]
    fn test_raw_response_and_skip_ops() {
        let classified = classify_all(&ops(json!({
            "/_meta_/live": {"get": {"operationId": "CheckForLiveness", "responses": {}}},
            "/users/login": {"post": {
                "operationId": "loginForToken",
                "requestBody": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/UserLoginInput"}}}},
                "responses": {"202": envelope(json!({"$ref": "#/components/schemas/TokenResponse"}))}
            }}
        })))
        .unwrap();

        assert_eq!(classified.len(), 1);
        assert_eq!(classified[0].operation_id, "loginForToken");
        assert!(classified[0].return_raw_response);
        assert_eq!(classified[0].default_status_code, 202);
    }

    #[test]
    fn test_mermaid_overrides_json_for_200() {
        let ir = only(json!({
            "/api/v1/recipes/{recipeID}/dag": {"get": {
                "operationId": "GetMermaidDiagramForRecipe",
                "parameters": [{"name": "recipeID", "in": "path", "schema": {"type": "string"}}],
                "responses": {"200": {"content": {
                    "application/json": {"schema": {"$ref": "#/components/schemas/Ignored"}},
                    "text/mermaid": {"schema": {"type": "string"}}
                }}}
            }}
        }));

        assert_eq!(ir.response.type_name, "string");
        assert!(!ir.response.has_container());
    }

    #[test]
    fn test_missing_path_parameter_names_operation() {
        let err = classify_all(&ops(json!({
            "/api/v1/recipes/{recipeID}": {"get": {"operationId": "GetRecipe", "responses": {}}}
        })))
        .unwrap_err();

        assert_eq!(err.operation_id(), Some("GetRecipe"));
    }

    #[test]
    fn test_duplicate_operation_ids_rejected() {
        let err = classify_all(&ops(json!({
            "/a": {"get": {"operationId": "Same", "responses": {}}},
            "/b": {"get": {"operationId": "Same", "responses": {}}}
        })))
        .unwrap_err();

        assert!(err.to_string().contains("duplicate operationId Same"));
    }
}
