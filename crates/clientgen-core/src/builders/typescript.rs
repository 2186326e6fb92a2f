//! TypeScript-specific context builders: client methods, Jest suites,
//! Playwright route mocks and model classes.

// Internal imports (std, crate)
use std::collections::BTreeMap;

use super::{BuiltContext, EndpointContextBuilder, ModelContextBuilder};
use crate::classify::TOTP_REQUIRED_MESSAGE;
use crate::error::{Error, Result};
use crate::ir::{Field, OperationIr, TypeDef};
use crate::render::{ImportSet, TemplateSelection};
use crate::schema::{is_range_type, EnumOverrides};
use crate::templates::TemplateOptions;

// External imports (alphabetized)
use serde::Serialize;

pub const CLIENT_MODULE: &str = "./client.gen";
pub const TEST_HELPERS_MODULE: &str = "./core.test_helpers.gen";
pub const RANGES_MODULE: &str = "./core.ranges.gen";
pub const RESPONSE_CONFIG_MODULE: &str = "./core.response_config.gen";

const AXIOS: &str = "axios";
const AXIOS_MOCK_ADAPTER: &str = "axios-mock-adapter";
const PLAYWRIGHT: &str = "@playwright/test";

/// Verb rewrites turning an operation description into a test name
const TEST_DESCRIPTION_REPLACEMENTS: [(&str, &str); 8] = [
    ("Creates", "create"),
    ("Updates", "update"),
    ("Fetches", "fetch"),
    ("Gets", "get"),
    ("Archives", "archive"),
    ("Deletes", "delete"),
    ("Cancels", "cancel"),
    ("Rejects", "reject"),
];

/// TypeScript type of an OpenAPI scalar; `None` for DTOs
pub fn ts_scalar(type_name: &str) -> Option<&'static str> {
    match type_name {
        "string" => Some("string"),
        "number" | "integer" => Some("number"),
        "boolean" => Some("boolean"),
        "object" => Some("Record<string, any>"),
        _ => None,
    }
}

/// Zero literal of a TypeScript scalar
fn ts_zero(ts_type: &str) -> &'static str {
    match ts_type {
        "number" => "0",
        "boolean" => "false",
        "Record<string, any>" => "{}",
        _ => "''",
    }
}

/// `it(...)` wording for an operation; falls back to the method name
pub fn test_description(op: &OperationIr) -> String {
    let first_line = op.description.lines().next().unwrap_or_default().trim();
    let mut description = first_line.trim_end_matches('.').to_string();
    if description.is_empty() {
        return op.frontend_name();
    }
    for (from, to) in TEST_DESCRIPTION_REPLACEMENTS {
        description = description.replace(from, to);
    }
    description.replace('\'', "\\'")
}

/// Path template as a template literal, interpolating `prefix` + param name
fn path_literal(op: &OperationIr, prefix: &str) -> String {
    let mut path = op.path.clone();
    for param in op.path_params() {
        path = path.replace(
            &format!("{{{}}}", param.name),
            &format!("${{{}{}}}", prefix, param.name),
        );
    }
    format!("`{}`", path)
}

#[derive(Debug, Clone, Serialize)]
pub struct TsEndpointContext {
    pub name: String,
    pub doc_lines: Vec<String>,
    /// `name: type` entries of the method signature
    pub signature_params: Vec<String>,
    /// String path parameters that must be non-empty
    pub guards: Vec<String>,
    pub axios_method: String,
    pub response_type: String,
    /// Arguments of the Axios call
    pub request_args: String,
    pub return_type: String,
    pub has_container: bool,
    /// Rejection test on the envelope; empty when the response has no envelope
    pub error_condition: String,
    pub resolve_expr: String,
    pub list_element: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TsGuardCase {
    pub param: String,
    pub call_args: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TsTestContext {
    pub name: String,
    pub description: String,
    pub setup: Vec<String>,
    pub call_args: String,
    pub url_expr: String,
    /// Lower-case method, keying both `mock.history` and the `mock.on*` stub
    pub history_key: String,
    pub status: u16,
    pub response_setup: String,
    pub response_binding: String,
    pub success_assertions: Vec<String>,
    pub guard_cases: Vec<TsGuardCase>,
    pub has_container: bool,
    pub tolerates_totp_required: bool,
    pub totp_required_message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TsMockContext {
    /// Operation name, capitalized into the class and function names
    pub name: String,
    pub body_type: String,
    pub path_params: Vec<String>,
    pub route_pattern: String,
    pub http_method: String,
    pub status: u16,
    pub default_body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TsField {
    pub name: String,
    pub ts_type: String,
    pub optional: bool,
    /// Right-hand side of `input.<name> ?? ...`; empty when the default is `undefined`
    pub default_expr: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TsModelContext {
    pub name: String,
    pub fields: Vec<TsField>,
}

/// How the decoded payload is typed in TypeScript
struct TsResponse {
    container: String,
    /// Leaf type, `any` when the response carries none
    leaf: String,
    leaf_is_dto: bool,
    data_type: String,
    response_type: String,
    returns_value: bool,
}

#[derive(Debug, Clone)]
pub struct TypeScriptContextBuilder {
    options: TemplateOptions,
    overrides: EnumOverrides,
    /// First literal of each enum component, used as the model default
    enum_defaults: BTreeMap<String, String>,
}

impl TypeScriptContextBuilder {
    pub fn new(
        options: TemplateOptions,
        overrides: EnumOverrides,
        enum_defaults: BTreeMap<String, String>,
    ) -> Self {
        Self {
            options,
            overrides,
            enum_defaults,
        }
    }

    pub fn options(&self) -> &TemplateOptions {
        &self.options
    }

    /// Context shared by the bootstrap and static files
    pub fn static_context(&self) -> serde_json::Value {
        serde_json::json!({
            "models_import": self.options.models_import,
            "browser_base_url": self.options.browser_base_url,
            "local_base_url": self.options.local_base_url,
        })
    }

    fn response(&self, op: &OperationIr) -> TsResponse {
        let selection = TemplateSelection::for_operation(op);
        let type_name = &op.response.type_name;
        let (leaf, leaf_is_dto) = match ts_scalar(type_name) {
            Some(scalar) => (scalar.to_string(), false),
            None if type_name.is_empty() => ("any".to_string(), false),
            None => (type_name.clone(), true),
        };

        let data_type = if op.returns_list || op.response.is_array {
            format!("{}[]", leaf)
        } else {
            leaf.clone()
        };
        let container = op.response.generic_container.clone();
        let response_type = if container.is_empty() {
            data_type.clone()
        } else {
            format!("{}<{}>", container, data_type)
        };

        TsResponse {
            returns_value: selection.returns_value() && !type_name.is_empty(),
            container,
            leaf,
            leaf_is_dto,
            data_type,
            response_type,
        }
    }

    fn add_response_imports(&self, imports: &mut ImportSet, response: &TsResponse) {
        if !response.container.is_empty() {
            imports.add_named(&self.options.models_import, &response.container);
        }
        if response.leaf_is_dto {
            imports.add_named(&self.options.models_import, &response.leaf);
        }
    }

    /// Fake value for a parameter of OpenAPI type `type_name`
    fn fake_param(name: &str, type_name: &str) -> String {
        let value = match ts_scalar(type_name) {
            Some("number") => "0",
            Some("boolean") => "false",
            _ => "fakeID()",
        };
        format!("const {} = {};", name, value)
    }

    fn example_data(response: &TsResponse, op: &OperationIr) -> String {
        let single = if response.leaf_is_dto {
            format!("new {}()", response.leaf)
        } else if response.leaf == "string" {
            "fakeID()".to_string()
        } else if response.leaf == "any" {
            "{}".to_string()
        } else {
            ts_zero(&response.leaf).to_string()
        };
        if op.returns_list || op.response.is_array {
            format!("[{}]", single)
        } else {
            single
        }
    }

    /// Module a referenced model type is imported from
    fn model_module(&self, type_name: &str) -> String {
        if is_range_type(type_name) {
            RANGES_MODULE.to_string()
        } else if self.overrides.is_override_type(type_name)
            || self.enum_defaults.contains_key(type_name)
        {
            self.options.enums_import.clone()
        } else {
            format!("./type.{}.gen", type_name)
        }
    }

    /// TypeScript type and default of one model field
    fn model_field(&self, def: &TypeDef, field: &Field) -> Result<TsField> {
        let type_name = field.type_name.as_str();
        let (base, default) = if let Some(scalar) = ts_scalar(type_name) {
            (scalar.to_string(), ts_zero(scalar).to_string())
        } else if is_range_type(type_name) {
            (type_name.to_string(), format!("new {}()", type_name))
        } else if self.overrides.is_override_type(type_name) {
            let default = self.overrides.default_for(type_name).ok_or_else(|| {
                Error::config(format!(
                    "enum override type {} used by {}.{} has no default",
                    type_name, def.name, field.name
                ))
            })?;
            (type_name.to_string(), default.to_string())
        } else if let Some(first) = self.enum_defaults.get(type_name) {
            (type_name.to_string(), first.clone())
        } else {
            (type_name.to_string(), format!("new {}()", type_name))
        };

        // a direct self-reference would recurse in the constructor
        let self_reference = type_name == def.name && !field.array;
        let optional = field.nullable || self_reference;

        Ok(TsField {
            name: field.name.clone(),
            ts_type: if field.array {
                format!("NonNullable<Array<{}>>", base)
            } else {
                base
            },
            optional,
            default_expr: if field.array {
                "[]".to_string()
            } else if optional {
                String::new()
            } else {
                default
            },
        })
    }

    /// Context for the Playwright route mock of an operation
    pub fn build_mock(&self, op: &OperationIr) -> Result<BuiltContext> {
        let response = self.response(op);

        let mut imports = ImportSet::new();
        imports
            .add_named(PLAYWRIGHT, "Page")
            .add_named(PLAYWRIGHT, "Route")
            .add_named(RESPONSE_CONFIG_MODULE, "ResponseConfig")
            .add_named(RESPONSE_CONFIG_MODULE, "assertClient")
            .add_named(RESPONSE_CONFIG_MODULE, "assertMethod");

        let (body_type, default_body) = if op.query_filtered {
            imports.add_named(&self.options.models_import, "QueryFilteredResult");
            if response.leaf_is_dto {
                imports.add_named(&self.options.models_import, &response.leaf);
            }
            (
                format!("QueryFilteredResult<{}>", response.leaf),
                format!("new QueryFilteredResult<{}>({{ data: [] }})", response.leaf),
            )
        } else {
            self.add_response_imports(&mut imports, &response);
            (response.response_type.clone(), String::new())
        };

        let has_query = op.query_filtered || op.query_params().next().is_some();
        let route = path_literal(op, "resCfg.");
        let route_pattern = format!(
            "`**{}{}`",
            route.trim_matches('`'),
            if has_query { "?**" } else { "" }
        );

        let context = TsMockContext {
            name: op.backend_name().to_string(),
            body_type,
            path_params: op.path_params().map(|p| p.name.clone()).collect(),
            route_pattern,
            http_method: op.method.as_str().to_string(),
            status: op.default_status_code,
            default_body,
        };
        Ok(BuiltContext::new(serde_json::to_value(context)?, imports))
    }

    /// Context for the client class, given the rendered method bodies
    pub fn build_client(&self, methods: &[String], method_imports: &ImportSet) -> BuiltContext {
        let mut imports = method_imports.clone();
        imports
            .add_default(AXIOS, "axios")
            .add_named(AXIOS, "AxiosError")
            .add_named(AXIOS, "AxiosInstance")
            .add_named(AXIOS, "AxiosResponse");

        BuiltContext::new(serde_json::json!({ "methods": methods }), imports)
    }

    /// Context for the client bootstrap `index.ts`
    pub fn build_index(&self) -> BuiltContext {
        let mut imports = ImportSet::new();
        imports.add_named(CLIENT_MODULE, "APIClient");
        BuiltContext::new(self.static_context(), imports)
    }

    /// Context for the models `index.ts`, re-exporting every model module
    pub fn build_models_index(&self, modules: &[String]) -> BuiltContext {
        BuiltContext::new(
            serde_json::json!({ "modules": modules }),
            ImportSet::new(),
        )
    }
}

impl EndpointContextBuilder for TypeScriptContextBuilder {
    fn build(&self, op: &OperationIr) -> Result<BuiltContext> {
        let selection = TemplateSelection::for_operation(op);
        let response = self.response(op);
        let mut imports = ImportSet::new();
        self.add_response_imports(&mut imports, &response);

        let mut signature_params: Vec<String> = op
            .path_params()
            .chain(op.query_params())
            .map(|p| format!("{}: {}", p.name, ts_scalar(&p.type_name).unwrap_or("string")))
            .collect();
        let guards = op
            .path_params()
            .filter(|p| ts_scalar(&p.type_name).unwrap_or("string") == "string")
            .map(|p| p.name.clone())
            .collect();

        let query_names: Vec<String> = op.query_params().map(|p| p.name.clone()).collect();
        let params_expr = if op.query_filtered {
            imports
                .add_named(&self.options.models_import, "QueryFilter")
                .add_named(&self.options.models_import, "QueryFilteredResult");
            signature_params.push("filter: QueryFilter = QueryFilter.Default()".to_string());
            let mut entries = vec!["...filter.asRecord()".to_string()];
            entries.extend(query_names.iter().cloned());
            Some(format!("{{ {} }}", entries.join(", ")))
        } else if !query_names.is_empty() {
            Some(format!("{{ {} }}", query_names.join(", ")))
        } else {
            None
        };

        if op.has_input() {
            imports.add_named(&self.options.models_import, &op.input.type_name);
            signature_params.push(format!("input: {}", op.input.type_name));
        }

        let url = op.frontend_path_template();
        let config = params_expr
            .map(|params| format!("{{ params: {} }}", params))
            .unwrap_or_else(|| "{}".to_string());
        let request_args = if op.method.carries_body() {
            let body = if op.has_input() { "input" } else { "undefined" };
            format!("`{}`, {}, {}", url, body, config)
        } else {
            format!("`{}`, {}", url, config)
        };

        let has_container = !response.container.is_empty();
        let (return_type, resolve_expr) = if op.return_raw_response {
            (
                format!("Promise<AxiosResponse<{}>>", response.response_type),
                "res".to_string(),
            )
        } else if selection == TemplateSelection::ListReader {
            (
                format!("Promise<QueryFilteredResult<{}>>", response.leaf),
                String::new(),
            )
        } else if response.returns_value {
            let expr = if has_container { "res.data.data" } else { "res.data" };
            (format!("Promise<{}>", response.data_type), expr.to_string())
        } else {
            ("Promise<void>".to_string(), String::new())
        };

        let error_condition = if !has_container {
            String::new()
        } else if op.tolerates_totp_required() {
            format!(
                "res.data.error && res.data.error.message.toLowerCase() !== '{}'",
                TOTP_REQUIRED_MESSAGE
            )
        } else {
            "res.data.error".to_string()
        };

        let context = TsEndpointContext {
            name: op.frontend_name(),
            doc_lines: op
                .description
                .trim()
                .lines()
                .map(|l| l.trim_end().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
            signature_params,
            guards,
            axios_method: op.method.path_item_key().to_string(),
            response_type: response.response_type.clone(),
            request_args,
            return_type,
            has_container,
            error_condition,
            resolve_expr,
            list_element: response.leaf.clone(),
        };

        Ok(BuiltContext::new(serde_json::to_value(context)?, imports))
    }

    fn build_test(&self, op: &OperationIr) -> Result<BuiltContext> {
        let selection = TemplateSelection::for_operation(op);
        let response = self.response(op);
        let name = op.frontend_name();
        let history_key = op.method.path_item_key().to_string();
        let has_container = !response.container.is_empty();

        let mut imports = ImportSet::new();
        imports
            .add_default(AXIOS_MOCK_ADAPTER, "AxiosMockAdapter")
            .add_named(CLIENT_MODULE, "APIClient")
            .add_named(TEST_HELPERS_MODULE, "buildObligatoryError");
        self.add_response_imports(&mut imports, &response);

        let mut setup: Vec<String> = op
            .path_params()
            .chain(op.query_params())
            .map(|p| Self::fake_param(&p.name, &p.type_name))
            .collect();
        let mut args: Vec<String> = op
            .path_params()
            .chain(op.query_params())
            .map(|p| p.name.clone())
            .collect();
        if op.has_input() {
            imports.add_named(&self.options.models_import, &op.input.type_name);
            setup.push(format!("const exampleInput = new {}();", op.input.type_name));
            args.push("exampleInput".to_string());
        }

        let example = Self::example_data(&response, op);
        let response_setup = if !has_container {
            format!("const exampleResponse = {};", example)
        } else if response.leaf == "any" {
            format!("const exampleResponse = new {}<any>({{}});", response.container)
        } else if selection == TemplateSelection::ListReader {
            imports.add_named(&self.options.models_import, "QueryFilter");
            format!(
                "const exampleResponse = new {}<{}>({{\n      data: {},\n      pagination: QueryFilter.Default().toPagination(),\n    }});",
                response.container, response.data_type, example
            )
        } else {
            format!(
                "const exampleResponse = new {}<{}>({{ data: {} }});",
                response.container, response.data_type, example
            )
        };

        if setup.iter().chain(std::iter::once(&response_setup)).any(|l| l.contains("fakeID()")) {
            imports.add_named(TEST_HELPERS_MODULE, "fakeID");
        }

        let query_names: Vec<String> = op.query_params().map(|p| p.name.clone()).collect();
        let expected = if has_container {
            "exampleResponse.data"
        } else {
            "exampleResponse"
        };
        let mut success_assertions = Vec::new();
        let response_binding = if op.return_raw_response {
            success_assertions.push("expect(response.data).toEqual(exampleResponse);".to_string());
            "const response = await "
        } else if selection == TemplateSelection::ListReader {
            success_assertions.push(format!("expect(response.data).toEqual({});", expected));
            "const response = await "
        } else if response.returns_value {
            success_assertions.push(format!("expect(response).toEqual({});", expected));
            "const response = await "
        } else {
            "await "
        };

        if op.query_filtered {
            let mut entries = vec!["...QueryFilter.Default().asRecord()".to_string()];
            entries.extend(query_names.iter().cloned());
            success_assertions.push(format!(
                "expect(mock.history.{}[0].params).toEqual({{ {} }});",
                history_key,
                entries.join(", ")
            ));
        } else if !query_names.is_empty() {
            success_assertions.push(format!(
                "expect(mock.history.{}[0].params).toEqual({{ {} }});",
                history_key,
                query_names.join(", ")
            ));
        }
        if op.has_input() {
            success_assertions.push(format!(
                "expect(mock.history.{}[0].data).toBe(JSON.stringify(exampleInput));",
                history_key
            ));
        }
        success_assertions.push(format!(
            "expect(mock.history.{}.length).toBe(1);",
            history_key
        ));
        success_assertions.push(format!(
            "expect(mock.history.{}[0].headers).toHaveProperty('Authorization', 'Bearer test-token');",
            history_key
        ));

        let guard_cases = op
            .path_params()
            .enumerate()
            .filter(|(_, p)| ts_scalar(&p.type_name).unwrap_or("string") == "string")
            .map(|(i, p)| {
                let mut case_args = args.clone();
                case_args[i] = "''".to_string();
                TsGuardCase {
                    param: p.name.clone(),
                    call_args: case_args.join(", "),
                }
            })
            .collect();

        let context = TsTestContext {
            description: test_description(op),
            setup,
            call_args: args.join(", "),
            url_expr: path_literal(op, ""),
            history_key,
            status: op.default_status_code,
            response_setup,
            response_binding: response_binding.to_string(),
            success_assertions,
            guard_cases,
            has_container,
            tolerates_totp_required: op.tolerates_totp_required(),
            totp_required_message: TOTP_REQUIRED_MESSAGE.to_string(),
            name,
        };

        Ok(BuiltContext::new(serde_json::to_value(context)?, imports))
    }
}

impl ModelContextBuilder for TypeScriptContextBuilder {
    fn build_model(&self, def: &TypeDef) -> Result<BuiltContext> {
        let fields = def
            .fields
            .values()
            .map(|field| self.model_field(def, field))
            .collect::<Result<Vec<_>>>()?;

        let mut imports = ImportSet::new();
        for type_name in &def.imports {
            imports.add_named(self.model_module(type_name), type_name);
        }

        let context = TsModelContext {
            name: def.name.clone(),
            fields,
        };
        Ok(BuiltContext::new(serde_json::to_value(context)?, imports))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{HttpMethod, InputParam, Param, ResponseTypeDesc};

    fn op(id: &str, method: HttpMethod, path: &str) -> OperationIr {
        OperationIr {
            operation_id: id.to_string(),
            method,
            path: path.to_string(),
            params: Vec::new(),
            input: InputParam::default(),
            response: ResponseTypeDesc {
                type_name: "Recipe".to_string(),
                generic_container: "APIResponse".to_string(),
                is_array: false,
            },
            default_status_code: 200,
            returns_list: false,
            return_raw_response: false,
            query_filtered: false,
            description: String::new(),
        }
    }

    fn builder() -> TypeScriptContextBuilder {
        TypeScriptContextBuilder::new(
            TemplateOptions::default(),
            EnumOverrides::default(),
            BTreeMap::from([("ValidUnit".to_string(), "'grams'".to_string())]),
        )
    }

    #[test]
    fn test_scalar_method_resolves_inner_data() -> Result<()> {
        let mut get = op("GetRecipe", HttpMethod::Get, "/api/v1/recipes/{recipeID}");
        get.params = vec![Param::path("recipeID", "string")];

        let built = builder().build(&get)?;
        let ctx = &built.context;
        assert_eq!(ctx["name"], "getRecipe");
        assert_eq!(ctx["return_type"], "Promise<Recipe>");
        assert_eq!(ctx["resolve_expr"], "res.data.data");
        assert_eq!(ctx["request_args"], "`/api/v1/recipes/${recipeID}`, {}");
        assert_eq!(ctx["guards"][0], "recipeID");
        let models: Vec<_> = built.imports.symbols("@api/models").unwrap().iter().cloned().collect();
        assert_eq!(models, vec!["APIResponse", "Recipe"]);
        Ok(())
    }

    #[test]
    fn test_search_list_method() -> Result<()> {
        let mut search = op("SearchForRecipes", HttpMethod::Get, "/api/v1/recipes/search");
        search.params = vec![Param::query("q", "string")];
        search.query_filtered = true;
        search.returns_list = true;

        let built = builder().build(&search)?;
        let ctx = &built.context;
        assert_eq!(ctx["return_type"], "Promise<QueryFilteredResult<Recipe>>");
        assert_eq!(
            ctx["request_args"],
            "`/api/v1/recipes/search`, { params: { ...filter.asRecord(), q } }"
        );
        assert_eq!(ctx["signature_params"][0], "q: string");
        assert_eq!(ctx["signature_params"][1], "filter: QueryFilter = QueryFilter.Default()");
        assert!(ctx["guards"].as_array().unwrap().is_empty());
        Ok(())
    }

    #[test]
    fn test_raw_login_tolerates_totp() -> Result<()> {
        let mut login = op("loginForToken", HttpMethod::Post, "/users/login/jwt");
        login.input = InputParam::from_type("UserLoginInput");
        login.response.type_name = "TokenResponse".to_string();
        login.return_raw_response = true;

        let built = builder().build(&login)?;
        let ctx = &built.context;
        assert_eq!(
            ctx["return_type"],
            "Promise<AxiosResponse<APIResponse<TokenResponse>>>"
        );
        assert_eq!(ctx["resolve_expr"], "res");
        assert_eq!(
            ctx["error_condition"],
            "res.data.error && res.data.error.message.toLowerCase() !== 'totp required'"
        );
        assert_eq!(
            ctx["request_args"],
            "`/users/login/jwt`, input, {}"
        );
        Ok(())
    }

    #[test]
    fn test_update_resolves_void() -> Result<()> {
        let mut update = op("UpdateRecipe", HttpMethod::Put, "/api/v1/recipes/{recipeID}");
        update.params = vec![Param::path("recipeID", "string")];
        update.input = InputParam::from_type("RecipeUpdateRequestInput");

        let built = builder().build(&update)?;
        assert_eq!(built.context["return_type"], "Promise<void>");

        let test = builder().build_test(&update)?;
        assert_eq!(test.context["call_args"], "recipeID, exampleInput");
        assert_eq!(test.context["guard_cases"][0]["call_args"], "'', exampleInput");
        assert_eq!(test.context["response_binding"], "await ");
        assert_eq!(test.context["history_key"], "put");
        Ok(())
    }

    #[test]
    fn test_test_description_rewrites_verbs() {
        let mut get = op("GetRecipe", HttpMethod::Get, "/api/v1/recipes/{recipeID}");
        get.description = "Fetches a recipe's details.\nMore text".to_string();
        assert_eq!(test_description(&get), "fetch a recipe\\'s details");
        get.description.clear();
        assert_eq!(test_description(&get), "getRecipe");
    }

    #[test]
    fn test_mock_route_pattern() -> Result<()> {
        let mut list = op("GetRecipeSteps", HttpMethod::Get, "/api/v1/recipes/{recipeID}/steps");
        list.params = vec![Param::path("recipeID", "string")];
        list.query_filtered = true;
        list.returns_list = true;
        list.response.type_name = "RecipeStep".to_string();

        let built = builder().build_mock(&list)?;
        let ctx = &built.context;
        assert_eq!(ctx["name"], "GetRecipeSteps");
        assert_eq!(ctx["route_pattern"], "`**/api/v1/recipes/${resCfg.recipeID}/steps?**`");
        assert_eq!(ctx["body_type"], "QueryFilteredResult<RecipeStep>");
        assert_eq!(
            ctx["default_body"],
            "new QueryFilteredResult<RecipeStep>({ data: [] })"
        );
        Ok(())
    }

    fn field(name: &str, type_name: &str, nullable: bool, array: bool) -> Field {
        Field {
            name: name.to_string(),
            type_name: type_name.to_string(),
            nullable,
            array,
        }
    }

    #[test]
    fn test_model_defaults_and_imports() -> Result<()> {
        let mut def = TypeDef::new("MealPlan");
        def.insert_field(field("notes", "string", false, false));
        def.insert_field(field("votingDeadline", "number", true, false));
        def.insert_field(field("events", "MealPlanEvent", false, true));
        def.insert_field(field("owner", "User", false, false));
        def.insert_field(field("portions", "NumberRange", false, false));
        def.insert_field(field("status", "ValidMealPlanStatus", false, false));
        def.insert_field(field("unit", "ValidUnit", false, false));
        def.insert_field(field("parent", "MealPlan", false, false));

        let built = builder().build_model(&def)?;
        let by_name: BTreeMap<String, serde_json::Value> = built.context["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| (f["name"].as_str().unwrap().to_string(), f.clone()))
            .collect();

        assert_eq!(by_name["notes"]["default_expr"], "''");
        assert!(by_name["votingDeadline"]["optional"] == true);
        assert_eq!(by_name["votingDeadline"]["default_expr"], "");
        assert_eq!(by_name["events"]["ts_type"], "NonNullable<Array<MealPlanEvent>>");
        assert_eq!(by_name["events"]["default_expr"], "[]");
        assert_eq!(by_name["owner"]["default_expr"], "new User()");
        assert_eq!(by_name["portions"]["default_expr"], "new NumberRange()");
        assert_eq!(by_name["status"]["default_expr"], "'awaiting_votes'");
        assert_eq!(by_name["unit"]["default_expr"], "'grams'");
        assert!(by_name["parent"]["optional"] == true);

        assert!(built.imports.contains("./type.User.gen"));
        assert!(built.imports.contains("./type.MealPlanEvent.gen"));
        assert!(!built.imports.contains("./type.MealPlan.gen"));
        assert!(built.imports.contains("./core.ranges.gen"));
        let enums: Vec<_> = built.imports.symbols("./_unions").unwrap().iter().cloned().collect();
        assert_eq!(enums, vec!["ValidMealPlanStatus", "ValidUnit"]);
        Ok(())
    }

    #[test]
    fn test_override_without_default_is_config_error() {
        let overrides = EnumOverrides::empty().extend(
            [("Recipe.kind".to_string(), "RecipeKind".to_string())],
            [],
        );
        let builder = TypeScriptContextBuilder::new(
            TemplateOptions::default(),
            overrides,
            BTreeMap::new(),
        );
        let mut def = TypeDef::new("Recipe");
        def.insert_field(field("kind", "RecipeKind", false, false));

        let err = builder.build_model(&def).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
