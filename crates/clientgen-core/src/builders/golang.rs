//! Go-specific context builders.
//!
//! Every Go expression a template prints (signatures, zero values, URL and
//! query expressions, test setup statements) is computed here, so the
//! templates only lay the pieces out.

// Internal imports (std, crate)
use std::collections::BTreeMap;

use super::{BuiltContext, EndpointContextBuilder, ModelContextBuilder};
use crate::error::{Error, Result};
use crate::ir::{Field, HttpMethod, OperationIr, Param, TypeDef};
use crate::render::{ImportSet, TemplateSelection};
use crate::templates::TemplateOptions;
use crate::utils::{
    invalid_id_key, is_native, native_default, negative_assert_func, pluralize, upper_first,
    SEARCH_QUERY_PARAM,
};

// External imports (alphabetized)
use serde::Serialize;

/// Query string the default filter serializes to
const DEFAULT_FILTER_QUERY: [(&str, &str); 3] = [("limit", "50"), ("page", "1"), ("sortBy", "asc")];

/// Secret fields scrubbed from fake DTOs before comparing, per type
const SCRUBBED_FIELDS: [(&str, &[&str]); 3] = [
    ("User", &["HashedPassword", "TwoFactorSecret", "TwoFactorSecretVerifiedAt"]),
    ("Household", &["WebhookEncryptionKey"]),
    ("HouseholdInvitation", &["DestinationHousehold.WebhookEncryptionKey"]),
];

pub const OBSERVABILITY_PACKAGE: &str = "internal/lib/observability";
pub const TRACING_PACKAGE: &str = "internal/lib/observability/tracing";
pub const KEYS_PACKAGE: &str = "internal/lib/observability/keys";
pub const TEXT_SEARCH_PACKAGE: &str = "internal/lib/search/text";
pub const FAKE_PACKAGE: &str = "internal/lib/fake";

const TESTIFY_ASSERT: &str = "github.com/stretchr/testify/assert";
const TESTIFY_REQUIRE: &str = "github.com/stretchr/testify/require";

/// Go type of an OpenAPI scalar (or a width kept from `format`); `None` for DTOs
pub fn go_scalar(type_name: &str) -> Option<&str> {
    match type_name {
        "string" => Some("string"),
        "integer" => Some("int64"),
        "number" => Some("float64"),
        "boolean" => Some("bool"),
        "object" => Some("map[string]any"),
        "int8" | "int16" | "int32" | "int64" | "uint8" | "uint16" | "uint32" | "uint64"
        | "float32" | "float64" | "bool" | "int" => Some(type_name),
        _ => None,
    }
}

/// Go export name of a JSON property (`recipeId` → `RecipeID`)
pub fn go_field_name(property: &str) -> String {
    let name = upper_first(property);
    match name.strip_suffix("Id") {
        Some(stem) => format!("{}ID", stem),
        None => name,
    }
}

/// Go type of one struct field
pub fn go_field_type(field: &Field) -> String {
    match (go_scalar(&field.type_name), field.array) {
        (Some(scalar), true) => format!("[]{}", scalar),
        (None, true) => format!("[]*{}", field.type_name),
        (Some(scalar), false) if field.nullable && !scalar.starts_with("map[") => {
            format!("*{}", scalar)
        }
        (Some(scalar), false) => scalar.to_string(),
        (None, false) => format!("*{}", field.type_name),
    }
}

/// A path or query parameter as it appears in the function signature
#[derive(Debug, Clone, Serialize)]
pub struct GoParam {
    pub name: String,
    pub go_type: String,
    /// Only string IDs can be checked for emptiness
    pub guarded: bool,
}

impl GoParam {
    fn from_param(param: &Param) -> Self {
        let go_type = go_scalar(&param.type_name).unwrap_or("string").to_string();
        Self {
            name: param.name.clone(),
            guarded: go_type == "string" && !param.is_search(),
            go_type,
        }
    }

    /// The parameter as a string expression
    fn as_string_expr(&self) -> String {
        if self.go_type == "string" {
            self.name.clone()
        } else {
            format!("fmt.Sprint({})", self.name)
        }
    }
}

/// One `values.Set(key, value)` call
#[derive(Debug, Clone, Serialize)]
pub struct GoQueryValue {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoInput {
    pub name: String,
    pub type_name: String,
}

/// Context for one operation function
#[derive(Debug, Clone, Serialize)]
pub struct GoEndpointContext {
    pub name: String,
    pub doc_lines: Vec<String>,
    /// Serialized upper-case; templates turn it into the `http.Method*` constant
    pub method: HttpMethod,
    /// Signature parameters: path parameters in path order, then query parameters
    pub params: Vec<GoParam>,
    /// Parameters attached to the logger and span
    pub observed: Vec<GoParam>,
    pub path_expr: String,
    pub query_filtered: bool,
    pub builds_query: bool,
    pub query_values: Vec<GoQueryValue>,
    pub input: Option<GoInput>,
    pub returns_value: bool,
    pub signature_return: String,
    /// Zero values preceding `err` in early returns (`nil, `)
    pub err_prefix: String,
    pub api_response_type: String,
    /// Whether the payload arrives wrapped in the response container
    pub has_container: bool,
    /// Expression holding the decoded payload
    pub data_expr: String,
    pub list_element: String,
    pub error_condition: String,
}

/// A test case calling the operation with modified arguments
#[derive(Debug, Clone, Serialize)]
pub struct GoTestCase {
    pub label: String,
    /// Setup statements minus the one for the replaced argument
    pub setup: Vec<String>,
    pub call_args: String,
}

/// Context for one `TestClient_<Name>` function
#[derive(Debug, Clone, Serialize)]
pub struct GoTestContext {
    pub name: String,
    pub expected_path_format: String,
    pub method: HttpMethod,
    pub query_expr: String,
    pub body_should_be_empty: bool,
    pub setup: Vec<String>,
    pub data_setup: Vec<String>,
    pub spec_path_args: String,
    pub call_args: String,
    pub invalid_id_cases: Vec<GoTestCase>,
    pub nil_input_case: Option<GoTestCase>,
    pub returns_value: bool,
    pub call_prefix: String,
    pub negative_assert: String,
}

/// Context for a `type.<Name>.gen.go` struct
#[derive(Debug, Clone, Serialize)]
pub struct GoTypeContext {
    pub name: String,
    /// Aligned `Name Type Tag` lines
    pub fields: Vec<String>,
}

/// Shape of an operation's decoded payload in Go
struct GoReturn {
    returns_value: bool,
    signature_return: String,
    err_prefix: String,
    api_response_type: String,
    has_container: bool,
    list_element: String,
    /// Go type of the decoded leaf; empty when the response carries none
    leaf: String,
    native: bool,
    negative_assert: String,
}

#[derive(Debug, Clone)]
pub struct GoContextBuilder {
    options: TemplateOptions,
    types: BTreeMap<String, TypeDef>,
}

impl GoContextBuilder {
    pub fn new(options: TemplateOptions, types: &[TypeDef]) -> Self {
        Self {
            options,
            types: types
                .iter()
                .map(|def| (def.name.clone(), def.clone()))
                .collect(),
        }
    }

    pub fn options(&self) -> &TemplateOptions {
        &self.options
    }

    /// Context shared by every static file
    pub fn static_context(&self) -> serde_json::Value {
        serde_json::json!({
            "package_name": self.options.go_package,
            "module_path": self.options.go_module,
        })
    }

    fn go_return(&self, op: &OperationIr) -> Result<GoReturn> {
        let selection = TemplateSelection::for_operation(op);
        let leaf_name = &op.response.type_name;
        let native = go_scalar(leaf_name).is_some();
        let leaf = go_scalar(leaf_name)
            .map(str::to_string)
            .unwrap_or_else(|| leaf_name.clone());

        let element = if native { leaf.clone() } else { format!("*{}", leaf) };
        let api_data = if leaf.is_empty() {
            "any".to_string()
        } else if op.returns_list {
            format!("[]*{}", leaf)
        } else {
            element.clone()
        };

        let returns_value = selection.returns_value() && !leaf.is_empty();
        let (signature_return, err_prefix, negative_assert) = if !returns_value {
            ("error".to_string(), String::new(), String::new())
        } else if selection == TemplateSelection::ListReader {
            (
                format!("(*QueryFilteredResult[{}], error)", leaf),
                "nil, ".to_string(),
                "Nil".to_string(),
            )
        } else if op.returns_list {
            (
                format!("([]*{}, error)", leaf),
                "nil, ".to_string(),
                "Nil".to_string(),
            )
        } else if native && is_native(&leaf) {
            let zero = native_default(&leaf).ok_or_else(|| Error::UnsupportedNative {
                what: "zero value",
                type_name: leaf.clone(),
            })?;
            let assert = negative_assert_func(&leaf).ok_or_else(|| Error::UnsupportedNative {
                what: "negative assertion",
                type_name: leaf.clone(),
            })?;
            (
                format!("({}, error)", leaf),
                format!("{}, ", zero),
                assert.to_string(),
            )
        } else if native {
            return Err(Error::UnsupportedNative {
                what: "zero value",
                type_name: leaf,
            });
        } else {
            (
                format!("({}, error)", element),
                "nil, ".to_string(),
                "Nil".to_string(),
            )
        };

        let has_container = op.response.has_container();
        let api_response_type = if has_container {
            format!("{}[{}]", op.response.generic_container, api_data)
        } else {
            api_data
        };

        Ok(GoReturn {
            returns_value,
            signature_return,
            err_prefix,
            api_response_type,
            has_container,
            list_element: leaf.clone(),
            leaf,
            native,
            negative_assert,
        })
    }

    /// Fake value statement for a parameter named `name` of Go type `go_type`
    fn fake_value(name: &str, go_type: &str) -> String {
        if go_type == "string" {
            format!("{} := fake.BuildFakeID()", name)
        } else {
            format!("{} := fake.BuildFakeForTest[{}](t)", name, go_type)
        }
    }

    /// Expected request query: the default filter (list readers) plus the query parameters, sorted by key
    fn expected_query(op: &OperationIr, params: &[GoParam]) -> (String, bool) {
        let mut pairs: BTreeMap<String, Option<String>> = BTreeMap::new();
        if op.query_filtered {
            for (key, value) in DEFAULT_FILTER_QUERY {
                pairs.insert(key.to_string(), Some(value.to_string()));
            }
        }
        for param in params {
            pairs.insert(param.name.clone(), None);
        }

        if pairs.is_empty() {
            return (r#""""#.to_string(), false);
        }

        let mut args = Vec::new();
        let query = pairs
            .iter()
            .map(|(key, value)| match value {
                Some(value) => format!("{}={}", key, value),
                None => {
                    args.push(key.clone());
                    format!("{}=%v", key)
                }
            })
            .collect::<Vec<_>>()
            .join("&");

        if args.is_empty() {
            (format!("\"{}\"", query), false)
        } else {
            (
                format!("fmt.Sprintf(\"{}\", {})", query, args.join(", ")),
                true,
            )
        }
    }

    /// Statements that scrub secrets from `target`, when its type carries them
    fn scrub_lines(&self, type_name: &str, target: &str) -> Vec<String> {
        let Some(def) = self.types.get(type_name) else {
            return Vec::new();
        };
        let Some((_, fields)) = SCRUBBED_FIELDS.iter().find(|(name, _)| *name == type_name) else {
            return Vec::new();
        };

        fields
            .iter()
            .filter_map(|path| {
                let head = path.split('.').next().unwrap_or_default();
                let field = def.fields.values().find(|f| go_field_name(&f.name) == head)?;
                let zero = if path.contains('.') {
                    r#""""#
                } else if field.nullable || go_scalar(&field.type_name).is_none() {
                    "nil"
                } else {
                    r#""""#
                };
                Some(format!("{}.{} = {}", target, path, zero))
            })
            .collect()
    }

    fn data_setup(&self, op: &OperationIr, ret: &GoReturn) -> Vec<String> {
        let selection = TemplateSelection::for_operation(op);
        let leaf = &ret.leaf;
        let mut lines = Vec::new();

        // the test server answers with `expected`, enveloped only when the response is
        let expected = |data: &str| {
            if ret.has_container {
                format!(
                    "expected := &{}{{\n\t\t\tData: {},\n\t\t}}",
                    ret.api_response_type, data
                )
            } else {
                format!("expected := {}", data)
            }
        };

        if leaf.is_empty() {
            lines.push(if ret.has_container {
                format!("expected := &{}{{}}", ret.api_response_type)
            } else {
                "expected := map[string]any{}".to_string()
            });
            return lines;
        }

        let fake_leaf = if ret.native {
            "fake.BuildFakeID()".to_string()
        } else {
            format!("fake.BuildFakeForTest[*{}](t)", leaf)
        };

        if !ret.returns_value {
            let data = if op.returns_list {
                format!("[]*{}{{{}}}", leaf, fake_leaf)
            } else {
                fake_leaf
            };
            lines.push(expected(&data));
            return lines;
        }

        if op.returns_list {
            let list = format!("example{}s", pluralize(&upper_first(leaf)));
            lines.push(format!("{} := []*{}{{{}}}", list, leaf, fake_leaf));
            let scrubs = self.scrub_lines(leaf, "item");
            if !scrubs.is_empty() {
                let mut block = format!("for _, item := range {} {{", list);
                for scrub in scrubs {
                    block.push_str(&format!("\n\t\t\t{}", scrub));
                }
                block.push_str("\n\t\t}");
                lines.push(block);
            }

            if selection != TemplateSelection::ListReader {
                lines.push(format!("data := {}", list));
                lines.push(expected("data"));
            } else if ret.has_container {
                lines.push(format!(
                    "data := &QueryFilteredResult[{}]{{\n\t\t\tData:       {},\n\t\t\tPagination: Pagination{{Page: 1, Limit: 50}},\n\t\t}}",
                    leaf, list
                ));
                lines.push(format!(
                    "expected := &{}{{\n\t\t\tData:       data.Data,\n\t\t\tPagination: &data.Pagination,\n\t\t}}",
                    ret.api_response_type
                ));
            } else {
                // a bare list carries no pagination
                lines.push(format!("data := &QueryFilteredResult[{}]{{Data: {}}}", leaf, list));
                lines.push("expected := data.Data".to_string());
            }
            return lines;
        }

        lines.push(format!("data := {}", fake_leaf));
        lines.extend(self.scrub_lines(leaf, "data"));
        lines.push(expected("data"));
        lines
    }
}

fn doc_lines(op: &OperationIr) -> Vec<String> {
    let description = op.description.trim();
    if description.is_empty() {
        return Vec::new();
    }
    let mut lines: Vec<String> = description.lines().map(|l| l.trim_end().to_string()).collect();
    if let Some(first) = lines.first_mut() {
        *first = format!("{} {}", op.backend_name(), first);
    }
    lines
}

impl EndpointContextBuilder for GoContextBuilder {
    fn build(&self, op: &OperationIr) -> Result<BuiltContext> {
        let ret = self.go_return(op)?;
        let path_params: Vec<GoParam> = op.path_params().map(GoParam::from_param).collect();
        let query_params: Vec<GoParam> = op.query_params().map(GoParam::from_param).collect();

        let mut imports = ImportSet::new();
        imports
            .add_module("context")
            .add_module("net/http")
            .add_module(self.options.go_import(OBSERVABILITY_PACKAGE));

        let path_template = op.backend_path_template();
        let path_expr = if path_params.is_empty() {
            format!("\"{}\"", path_template)
        } else {
            imports.add_module("fmt");
            format!(
                "fmt.Sprintf(\"{}\", {})",
                path_template,
                path_params
                    .iter()
                    .map(GoParam::as_string_expr)
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        };

        let query_values: Vec<GoQueryValue> = query_params
            .iter()
            .map(|p| {
                let key = if p.name == SEARCH_QUERY_PARAM {
                    imports.add_default(self.options.go_import(TEXT_SEARCH_PACKAGE), "textsearch");
                    "textsearch.QueryKeySearch".to_string()
                } else {
                    format!("\"{}\"", p.name)
                };
                if p.go_type != "string" {
                    imports.add_module("fmt");
                }
                GoQueryValue {
                    key,
                    value: p.as_string_expr(),
                }
            })
            .collect();

        let builds_query = op.query_filtered || !query_values.is_empty();
        if builds_query && !op.query_filtered {
            imports.add_module("net/url");
        }

        let observed: Vec<GoParam> = path_params
            .iter()
            .chain(query_params.iter().filter(|p| p.name == SEARCH_QUERY_PARAM))
            .cloned()
            .collect();
        if !observed.is_empty() {
            imports
                .add_module(self.options.go_import(KEYS_PACKAGE))
                .add_module(self.options.go_import(TRACING_PACKAGE));
        }

        let input = op.has_input().then(|| GoInput {
            name: "input".to_string(),
            type_name: op.input.type_name.clone(),
        });

        let error_condition = if op.tolerates_totp_required() {
            "err != nil && apiResponse.Error.Message != totpRequiredMessage".to_string()
        } else {
            "err != nil".to_string()
        };

        let context = GoEndpointContext {
            name: op.backend_name().to_string(),
            doc_lines: doc_lines(op),
            method: op.method,
            params: path_params.iter().chain(query_params.iter()).cloned().collect(),
            observed,
            path_expr,
            query_filtered: op.query_filtered,
            builds_query,
            query_values,
            input,
            returns_value: ret.returns_value,
            signature_return: ret.signature_return,
            err_prefix: ret.err_prefix,
            api_response_type: ret.api_response_type,
            has_container: ret.has_container,
            data_expr: if ret.has_container {
                "apiResponse.Data".to_string()
            } else {
                "apiResponse".to_string()
            },
            list_element: ret.list_element,
            error_condition,
        };

        Ok(BuiltContext::new(serde_json::to_value(context)?, imports))
    }

    fn build_test(&self, op: &OperationIr) -> Result<BuiltContext> {
        let mut imports = ImportSet::new();
        imports
            .add_module("testing")
            .add_module(TESTIFY_ASSERT);

        if op.method == HttpMethod::Delete {
            let context = serde_json::json!({ "name": op.backend_name() });
            return Ok(BuiltContext::new(context, imports));
        }

        let ret = self.go_return(op)?;
        let path_params: Vec<GoParam> = op.path_params().map(GoParam::from_param).collect();
        let query_params: Vec<GoParam> = op.query_params().map(GoParam::from_param).collect();

        imports.add_module("context").add_module("net/http");
        if ret.returns_value {
            imports.add_module(TESTIFY_REQUIRE);
        }

        let mut setup: Vec<String> = path_params
            .iter()
            .chain(query_params.iter())
            .map(|p| Self::fake_value(&p.name, &p.go_type))
            .collect();
        if op.has_input() {
            setup.push(format!(
                "exampleInput := fake.BuildFakeForTest[*{}](t)",
                op.input.type_name
            ));
        }

        let data_setup = self.data_setup(op, &ret);
        if !setup.is_empty() || data_setup.iter().any(|line| line.contains("fake.")) {
            imports.add_module(self.options.go_import(FAKE_PACKAGE));
        }

        let (query_expr, uses_fmt) = Self::expected_query(op, &query_params);
        if uses_fmt {
            imports.add_module("fmt");
        }

        // ctx, path params, query params, filter, input
        let mut args: Vec<String> = vec!["ctx".to_string()];
        args.extend(path_params.iter().map(|p| p.name.clone()));
        args.extend(query_params.iter().map(|p| p.name.clone()));
        if op.query_filtered {
            args.push("nil".to_string());
        }
        let input_index = op.has_input().then(|| {
            args.push("exampleInput".to_string());
            args.len() - 1
        });

        // the replaced variable must not be declared, or Go rejects it as unused
        let replace_arg = |index: usize, replacement: &str, label: String| {
            let mut case_args = args.clone();
            let declaration = format!("{} :=", case_args[index]);
            case_args[index] = replacement.to_string();
            GoTestCase {
                label,
                setup: setup
                    .iter()
                    .filter(|line| !line.starts_with(&declaration))
                    .cloned()
                    .collect(),
                call_args: case_args.join(", "),
            }
        };

        let invalid_id_cases = path_params
            .iter()
            .enumerate()
            .filter(|(_, p)| p.guarded)
            .map(|(i, p)| {
                let label = format!("with invalid {} ID", invalid_id_key(&p.name));
                replace_arg(i + 1, r#""""#, label)
            })
            .collect();

        let nil_input_case =
            input_index.map(|i| replace_arg(i, "nil", "with nil input".to_string()));

        let context = GoTestContext {
            name: op.backend_name().to_string(),
            expected_path_format: format!("\"{}\"", op.backend_path_template()),
            method: op.method,
            query_expr,
            body_should_be_empty: !op.has_input(),
            setup,
            data_setup,
            spec_path_args: path_params
                .iter()
                .map(|p| format!(", {}", p.name))
                .collect(),
            call_args: args.join(", "),
            invalid_id_cases,
            nil_input_case,
            returns_value: ret.returns_value,
            call_prefix: if ret.returns_value {
                "actual, err := ".to_string()
            } else {
                "err := ".to_string()
            },
            negative_assert: ret.negative_assert,
        };

        Ok(BuiltContext::new(serde_json::to_value(context)?, imports))
    }
}

impl ModelContextBuilder for GoContextBuilder {
    fn build_model(&self, def: &TypeDef) -> Result<BuiltContext> {
        let rows: Vec<(String, String, String)> = def
            .fields
            .values()
            .map(|field| {
                let tag = if field.nullable {
                    format!("`json:\"{},omitempty\"`", field.name)
                } else {
                    format!("`json:\"{}\"`", field.name)
                };
                (go_field_name(&field.name), go_field_type(field), tag)
            })
            .collect();

        let name_width = rows.iter().map(|(n, _, _)| n.len()).max().unwrap_or(0);
        let type_width = rows.iter().map(|(_, t, _)| t.len()).max().unwrap_or(0);
        let fields = rows
            .into_iter()
            .map(|(name, go_type, tag)| {
                format!(
                    "{:name_width$} {:type_width$} {}",
                    name,
                    go_type,
                    tag,
                    name_width = name_width,
                    type_width = type_width
                )
            })
            .collect();

        let context = GoTypeContext {
            name: def.name.clone(),
            fields,
        };
        Ok(BuiltContext::new(
            serde_json::to_value(context)?,
            ImportSet::new(),
        ))
    }
}
