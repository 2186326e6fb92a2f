//! Name and path transformation utilities for code generation

// External imports (alphabetized)
use once_cell::sync::Lazy;
use regex::Regex;

/// Prefix carried by every schema `$ref` in the component section
pub const COMPONENT_SCHEMA_PREFIX: &str = "#/components/schemas/";

/// Name of the free-text search parameter
pub const SEARCH_QUERY_PARAM: &str = "q";

static PATH_PARAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[A-Za-z0-9]+\}").expect("path placeholder pattern is valid"));

const NATIVE_TYPES: [&str; 4] = ["string", "bool", "int", "uint64"];

/// OpenAPI scalar names plus the widths the backend keeps from `format`
const SCALAR_TYPES: [&str; 15] = [
    "string", "integer", "number", "boolean", "object", "int8", "int16", "int32", "int64",
    "uint8", "uint16", "uint32", "uint64", "float32", "float64",
];

/// Upper-case the first code point of `s`
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Lower-case the first code point of `s`
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

/// Lower-case the whole string then upper-case its first code point (`GET` → `Get`)
pub fn title(s: &str) -> String {
    upper_first(&s.to_lowercase())
}

/// Rewrite `{name}` placeholders into positional `%s` markers
pub fn backend_path_template(path: &str) -> String {
    PATH_PARAM_RE.replace_all(path, "%s").into_owned()
}

/// Rewrite `{name}` placeholders into `${name}` interpolation markers
pub fn frontend_path_template(path: &str) -> String {
    PATH_PARAM_RE
        .replace_all(path, |caps: &regex::Captures<'_>| format!("${}", &caps[0]))
        .into_owned()
}

/// Names of the `{name}` placeholders in `path`, in order
pub fn path_placeholders(path: &str) -> Vec<String> {
    PATH_PARAM_RE
        .find_iter(path)
        .map(|m| m.as_str().trim_matches(|c| c == '{' || c == '}').to_string())
        .collect()
}

/// Derive the logging/tracing key stem for a parameter name.
///
/// ```
/// use clientgen_core::utils::observability_key;
///
/// assert_eq!(observability_key("recipeID"), "RecipeID");
/// assert_eq!(observability_key("oauth2ClientID"), "OAuth2ClientID");
/// assert_eq!(observability_key("q"), "SearchQuery");
/// ```
pub fn observability_key(name: &str) -> String {
    let key = upper_first(name).replace("Oauth", "OAuth");
    if key == "Q" {
        "SearchQuery".to_string()
    } else {
        key
    }
}

/// Key used in "invalid ID" errors: the parameter name with `ID` removed
pub fn invalid_id_key(name: &str) -> String {
    name.replace("ID", "")
}

/// Stem to which a trailing `s` is appended at the call site
pub fn pluralize(name: &str) -> &str {
    match name {
        "AuditLogEntry" => "AuditLogEntrie",
        other => other,
    }
}

/// Whether `type_name` is a target-native scalar rather than a generated DTO
pub fn is_native(type_name: &str) -> bool {
    NATIVE_TYPES.contains(&type_name)
}

/// Whether a lowered field type is a scalar rather than a reference to another model
pub fn is_scalar_type(type_name: &str) -> bool {
    SCALAR_TYPES.contains(&type_name)
}

/// Zero literal returned in place of a native value on failure
pub fn native_default(type_name: &str) -> Option<&'static str> {
    match type_name {
        "string" => Some(r#""""#),
        _ => None,
    }
}

/// Test assertion used to check a native return is its zero value
pub fn negative_assert_func(type_name: &str) -> Option<&'static str> {
    match type_name {
        "string" => Some("Empty"),
        _ => None,
    }
}

/// Strip the component-schema `$ref` prefix, if present
pub fn strip_component_prefix(reference: &str) -> &str {
    reference
        .strip_prefix(COMPONENT_SCHEMA_PREFIX)
        .unwrap_or(reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_conversion() {
        assert_eq!(upper_first("recipe"), "Recipe");
        assert_eq!(lower_first("GetRecipe"), "getRecipe");
        assert_eq!(upper_first(""), "");
        assert_eq!(lower_first(""), "");
        assert_eq!(upper_first("éclair"), "Éclair");
        assert_eq!(title("PATCH"), "Patch");
    }

    #[test]
    fn test_path_templates() {
        let path = "/api/v1/recipes/{recipeID}/steps/{recipeStepID}";
        assert_eq!(
            backend_path_template(path),
            "/api/v1/recipes/%s/steps/%s"
        );
        assert_eq!(
            frontend_path_template(path),
            "/api/v1/recipes/${recipeID}/steps/${recipeStepID}"
        );
        assert_eq!(path_placeholders(path), vec!["recipeID", "recipeStepID"]);
        assert_eq!(backend_path_template("/api/v1/recipes"), "/api/v1/recipes");
    }

    #[test]
    fn test_keys() {
        assert_eq!(observability_key("householdID"), "HouseholdID");
        assert_eq!(observability_key("oauth2ClientID"), "OAuth2ClientID");
        assert_eq!(observability_key("q"), "SearchQuery");
        assert_eq!(invalid_id_key("recipeStepID"), "recipeStep");
    }

    #[test]
    fn test_native_tables() {
        assert!(is_native("string"));
        assert!(is_native("uint64"));
        assert!(!is_native("Recipe"));
        assert_eq!(native_default("string"), Some("\"\""));
        assert_eq!(native_default("bool"), None);
        assert_eq!(negative_assert_func("string"), Some("Empty"));
        assert_eq!(pluralize("AuditLogEntry"), "AuditLogEntrie");
        assert_eq!(pluralize("Recipe"), "Recipe");
        assert!(is_scalar_type("uint16"));
        assert!(!is_scalar_type("NumberRange"));
    }

    #[test]
    fn test_strip_component_prefix() {
        assert_eq!(strip_component_prefix("#/components/schemas/Recipe"), "Recipe");
        assert_eq!(strip_component_prefix("string"), "string");
    }
}
