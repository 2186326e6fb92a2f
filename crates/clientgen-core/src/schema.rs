//! Schema lowering: component schema → `TypeDef`.
//!
//! Lowering is single-pass and never dereferences a `$ref` beyond peeking at
//! whether the target is an enum, so self-referential schemas are safe.
//! The frontend profile additionally replaces `integer` with `number`,
//! collapses the numeric range family onto three canonical names, and applies
//! the enum override table.

// Internal imports (std, crate)
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::ir::{Field, TypeDef};
use crate::utils::strip_component_prefix;

// External imports (alphabetized)
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;

/// Component schemas that never become models
pub const SKIPPED_SCHEMAS: [&str; 1] = ["APIResponse"];

/// Canonical frontend range types
pub const NUMBER_RANGE: &str = "NumberRange";
pub const NUMBER_RANGE_WITH_OPTIONAL_MAX: &str = "NumberRangeWithOptionalMax";
pub const OPTIONAL_NUMBER_RANGE: &str = "OptionalNumberRange";

static RANGE_FAMILY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(Optional)?(Uint8|Uint16|Uint32|Uint64|Int8|Int16|Int32|Int64|Float32|Float64)Range(WithOptionalMax)?(UpdateRequestInput)?$",
    )
    .expect("range family pattern is valid")
});

/// Built-in `"Component.property" → type` overrides
const DEFAULT_ENUM_OVERRIDES: [(&str, &str); 15] = [
    ("MealPlan.status", "ValidMealPlanStatus"),
    ("MealPlan.electionMethod", "ValidMealPlanElectionMethod"),
    ("ValidIngredientState.attributeType", "ValidIngredientStateAttributeType"),
    ("RecipeStepProduct.type", "ValidRecipeStepProductType"),
    ("MealComponent.componentType", "MealComponentType"),
    ("MealPlanCreationRequestInput.status", "ValidMealPlanStatus"),
    ("MealPlanCreationRequestInput.electionMethod", "ValidMealPlanElectionMethod"),
    ("ValidIngredientStateCreationRequestInput.attributeType", "ValidIngredientStateAttributeType"),
    ("RecipeStepProductCreationRequestInput.type", "ValidRecipeStepProductType"),
    ("MealComponentCreationRequestInput.componentType", "MealComponentType"),
    ("MealPlanUpdateRequestInput.status", "ValidMealPlanStatus"),
    ("MealPlanUpdateRequestInput.electionMethod", "ValidMealPlanElectionMethod"),
    ("ValidIngredientStateUpdateRequestInput.attributeType", "ValidIngredientStateAttributeType"),
    ("RecipeStepProductUpdateRequestInput.type", "ValidRecipeStepProductType"),
    ("MealComponentUpdateRequestInput.componentType", "MealComponentType"),
];

/// Built-in default literals for overridden enum types
const DEFAULT_ENUM_DEFAULTS: [(&str, &str); 5] = [
    ("ValidMealPlanStatus", "'awaiting_votes'"),
    ("ValidMealPlanElectionMethod", "'schulze'"),
    ("ValidIngredientStateAttributeType", "'other'"),
    ("ValidRecipeStepProductType", "'ingredient'"),
    ("MealComponentType", "'unspecified'"),
];

/// Which target family the lowered types are for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoweringProfile {
    /// Types stay OpenAPI-flavored; `$ref`s to enum schemas fall back to their scalar type
    Backend,
    /// Integer replacement, range collapse and enum overrides applied
    Frontend,
}

/// The `"Component.property"` override table, with usage tracking
#[derive(Debug, Clone)]
pub struct EnumOverrides {
    entries: BTreeMap<String, String>,
    defaults: BTreeMap<String, String>,
    used: BTreeSet<String>,
}

impl Default for EnumOverrides {
    fn default() -> Self {
        Self {
            entries: DEFAULT_ENUM_OVERRIDES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            defaults: DEFAULT_ENUM_DEFAULTS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            used: BTreeSet::new(),
        }
    }
}

impl EnumOverrides {
    /// An empty table
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
            defaults: BTreeMap::new(),
            used: BTreeSet::new(),
        }
    }

    /// Merge extra entries and default literals on top of the current table
    pub fn extend(
        mut self,
        entries: impl IntoIterator<Item = (String, String)>,
        defaults: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.entries.extend(entries);
        self.defaults.extend(defaults);
        self
    }

    fn lookup(&mut self, component: &str, property: &str) -> Option<String> {
        let key = format!("{}.{}", component, property);
        let found = self.entries.get(&key).cloned();
        if found.is_some() {
            self.used.insert(key);
        }
        found
    }

    /// Whether `type_name` is the target of any override entry
    pub fn is_override_type(&self, type_name: &str) -> bool {
        self.entries.values().any(|v| v == type_name)
    }

    /// Default literal for an overridden enum type
    pub fn default_for(&self, type_name: &str) -> Option<&str> {
        self.defaults.get(type_name).map(String::as_str)
    }

    /// Entries never matched by any property so far
    pub fn unused(&self) -> Vec<&str> {
        self.entries
            .keys()
            .filter(|k| !self.used.contains(*k))
            .map(String::as_str)
            .collect()
    }
}

/// Result of lowering every component schema
#[derive(Debug, Default)]
pub struct LoweredSchemas {
    pub types: Vec<TypeDef>,
    pub skipped: Vec<String>,
    pub unused_overrides: Vec<String>,
}

/// Lowers component schemas for one target profile
#[derive(Debug)]
pub struct SchemaLowerer<'a> {
    profile: LoweringProfile,
    components: &'a BTreeMap<&'a str, &'a JsonValue>,
    overrides: EnumOverrides,
}

impl<'a> SchemaLowerer<'a> {
    pub fn new(
        profile: LoweringProfile,
        components: &'a BTreeMap<&'a str, &'a JsonValue>,
        overrides: EnumOverrides,
    ) -> Self {
        Self {
            profile,
            components,
            overrides,
        }
    }

    pub fn overrides(&self) -> &EnumOverrides {
        &self.overrides
    }

    /// Lower every component in name order and report unused override entries
    pub fn lower_all(mut self) -> Result<LoweredSchemas> {
        let mut lowered = LoweredSchemas::default();

        for (name, schema) in self.components.iter() {
            match self.lower(name, schema)? {
                Some(def) => lowered.types.push(def),
                None => lowered.skipped.push(name.to_string()),
            }
        }

        if self.profile == LoweringProfile::Frontend {
            lowered.unused_overrides = self
                .overrides
                .unused()
                .into_iter()
                .map(String::from)
                .collect();
            for entry in &lowered.unused_overrides {
                log::warn!("enum override {} matched no schema property", entry);
            }
        }

        Ok(lowered)
    }

    /// Lower one component; `None` when it is an enum or on the skip list
    pub fn lower(&mut self, name: &str, schema: &JsonValue) -> Result<Option<TypeDef>> {
        if schema.get("enum").is_some() || SKIPPED_SCHEMAS.contains(&name) {
            log::debug!("skipping schema {}", name);
            return Ok(None);
        }

        let mut def = TypeDef::new(name);
        let properties = schema.get("properties").and_then(JsonValue::as_object);

        for (property, prop_schema) in properties.into_iter().flatten() {
            let field = self.lower_property(name, property, prop_schema)?;
            def.insert_field(field);
        }

        Ok(Some(def))
    }

    fn lower_property(
        &mut self,
        component: &str,
        property: &str,
        schema: &JsonValue,
    ) -> Result<Field> {
        let mut field = Field {
            name: property.to_string(),
            type_name: String::new(),
            nullable: schema.get("nullable").and_then(JsonValue::as_bool).unwrap_or(false),
            array: false,
        };

        match schema.get("type") {
            Some(JsonValue::String(t)) if t == "array" => {
                field.array = true;
                if let Some(items) = schema.get("items") {
                    field.type_name = self.scalar_or_ref(items).unwrap_or_default();
                }
            }
            Some(JsonValue::String(t)) => {
                field.type_name = self.scalar(t, schema);
            }
            // 3.1 type lists, e.g. ["string", "null"]
            Some(JsonValue::Array(types)) => {
                for t in types.iter().filter_map(JsonValue::as_str) {
                    if t == "null" {
                        field.nullable = true;
                    } else if field.type_name.is_empty() {
                        field.type_name = self.scalar(t, schema);
                    }
                }
            }
            _ => {
                if let Some(alternatives) = schema.get("oneOf").and_then(JsonValue::as_array) {
                    for alternative in alternatives {
                        match alternative.get("type").and_then(JsonValue::as_str) {
                            Some("null") => field.nullable = true,
                            Some(t) if field.type_name.is_empty() => {
                                field.type_name = self.scalar(t, alternative);
                            }
                            Some(_) => {}
                            None => {
                                if field.type_name.is_empty() {
                                    if let Some(r) = self.reference(alternative) {
                                        field.type_name = r;
                                    }
                                }
                            }
                        }
                    }
                } else if let Some(r) = self.reference(schema) {
                    field.type_name = r;
                } else if let Some(r) = schema
                    .get("allOf")
                    .and_then(JsonValue::as_array)
                    .and_then(|branches| branches.iter().find_map(|b| self.reference(b)))
                {
                    field.type_name = r;
                }
            }
        }

        if self.profile == LoweringProfile::Frontend {
            field.type_name = collapse_range(&replace_type(&field.type_name)).to_string();
            if let Some(overridden) = self.overrides.lookup(component, property) {
                field.type_name = overridden;
            }
        }

        if field.type_name.is_empty() {
            return Err(Error::bad_type(component, property));
        }

        Ok(field)
    }

    fn scalar_or_ref(&self, schema: &JsonValue) -> Option<String> {
        schema
            .get("type")
            .and_then(JsonValue::as_str)
            .map(|t| self.scalar(t, schema))
            .or_else(|| self.reference(schema))
    }

    /// Backend keeps the declared width from `format` where one is given
    fn scalar(&self, type_name: &str, schema: &JsonValue) -> String {
        if self.profile == LoweringProfile::Frontend {
            return type_name.to_string();
        }
        let format = schema.get("format").and_then(JsonValue::as_str);
        match (type_name, format) {
            ("integer", Some(f @ ("int8" | "int16" | "int32" | "int64"))) => f.to_string(),
            ("integer", Some(f @ ("uint8" | "uint16" | "uint32" | "uint64"))) => f.to_string(),
            ("number", Some("float")) => "float32".to_string(),
            _ => type_name.to_string(),
        }
    }

    fn reference(&self, schema: &JsonValue) -> Option<String> {
        let name = strip_component_prefix(schema.get("$ref")?.as_str()?);
        if self.profile == LoweringProfile::Backend {
            // enums are generated elsewhere; the backend sees their scalar type
            if let Some(target) = self.components.get(name) {
                if target.get("enum").is_some() {
                    return Some(
                        target
                            .get("type")
                            .and_then(JsonValue::as_str)
                            .unwrap_or("string")
                            .to_string(),
                    );
                }
            }
        }
        Some(name.to_string())
    }
}

/// Fixed frontend type replacements
pub fn replace_type(type_name: &str) -> &str {
    match type_name {
        "integer" => "number",
        other => other,
    }
}

/// Collapse the numeric range family onto the three canonical names
pub fn collapse_range(type_name: &str) -> &str {
    match RANGE_FAMILY_RE.captures(type_name) {
        Some(caps) if caps.get(1).is_some() => OPTIONAL_NUMBER_RANGE,
        Some(caps) if caps.get(3).is_some() => NUMBER_RANGE_WITH_OPTIONAL_MAX,
        Some(_) => NUMBER_RANGE,
        None => type_name,
    }
}

/// Whether `type_name` is one of the canonical range types
pub fn is_range_type(type_name: &str) -> bool {
    matches!(
        type_name,
        NUMBER_RANGE | NUMBER_RANGE_WITH_OPTIONAL_MAX | OPTIONAL_NUMBER_RANGE
    )
}

/// First value of every enum component as a TypeScript literal
pub fn enum_first_values(components: &BTreeMap<&str, &JsonValue>) -> BTreeMap<String, String> {
    components
        .iter()
        .filter_map(|(name, schema)| {
            let literal = match schema.get("enum")?.as_array()?.first()? {
                JsonValue::String(s) => format!("'{}'", s.replace('\'', "\\'")),
                other => other.to_string(),
            };
            Some((name.to_string(), literal))
        })
        .collect()
}
