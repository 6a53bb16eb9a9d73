//! JSON Schema wrapper used for tool input and output contracts.
//!
//! Schemas are usually generated from the typed argument structs with
//! `schemars` and compiled once with `jsonschema`. [`Schema::parse`] fills
//! declared defaults before validating, so the value it returns is the
//! coerced one.

use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde_json::{Map, Value};
use std::fmt;

use crate::types::{Error, Result};

/// Every violation found in one value, in schema traversal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub errors: Vec<String>,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.errors.join("; "))
    }
}

impl std::error::Error for SchemaViolation {}

/// A compiled JSON Schema plus its source document.
pub struct Schema {
    document: Value,
    validator: jsonschema::Validator,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

impl Schema {
    /// Compile a schema document.
    pub fn compile(document: Value) -> Result<Self> {
        let validator = jsonschema::validator_for(&document)
            .map_err(|e| Error::config(format!("invalid schema: {}", e)))?;
        Ok(Self {
            document,
            validator,
        })
    }

    /// Generate and compile the schema of `T`.
    ///
    /// `Option<T>` fields are emitted as plain `T` rather than
    /// `anyOf: [T, null]`, so a bad nested value reports the offending
    /// field instead of a bare `anyOf` mismatch. Explicit nulls are still
    /// accepted: [`Schema::parse`] treats them as absent.
    pub fn for_type<T: JsonSchema>() -> Result<Self> {
        let mut settings = SchemaSettings::draft07();
        settings.option_add_null_type = false;
        let root = settings.into_generator().into_root_schema_for::<T>();
        Self::compile(serde_json::to_value(root)?)
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        self.validator.is_valid(value)
    }

    /// Fill defaults, then validate. Returns the coerced value.
    pub fn parse(&self, value: &Value) -> std::result::Result<Value, SchemaViolation> {
        let mut coerced = value.clone();
        fill_defaults(&self.document, &self.document, &mut coerced, 0);

        let errors: Vec<String> = self
            .validator
            .iter_errors(&coerced)
            .map(|err| {
                let path = err.instance_path.to_string();
                if path.is_empty() {
                    err.to_string()
                } else {
                    format!("{}: {}", path, err)
                }
            })
            .collect();

        if errors.is_empty() {
            Ok(coerced)
        } else {
            Err(SchemaViolation { errors })
        }
    }
}

/// Nesting bound for default filling through `$ref` cycles.
const MAX_DEFAULT_DEPTH: usize = 16;

/// Insert `default` values of absent object properties, recursively.
///
/// An explicit `null` on an optional property whose schema does not admit
/// null is dropped first, so it reads as absent. Only local
/// `#/definitions/..` and `#/$defs/..` references are followed. Null
/// defaults are skipped.
fn fill_defaults(root: &Value, schema: &Value, value: &mut Value, depth: usize) {
    if depth > MAX_DEFAULT_DEPTH {
        return;
    }
    let schema = resolve_ref(root, schema);

    // `Option<T>` fields come out of schemars as `allOf: [{$ref}]` wrappers.
    if let Some(all_of) = schema.get("allOf").and_then(Value::as_array) {
        for part in all_of {
            fill_defaults(root, part, value, depth + 1);
        }
    }

    let (Some(properties), Some(object)) = (
        schema.get("properties").and_then(Value::as_object),
        value.as_object_mut(),
    ) else {
        return;
    };

    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    for (name, property_schema) in properties {
        let property_schema = resolve_ref(root, property_schema);
        if object.get(name).is_some_and(Value::is_null)
            && !required.contains(&name.as_str())
            && !admits_null(root, property_schema, depth + 1)
        {
            object.remove(name);
        }
        if !object.contains_key(name) {
            if let Some(default) = property_schema.get("default").filter(|d| !d.is_null()) {
                object.insert(name.clone(), default.clone());
            }
        }
        if let Some(child) = object.get_mut(name) {
            fill_defaults(root, property_schema, child, depth + 1);
        }
    }
}

/// Whether `schema` accepts a JSON `null`. Unconstrained schemas do.
fn admits_null(root: &Value, schema: &Value, depth: usize) -> bool {
    if depth > MAX_DEFAULT_DEPTH {
        return true;
    }
    let schema = resolve_ref(root, schema);
    if let Some(parts) = schema.get("allOf").and_then(Value::as_array) {
        return parts.iter().all(|part| admits_null(root, part, depth + 1));
    }
    for key in ["anyOf", "oneOf"] {
        if let Some(parts) = schema.get(key).and_then(Value::as_array) {
            return parts.iter().any(|part| admits_null(root, part, depth + 1));
        }
    }
    match schema.get("type") {
        Some(Value::String(kind)) => kind == "null",
        Some(Value::Array(kinds)) => kinds.iter().any(|kind| kind == "null"),
        _ => true,
    }
}

fn resolve_ref<'a>(root: &'a Value, schema: &'a Value) -> &'a Value {
    let Some(reference) = schema.get("$ref").and_then(Value::as_str) else {
        return schema;
    };
    let target = reference
        .strip_prefix("#/definitions/")
        .and_then(|name| root.get("definitions").and_then(|d| d.get(name)))
        .or_else(|| {
            reference
                .strip_prefix("#/$defs/")
                .and_then(|name| root.get("$defs").and_then(|d| d.get(name)))
        });
    target.unwrap_or(schema)
}

/// Empty object, the input of argument-less tools.
pub fn empty_object() -> Value {
    Value::Object(Map::new())
}
