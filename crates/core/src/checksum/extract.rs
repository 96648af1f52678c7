//! Numeric key-field extraction from report payloads.
//!
//! Two extractors share one path syntax (`a.b` for members, `a[0]` for
//! array items):
//! - the walker takes every numeric leaf of the document
//! - a `FieldSchema` picks declared paths and names them explicitly

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Number, Value};

use super::validator::ChecksumValidator;

/// Collects every numeric leaf of `value`, keyed by its path.
///
/// Strings count as numeric when their whole text is a decimal (the way
/// `rust_decimal` serializes). Other strings, booleans, nulls and numbers
/// that do not fit a `Decimal` are skipped. The map is ordered by path, so the result does not depend
/// on member order in the source document.
#[must_use]
pub fn walk_numeric_leaves(value: &Value) -> BTreeMap<String, Decimal> {
    let mut out = BTreeMap::new();
    walk(value, "", &mut out);
    out
}

fn walk(value: &Value, path: &str, out: &mut BTreeMap<String, Decimal>) {
    match value {
        Value::Object(members) => {
            for (name, child) in members {
                if path.is_empty() {
                    walk(child, name, out);
                } else {
                    walk(child, &format!("{path}.{name}"), out);
                }
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                walk(child, &format!("{path}[{index}]"), out);
            }
        }
        Value::Number(number) => {
            if let Some(decimal) = number_to_decimal(number) {
                out.insert(path.to_string(), decimal);
            }
        }
        Value::String(text) => {
            if let Ok(decimal) = Decimal::from_str(text.trim()) {
                out.insert(path.to_string(), decimal);
            }
        }
        Value::Bool(_) | Value::Null => {}
    }
}

fn number_to_decimal(number: &Number) -> Option<Decimal> {
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// A named key field located at a payload path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Name the field is archived under.
    pub key: String,
    /// Path of the value in the payload.
    pub path: String,
}

/// Declared key fields of one report type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSchema {
    fields: Vec<FieldDescriptor>,
}

impl FieldSchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field archived as `key`, read from `path`.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, path: impl Into<String>) -> Self {
        self.fields.push(FieldDescriptor {
            key: key.into(),
            path: path.into(),
        });
        self
    }

    /// Declared fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Extracts the declared fields. Paths that are absent or not numeric
    /// are left out.
    #[must_use]
    pub fn extract(&self, value: &Value) -> BTreeMap<String, Decimal> {
        let leaves = walk_numeric_leaves(value);
        self.fields
            .iter()
            .filter_map(|d| leaves.get(&d.path).map(|v| (d.key.clone(), *v)))
            .collect()
    }
}

/// Extracts key fields with `schema` when given, otherwise with the walker.
#[must_use]
pub fn extract_fields(value: &Value, schema: Option<&FieldSchema>) -> BTreeMap<String, Decimal> {
    match schema {
        Some(schema) => schema.extract(value),
        None => walk_numeric_leaves(value),
    }
}

/// Field schemas by report type. Reports without a schema use the walker.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, FieldSchema>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the schema for a report type.
    #[must_use]
    pub fn with_schema(mut self, report_type: impl Into<String>, schema: FieldSchema) -> Self {
        self.schemas.insert(report_type.into(), schema);
        self
    }

    /// Schema for a report type, if registered.
    #[must_use]
    pub fn get(&self, report_type: &str) -> Option<&FieldSchema> {
        self.schemas.get(report_type)
    }

    /// Validator that extracts fields the way `report_type` was archived.
    #[must_use]
    pub fn validator_for(&self, report_type: &str) -> ChecksumValidator<'_> {
        match self.get(report_type) {
            Some(schema) => ChecksumValidator::with_schema(schema),
            None => ChecksumValidator::new(),
        }
    }
}
