//! Declarative document shapes.
//!
//! Each record kind is described by a [`Schema`]: an ordered list of fields,
//! every one of them required. Submitted forms arrive as flat string maps;
//! [`Schema::validate`] trims, checks presence and casts them into a JSON body.
//! Fields not declared by the schema are dropped.

pub mod catalog;

use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

/// Storage type of a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn text(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::String,
        }
    }

    pub const fn number(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Number,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Schema {
    /// Collection the validated documents are stored in
    pub collection: &'static str,
    pub fields: &'static [FieldSpec],
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{label} is required")]
    MissingRequiredField { field: &'static str, label: &'static str },

    #[error("{label} must be a number")]
    NotANumber { field: &'static str, label: &'static str },
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validate submitted form values and cast them to a document body.
    ///
    /// Fails on the first field (in declaration order) that is missing or
    /// cannot be cast; nothing is partially accepted.
    pub fn validate(&self, input: &HashMap<String, String>) -> Result<Map<String, Value>, ValidationError> {
        let mut body = Map::new();

        for spec in self.fields {
            let raw = input.get(spec.name).map(|v| v.trim()).unwrap_or_default();

            if raw.is_empty() {
                return Err(ValidationError::MissingRequiredField {
                    field: spec.name,
                    label: spec.label,
                });
            }

            let value = match spec.kind {
                FieldKind::String => Value::String(raw.to_string()),
                FieldKind::Number => parse_number(raw).ok_or(ValidationError::NotANumber {
                    field: spec.name,
                    label: spec.label,
                })?,
            };
            body.insert(spec.name.to_string(), value);
        }

        Ok(body)
    }
}

fn parse_number(raw: &str) -> Option<Value> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(Value::Number(n.into()));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static COURSE: Schema = Schema {
        collection: "courses",
        fields: &[
            FieldSpec::text("name", "Name"),
            FieldSpec::number("hours", "Hours"),
        ],
    };

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn casts_numbers_and_drops_unknown_fields() {
        let body = COURSE
            .validate(&form(&[("name", " Rust "), ("hours", "12"), ("admin", "true")]))
            .unwrap();

        assert_eq!(Value::Object(body), json!({ "name": "Rust", "hours": 12 }));
    }

    #[test]
    fn accepts_fractional_numbers() {
        let body = COURSE.validate(&form(&[("name", "Rust"), ("hours", "1.5")])).unwrap();
        assert_eq!(body["hours"], json!(1.5));
    }

    #[test]
    fn blank_required_field_is_missing() {
        let err = COURSE.validate(&form(&[("name", "   "), ("hours", "3")])).unwrap_err();
        assert!(matches!(err, ValidationError::MissingRequiredField { field: "name", .. }));
        assert_eq!(err.to_string(), "Name is required");
    }

    #[test]
    fn rejects_non_numeric_number_field() {
        let err = COURSE.validate(&form(&[("name", "Rust"), ("hours", "ten")])).unwrap_err();
        assert!(matches!(err, ValidationError::NotANumber { field: "hours", .. }));
    }

    #[test]
    fn absent_field_is_missing() {
        let err = COURSE.validate(&form(&[("name", "Rust")])).unwrap_err();
        assert_eq!(err.to_string(), "Hours is required");
    }
}
