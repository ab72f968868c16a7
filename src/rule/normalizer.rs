//! 规则规范化
//! Field-shape normalization of raw applications and category validation.
//! Each pass runs over the whole database before the next one starts.

use std::collections::BTreeMap;
use std::collections::HashMap;
use serde_json::{Map, Value};
use tracing::debug;

use super::model::{Category, NormalizedApplication, RawApplication};
use crate::error::MalformedDatabaseError;

/// Shape of one raw rule field.
#[derive(Debug, Clone, Copy)]
pub enum FieldShape<'a> {
    Absent,
    Scalar(&'a Value),
    List(&'a [Value]),
    Mapping(&'a Map<String, Value>),
}

impl<'a> FieldShape<'a> {
    pub fn of(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => FieldShape::Absent,
            Some(Value::Array(items)) => FieldShape::List(items),
            Some(Value::Object(map)) => FieldShape::Mapping(map),
            Some(scalar) => FieldShape::Scalar(scalar),
        }
    }
}

/// 规则规范化工具
pub struct RuleNormalizer;

impl RuleNormalizer {
    /// Pass 1: normalize the shape of every application's fields.
    pub fn normalize_applications(
        apps: &Map<String, Value>,
    ) -> Result<HashMap<String, NormalizedApplication>, MalformedDatabaseError> {
        let mut normalized = HashMap::with_capacity(apps.len());
        for (name, value) in apps {
            if !value.is_object() {
                return Err(MalformedDatabaseError::ApplicationNotObject {
                    application: name.clone(),
                });
            }
            let raw: RawApplication = serde_json::from_value(value.clone()).map_err(|_| {
                MalformedDatabaseError::ApplicationNotObject {
                    application: name.clone(),
                }
            })?;
            normalized.insert(name.clone(), Self::normalize_application(name, raw)?);
        }
        debug!("规范化完成，应用数：{}", normalized.len());
        Ok(normalized)
    }

    /// Normalize one application.
    pub fn normalize_application(
        name: &str,
        raw: RawApplication,
    ) -> Result<NormalizedApplication, MalformedDatabaseError> {
        Ok(NormalizedApplication {
            cats: Self::list_field(name, "cats", raw.cats.as_ref())?,
            html: Self::list_field(name, "html", raw.html.as_ref())?,
            script: Self::list_field(name, "script", raw.script.as_ref())?,
            implies: Self::list_field(name, "implies", raw.implies.as_ref())?,

            meta: Self::dict_field(name, "meta", raw.meta.as_ref())?,
            js: Self::dict_field(name, "js", raw.js.as_ref())?,
            cookies: Self::dict_field(name, "cookies", raw.cookies.as_ref())?,
            headers: Self::dict_field(name, "headers", raw.headers.as_ref())?,

            url: Self::string_field(raw.url.as_ref()),
            icon: Self::string_field(raw.icon.as_ref()),
            website: Self::string_field(raw.website.as_ref()),
            cpe: Self::string_field(raw.cpe.as_ref()),

            extra: raw.extra,
        })
    }

    /// Absent → empty, list → items, anything else → single-item list.
    fn list_field(
        application: &str,
        field: &str,
        value: Option<&Value>,
    ) -> Result<Vec<String>, MalformedDatabaseError> {
        let invalid = || MalformedDatabaseError::InvalidFieldValue {
            application: application.to_string(),
            field: field.to_string(),
        };

        match FieldShape::of(value) {
            FieldShape::Absent => Ok(Vec::new()),
            FieldShape::Scalar(scalar) => Ok(vec![scalar_to_string(scalar).ok_or_else(invalid)?]),
            FieldShape::List(items) => items
                .iter()
                .map(|item| scalar_to_string(item).ok_or_else(invalid))
                .collect(),
            FieldShape::Mapping(_) => Err(invalid()),
        }
    }

    /// Absent → empty, mapping → lower-cased keys, anything else is malformed.
    fn dict_field(
        application: &str,
        field: &str,
        value: Option<&Value>,
    ) -> Result<BTreeMap<String, String>, MalformedDatabaseError> {
        match FieldShape::of(value) {
            FieldShape::Absent => Ok(BTreeMap::new()),
            FieldShape::Mapping(map) => map
                .iter()
                .map(|(key, pattern)| {
                    let pattern = match pattern {
                        Value::Null => Some(String::new()),
                        other => scalar_to_string(other),
                    };
                    pattern
                        .map(|pattern| (key.to_lowercase(), pattern))
                        .ok_or_else(|| MalformedDatabaseError::InvalidFieldValue {
                            application: application.to_string(),
                            field: format!("{}.{}", field, key),
                        })
                })
                .collect(),
            FieldShape::Scalar(_) | FieldShape::List(_) => Err(MalformedDatabaseError::NotAMapping {
                application: application.to_string(),
                field: field.to_string(),
            }),
        }
    }

    /// Absent → "", string as is, anything else rendered as JSON text.
    fn string_field(value: Option<&Value>) -> String {
        match value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Pass 2: every category must carry a `name`.
    pub fn validate_categories(
        categories: &Map<String, Value>,
    ) -> Result<HashMap<String, Category>, MalformedDatabaseError> {
        let mut validated = HashMap::with_capacity(categories.len());
        for (id, value) in categories {
            let Value::Object(fields) = value else {
                return Err(MalformedDatabaseError::CategoryNotObject { category: id.clone() });
            };

            let mut extra = fields.clone();
            let name = match extra.remove("name") {
                Some(Value::String(name)) => name,
                Some(Value::Null) | None => {
                    return Err(MalformedDatabaseError::MissingCategoryField {
                        category: id.clone(),
                        field: "name",
                    });
                }
                Some(other) => other.to_string(),
            };

            validated.insert(
                id.clone(),
                Category {
                    id: id.clone(),
                    name,
                    extra,
                },
            );
        }
        Ok(validated)
    }
}

/// Strings pass through; numbers and booleans are rendered; containers are rejected.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(value: Value) -> Result<NormalizedApplication, MalformedDatabaseError> {
        let raw: RawApplication = serde_json::from_value(value).unwrap();
        RuleNormalizer::normalize_application("App", raw)
    }

    #[test]
    fn test_list_fields_become_sequences() {
        let app = normalize(json!({
            "cats": 1,
            "html": "<div id=\"app\">",
            "script": ["a\\.js", "b\\.js"]
        }))
        .unwrap();

        assert_eq!(app.cats, vec!["1"]);
        assert_eq!(app.html, vec!["<div id=\"app\">"]);
        assert_eq!(app.script, vec!["a\\.js", "b\\.js"]);
        assert!(app.implies.is_empty());
    }

    #[test]
    fn test_dict_keys_are_lowercased() {
        let app = normalize(json!({
            "headers": {"X-Powered-By": "PHP", "Server": ""},
            "meta": {"Generator": "WordPress"}
        }))
        .unwrap();

        assert_eq!(app.headers.get("x-powered-by").map(String::as_str), Some("PHP"));
        assert_eq!(app.headers.get("server").map(String::as_str), Some(""));
        assert!(app.meta.contains_key("generator"));
        assert!(app.cookies.is_empty());
        assert!(app.js.is_empty());
    }

    #[test]
    fn test_non_mapping_dict_field_is_rejected() {
        let err = normalize(json!({"headers": "X-Powered-By"})).unwrap_err();
        assert_eq!(
            err,
            MalformedDatabaseError::NotAMapping {
                application: "App".to_string(),
                field: "headers".to_string(),
            }
        );

        assert!(normalize(json!({"cookies": ["session"]})).is_err());
    }

    #[test]
    fn test_scalar_fields_are_coerced() {
        let app = normalize(json!({"website": 42, "cpe": true})).unwrap();
        assert_eq!(app.website, "42");
        assert_eq!(app.cpe, "true");
        assert_eq!(app.url, "");
        assert_eq!(app.icon, "");
    }

    #[test]
    fn test_category_without_name_is_fatal() {
        let categories = json!({"1": {"name": "CMS"}, "2": {"priority": 3}});
        let err = RuleNormalizer::validate_categories(categories.as_object().unwrap()).unwrap_err();
        assert_eq!(
            err,
            MalformedDatabaseError::MissingCategoryField {
                category: "2".to_string(),
                field: "name",
            }
        );
    }

    #[test]
    fn test_category_metadata_passes_through() {
        let categories = json!({"1": {"name": "CMS", "priority": 1}});
        let validated = RuleNormalizer::validate_categories(categories.as_object().unwrap()).unwrap();
        let cms = &validated["1"];
        assert_eq!(cms.name, "CMS");
        assert_eq!(cms.extra.get("priority"), Some(&json!(1)));
    }
}
