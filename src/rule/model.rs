//! 规则数据模型定义
//! Raw rule entries as authored, their normalized shape, and the compiled
//! applications the detector runs against.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::compiler::{KeyedPattern, Pattern};

/// Application rule as it appears under `apps` in the database JSON.
///
/// Every detection field is kept as a loose JSON value; the normalizer decides
/// how each shape is coerced.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawApplication {
    #[serde(default)]
    pub cats: Option<Value>,
    #[serde(default)]
    pub html: Option<Value>,
    #[serde(default)]
    pub script: Option<Value>,
    #[serde(default)]
    pub implies: Option<Value>,

    #[serde(default)]
    pub meta: Option<Value>,
    #[serde(default)]
    pub js: Option<Value>,
    #[serde(default)]
    pub cookies: Option<Value>,
    #[serde(default)]
    pub headers: Option<Value>,

    #[serde(default)]
    pub url: Option<Value>,
    #[serde(default)]
    pub icon: Option<Value>,
    #[serde(default)]
    pub website: Option<Value>,
    #[serde(default)]
    pub cpe: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Application after field-shape normalization: lists are lists, mappings
/// have lower-cased keys, scalars are strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedApplication {
    pub cats: Vec<String>,
    pub html: Vec<String>,
    pub script: Vec<String>,
    pub implies: Vec<String>,

    pub meta: BTreeMap<String, String>,
    pub js: BTreeMap<String, String>,
    pub cookies: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,

    pub url: String,
    pub icon: String,
    pub website: String,
    pub cpe: String,

    pub extra: Map<String, Value>,
}

/// 技术规则定义（编译后）
#[derive(Debug, Clone)]
pub struct Application {
    pub name: String,
    pub cats: Vec<String>,

    // 检测规则
    pub html: Vec<Pattern>,
    pub script: Vec<Pattern>,
    pub meta: BTreeMap<String, KeyedPattern>,
    pub cookies: BTreeMap<String, KeyedPattern>,
    pub headers: BTreeMap<String, KeyedPattern>,
    /// `None` when the rule declares no url pattern.
    pub url: Option<Pattern>,

    // 关联规则
    pub implies: Vec<Pattern>,

    /// JavaScript property rules; kept for completeness, never evaluated.
    pub js: BTreeMap<String, String>,
    pub icon: String,
    pub website: String,
    pub cpe: String,
    pub extra: Map<String, Value>,
}

impl Application {
    /// Names of the applications this one implies.
    pub fn implied_names(&self) -> impl Iterator<Item = &str> {
        self.implies.iter().map(|p| p.application_pattern.as_str())
    }
}

/// 分类规则定义
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `detect_with_versions` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedApplication {
    pub versions: Vec<String>,
}

/// `detect_with_versions_and_categories` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorisedApplication {
    pub versions: Vec<String>,
    pub categories: Vec<String>,
}

impl From<VersionedApplication> for CategorisedApplication {
    fn from(versioned: VersionedApplication) -> Self {
        Self {
            versions: versioned.versions,
            categories: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_application_keeps_unknown_fields() {
        let raw: RawApplication = serde_json::from_value(serde_json::json!({
            "html": "<div",
            "description": "A CMS",
            "saas": true
        }))
        .unwrap();

        assert!(raw.html.is_some());
        assert!(raw.headers.is_none());
        assert_eq!(raw.extra.get("description"), Some(&Value::from("A CMS")));
        assert_eq!(raw.extra.get("saas"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_categorised_serialization_shape() {
        let entry = CategorisedApplication {
            versions: vec!["7.4".to_string()],
            categories: vec!["Programming languages".to_string()],
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"versions": ["7.4"], "categories": ["Programming languages"]})
        );
    }
}
