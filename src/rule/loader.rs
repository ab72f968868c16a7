//! 规则加载管理器
//! 负责从本地文件或内置资源加载规则库，并依次执行规范化、分类校验、正则编译

use std::path::Path;
use std::time::Instant;
use serde_json::Value;
use tracing::debug;

use super::database::SignatureDatabase;
use super::normalizer::RuleNormalizer;
use crate::compiler::RuleCompiler;
use crate::config::GlobalConfig;
use crate::error::{MalformedDatabaseError, WapResult};

/// Database shipped with the crate.
pub const BUNDLED_RULES: &str = include_str!("../../data/apps.json");

/// 规则加载管理器
pub struct RuleLoader;

impl RuleLoader {
    /// 按配置加载规则库（未指定路径时使用内置规则）
    pub fn load(config: &GlobalConfig) -> WapResult<SignatureDatabase> {
        match &config.rules_path {
            Some(path) => Self::load_from_path(path),
            None => Self::load_bundled(),
        }
    }

    pub fn load_bundled() -> WapResult<SignatureDatabase> {
        debug!("加载内置规则库");
        Self::load_from_str(BUNDLED_RULES)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> WapResult<SignatureDatabase> {
        let path = path.as_ref();
        debug!("从本地文件加载规则库：{}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content)
    }

    pub fn load_from_str(content: &str) -> WapResult<SignatureDatabase> {
        let value: Value = serde_json::from_str(content)?;
        Self::load_from_value(&value)
    }

    pub fn load_from_slice(bytes: &[u8]) -> WapResult<SignatureDatabase> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::load_from_value(&value)
    }

    /// Runs the three load passes over an already parsed document.
    pub fn load_from_value(value: &Value) -> WapResult<SignatureDatabase> {
        let start = Instant::now();
        let apps = value
            .get("apps")
            .and_then(Value::as_object)
            .ok_or(MalformedDatabaseError::MissingSection("apps"))?;
        let categories = value
            .get("categories")
            .and_then(Value::as_object)
            .ok_or(MalformedDatabaseError::MissingSection("categories"))?;

        // 1. 字段形态规范化
        let normalized = RuleNormalizer::normalize_applications(apps)?;
        // 2. 分类校验
        let categories = RuleNormalizer::validate_categories(categories)?;
        // 3. 正则编译
        let (applications, warnings) = RuleCompiler::compile(normalized);

        debug!(
            "规则库加载完成，耗时{:?}，应用{}个，分类{}个，无效正则{}条",
            start.elapsed(),
            applications.len(),
            categories.len(),
            warnings.len()
        );

        Ok(SignatureDatabase::new(applications, categories, warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use crate::error::WappalyzerError;

    const SAMPLE: &str = r#"{
        "apps": {
            "PHP": {
                "cats": [27],
                "headers": {"X-Powered-By": "PHP/?([\\d.]+)?\\;version:\\1"},
                "cookies": {"PHPSESSID": ""},
                "url": "\\.php(?:$|\\?)"
            },
            "Broken": {
                "cats": ["1"],
                "html": ["<div (unclosed", "<span class=\"broken\">"],
                "implies": "PHP"
            }
        },
        "categories": {
            "1": {"name": "CMS", "priority": 1},
            "27": {"name": "Programming languages"}
        }
    }"#;

    #[test]
    fn test_load_normalizes_every_field() {
        let db = RuleLoader::load_from_str(SAMPLE).unwrap();
        assert_eq!(db.len(), 2);

        for app in db.applications().values() {
            for key in app.meta.keys().chain(app.cookies.keys()).chain(app.headers.keys()) {
                assert_eq!(key, &key.to_lowercase());
            }
        }

        let broken = db.application("Broken").unwrap();
        assert_eq!(broken.implied_names().collect::<Vec<_>>(), vec!["PHP"]);
        assert_eq!(broken.cats, vec!["1"]);
        assert!(broken.url.is_none());
    }

    #[test]
    fn test_invalid_pattern_does_not_abort_load() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("warn")
            .with_test_writer()
            .try_init();

        let db = RuleLoader::load_from_str(SAMPLE).unwrap();
        assert_eq!(db.warnings().len(), 1);
        assert_eq!(db.warnings()[0].application, "Broken");

        let broken = db.application("Broken").unwrap();
        assert!(broken.html[0].is_never());
        assert!(!broken.html[1].is_never());
    }

    #[test]
    fn test_missing_category_name_fails_load() {
        let err = RuleLoader::load_from_str(r#"{"apps": {}, "categories": {"1": {"priority": 2}}}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            WappalyzerError::MalformedDatabase(MalformedDatabaseError::MissingCategoryField { .. })
        ));
    }

    #[test]
    fn test_non_mapping_field_fails_load() {
        let err = RuleLoader::load_from_str(
            r#"{"apps": {"X": {"meta": ["generator"]}}, "categories": {}}"#,
        )
        .unwrap_err();
        match err {
            WappalyzerError::MalformedDatabase(MalformedDatabaseError::NotAMapping {
                application,
                field,
            }) => {
                assert_eq!(application, "X");
                assert_eq!(field, "meta");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_sections_are_reported() {
        let err = RuleLoader::load_from_str(r#"{"categories": {}}"#).unwrap_err();
        assert!(matches!(
            err,
            WappalyzerError::MalformedDatabase(MalformedDatabaseError::MissingSection("apps"))
        ));
        assert!(matches!(
            RuleLoader::load_from_str("not json").unwrap_err(),
            WappalyzerError::JsonError(_)
        ));
    }

    #[test]
    fn test_load_from_slice() {
        let db = RuleLoader::load_from_slice(SAMPLE.as_bytes()).unwrap();
        assert_eq!(db.len(), 2);
        assert!(db.application("PHP").unwrap().headers.contains_key("x-powered-by"));

        assert!(matches!(
            RuleLoader::load_from_slice(b"\xff\xfe").unwrap_err(),
            WappalyzerError::JsonError(_)
        ));
        assert!(matches!(
            RuleLoader::load_from_slice(br#"{"apps": {}}"#).unwrap_err(),
            WappalyzerError::MalformedDatabase(MalformedDatabaseError::MissingSection("categories"))
        ));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = crate::ConfigManager::custom().rules_path(file.path()).build();
        let db = RuleLoader::load(&config).unwrap();
        assert!(db.application("PHP").is_some());
        assert_eq!(db.category("27").map(|c| c.name.as_str()), Some("Programming languages"));
    }

    #[test]
    fn test_load_bundled() {
        let db = RuleLoader::load_bundled().unwrap();
        assert!(!db.is_empty());
        assert!(db.warnings().is_empty(), "bundled rules must compile: {:?}", db.warnings());
        for app in db.applications().values() {
            for name in app.implied_names() {
                assert!(db.application(name).is_some(), "{} implies unknown {}", app.name, name);
            }
            for cat in &app.cats {
                assert!(db.category(cat).is_some(), "{} has unknown category {}", app.name, cat);
            }
        }
    }
}
