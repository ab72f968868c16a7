//! 全局错误类型定义

use thiserror::Error;
use serde_json::Error as SerdeJsonError;
use std::io::Error as IoError;
use url::ParseError as UrlParseError;

/// Structural problems found while loading a signature database.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedDatabaseError {
    #[error("top-level section `{0}` is missing or not an object")]
    MissingSection(&'static str),
    #[error("application `{application}` is not an object")]
    ApplicationNotObject { application: String },
    #[error("{field} is not a dict in application `{application}`")]
    NotAMapping { application: String, field: String },
    #[error("{field} holds a value that cannot be used as a pattern in application `{application}`")]
    InvalidFieldValue { application: String, field: String },
    #[error("category `{category}` is not an object")]
    CategoryNotObject { category: String },
    #[error("{field} field is not in category `{category}`")]
    MissingCategoryField { category: String, field: &'static str },
}

#[derive(Error, Debug)]
pub enum WappalyzerError {
    // 规则相关错误
    #[error("signature database is not properly formatted: {0}")]
    MalformedDatabase(#[from] MalformedDatabaseError),

    // 序列化/反序列化错误
    #[error("JSON parse failed: {0}")]
    JsonError(#[from] SerdeJsonError),

    // 网络相关错误
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    // 基础错误
    #[error("IO operation failed: {0}")]
    IoError(#[from] IoError),
    #[error("URL parse failed: {0}")]
    UrlError(#[from] UrlParseError),
}

// 全局Result类型
pub type WapResult<T> = Result<T, WappalyzerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_names_field_and_application() {
        let err: WappalyzerError = MalformedDatabaseError::NotAMapping {
            application: "WordPress".to_string(),
            field: "headers".to_string(),
        }
        .into();

        let msg = err.to_string();
        assert!(msg.contains("headers"));
        assert!(msg.contains("WordPress"));
    }
}
