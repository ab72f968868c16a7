//! 规则模块：负责规则的加载、规范化、数据模型定义
pub mod model;
pub mod normalizer;
pub mod loader;
pub mod database;

// 导出核心接口
pub use self::model::{
    Application, CategorisedApplication, Category, NormalizedApplication, RawApplication,
    VersionedApplication,
};
pub use self::normalizer::{FieldShape, RuleNormalizer};
pub use self::loader::{RuleLoader, BUNDLED_RULES};
pub use self::database::SignatureDatabase;
