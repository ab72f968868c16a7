//! wappalyzer-core - Wappalyzer风格的网站技术指纹识别引擎

// 导出全局错误类型
pub use self::error::{MalformedDatabaseError, WapResult, WappalyzerError};

// 导出配置模块
pub use self::config::{ConfigManager, CustomConfigBuilder, GlobalConfig, UnknownCategoryPolicy};

// 导出规则模块核心接口
pub use self::rule::{
    Application, CategorisedApplication, Category, RuleLoader, SignatureDatabase,
    VersionedApplication,
};

// 导出提取模块核心接口
pub use self::extractor::{HtmlExtractor, PageSnapshot, PageSnapshotBuilder};
#[cfg(feature = "fetch")]
pub use self::extractor::fetch_snapshot;

// 导出工具模块核心接口
pub use self::utils::{DetectionState, DetectionUpdater, HeaderConverter, VersionExtractor};

// 导出编译模块核心接口
pub use self::compiler::{KeyedPattern, Matcher, Pattern, PatternWarning, RegexFixer, RuleCompiler};

// 导出检测模块核心接口
pub use self::detector::{
    TechDetector,
    detect_technologies,
    detect_technologies_with_config,
    global_database,
    init_database,
    init_database_with_config,
};

// 声明所有子模块
pub mod config;
pub mod error;
pub mod rule;
pub mod extractor;
pub mod utils;
pub mod compiler;
pub mod detector;
