//! 检测模块：技术检测核心逻辑
pub mod global;
pub mod analyzer;
pub mod detector;

// 导出核心接口
pub use self::global::{
    detect_technologies, detect_technologies_with_config, global_database, init_database,
    init_database_with_config,
};
pub use self::analyzer::{
    analyze_application, CookieAnalyzer, HeaderAnalyzer, HtmlAnalyzer, MetaAnalyzer,
    ScriptAnalyzer, UrlAnalyzer,
};
pub use self::detector::TechDetector;
