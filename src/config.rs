//! 全局配置管理,存储所有可配置项

use std::path::PathBuf;
use std::time::Duration;

/// What to do with a category id that has no entry in the category table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownCategoryPolicy {
    /// Report the id as an empty category name.
    #[default]
    KeepEmpty,
    /// Drop the id from the reported categories.
    Skip,
}

/// 全局配置
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    /// Signature database file; `None` selects the bundled database.
    pub rules_path: Option<PathBuf>,
    pub unknown_category_policy: UnknownCategoryPolicy,
    // 超时配置
    pub http_timeout: Duration,
    pub verify_tls: bool,
    pub user_agent: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            rules_path: None,
            unknown_category_policy: UnknownCategoryPolicy::default(),
            http_timeout: Duration::from_millis(2500),
            verify_tls: true,
            user_agent: format!("wappalyzer-core/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> GlobalConfig {
        GlobalConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: GlobalConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.rules_path = Some(path.into());
        self
    }

    pub fn unknown_category_policy(mut self, policy: UnknownCategoryPolicy) -> Self {
        self.config.unknown_category_policy = policy;
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.config.verify_tls = verify;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> GlobalConfig {
        self.config
    }
}
