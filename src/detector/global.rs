//! 全局规则库单例管理
use std::collections::BTreeMap;
use std::path::PathBuf;
use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use super::detector::TechDetector;
use crate::config::{ConfigManager, GlobalConfig};
use crate::error::{WapResult, WappalyzerError};
use crate::extractor::PageSnapshot;
use crate::rule::{CategorisedApplication, RuleLoader, SignatureDatabase};

/// 全局规则库及其来源
struct GlobalDatabase {
    rules_path: Option<PathBuf>,
    database: SignatureDatabase,
}

/// 全局规则库实例
static GLOBAL_DATABASE: OnceCell<GlobalDatabase> = OnceCell::new();

/// 初始化全局规则库（默认配置，即内置规则）
pub fn init_database() -> WapResult<&'static SignatureDatabase> {
    init_database_with_config(&ConfigManager::get_default())
}

/// 带自定义配置初始化全局规则库
///
/// Only the first successful call loads anything. Later calls return the
/// database already in place; one asking for a different `rules_path` gets a
/// warning and the database that was loaded first.
pub fn init_database_with_config(config: &GlobalConfig) -> WapResult<&'static SignatureDatabase> {
    let global = GLOBAL_DATABASE.get_or_try_init(|| {
        let database = RuleLoader::load(config)?;
        debug!("全局规则库初始化完成：{}项技术", database.len());
        Ok::<_, WappalyzerError>(GlobalDatabase {
            rules_path: config.rules_path.clone(),
            database,
        })
    })?;

    if global.rules_path != config.rules_path {
        warn!(
            "全局规则库已从{:?}加载，忽略规则路径{:?}",
            global.rules_path, config.rules_path
        );
    }
    Ok(&global.database)
}

/// 获取全局规则库（未初始化时返回None）
pub fn global_database() -> Option<&'static SignatureDatabase> {
    GLOBAL_DATABASE.get().map(|global| &global.database)
}

/// Detects technologies on `snapshot` with the global database, loading the
/// bundled one on first use.
pub fn detect_technologies(snapshot: &PageSnapshot) -> WapResult<BTreeMap<String, CategorisedApplication>> {
    detect_technologies_with_config(snapshot, &ConfigManager::get_default())
}

/// Like `detect_technologies`; `config.rules_path` only takes effect if this
/// is the call that loads the global database.
pub fn detect_technologies_with_config(
    snapshot: &PageSnapshot,
    config: &GlobalConfig,
) -> WapResult<BTreeMap<String, CategorisedApplication>> {
    let database = init_database_with_config(config)?;
    Ok(TechDetector::with_config(database, snapshot, config).detect_with_versions_and_categories())
}
