//! 检测器核心：整合各类分析器，输出检测结果
//! The database is only read; every versions list lives in the detector's own
//! session state, so one database serves any number of snapshots.

use std::collections::{BTreeMap, HashSet};
use std::time::Instant;
use once_cell::unsync::OnceCell;
use tracing::debug;

use super::analyzer::analyze_application;
use crate::config::{GlobalConfig, UnknownCategoryPolicy};
use crate::extractor::PageSnapshot;
use crate::rule::{CategorisedApplication, SignatureDatabase, VersionedApplication};
use crate::utils::{DetectionState, DetectionUpdater};

/// 技术检测器：一个数据库 + 一个页面快照 = 一次检测会话
#[derive(Debug)]
pub struct TechDetector<'a> {
    database: &'a SignatureDatabase,
    snapshot: &'a PageSnapshot,
    unknown_category_policy: UnknownCategoryPolicy,
    state: OnceCell<DetectionState>,
    detected: OnceCell<HashSet<String>>,
}

impl<'a> TechDetector<'a> {
    /// 创建检测器（默认配置）
    pub fn new(database: &'a SignatureDatabase, snapshot: &'a PageSnapshot) -> Self {
        Self::with_config(database, snapshot, &GlobalConfig::default())
    }

    /// 带自定义配置创建检测器
    pub fn with_config(
        database: &'a SignatureDatabase,
        snapshot: &'a PageSnapshot,
        config: &GlobalConfig,
    ) -> Self {
        Self {
            database,
            snapshot,
            unknown_category_policy: config.unknown_category_policy,
            state: OnceCell::new(),
            detected: OnceCell::new(),
        }
    }

    pub fn database(&self) -> &'a SignatureDatabase {
        self.database
    }

    pub fn snapshot(&self) -> &'a PageSnapshot {
        self.snapshot
    }

    /// Matches and versions of this session, computed on first use.
    pub fn session(&self) -> &DetectionState {
        self.state.get_or_init(|| self.scan())
    }

    fn scan(&self) -> DetectionState {
        let start = Instant::now();
        let mut state = DetectionState::default();
        for app in self.database.applications().values() {
            analyze_application(app, self.snapshot, &mut state);
        }

        debug!(
            "字段匹配完成：url={}，命中{}项，耗时{:?}",
            self.snapshot.url(),
            state.matched.len(),
            start.elapsed()
        );
        state
    }

    /// Names of every matched application plus everything they imply,
    /// transitively.
    pub fn detect(&self) -> HashSet<String> {
        self.detected
            .get_or_init(|| {
                let matched = &self.session().matched;
                let mut detected = self.rec_implied_applications(matched);
                detected.extend(matched.iter().cloned());
                debug!("检测完成：直接命中{}项，合计{}项", matched.len(), detected.len());
                detected
            })
            .clone()
    }

    /// `detect()` with the versions gathered for each application.
    pub fn detect_with_versions(&self) -> BTreeMap<String, VersionedApplication> {
        self.detect()
            .into_iter()
            .map(|name| {
                let versions = self.versions(&name).to_vec();
                (name, VersionedApplication { versions })
            })
            .collect()
    }

    /// `detect_with_versions()` with category names resolved.
    pub fn detect_with_versions_and_categories(&self) -> BTreeMap<String, CategorisedApplication> {
        self.detect_with_versions()
            .into_iter()
            .map(|(name, versioned)| {
                let categories = self.categories(&name);
                let mut entry = CategorisedApplication::from(versioned);
                entry.categories = categories;
                (name, entry)
            })
            .collect()
    }

    /// Versions recorded for `application` in this session, in first-seen order.
    pub fn versions(&self, application: &str) -> &[String] {
        self.session().versions(application)
    }

    /// Category names of `application`.
    ///
    /// Ids missing from the category table follow the configured policy.
    /// Applications absent from the database have no categories.
    pub fn categories(&self, application: &str) -> Vec<String> {
        let Some(app) = self.database.application(application) else {
            return Vec::new();
        };

        app.cats
            .iter()
            .filter_map(|id| match self.database.category(id) {
                Some(category) => Some(category.name.clone()),
                None => match self.unknown_category_policy {
                    UnknownCategoryPolicy::KeepEmpty => Some(String::new()),
                    UnknownCategoryPolicy::Skip => None,
                },
            })
            .collect()
    }

    /// Applications directly implied by `applications`.
    pub fn implied_applications(&self, applications: &HashSet<String>) -> HashSet<String> {
        DetectionUpdater::implied_applications(self.database, applications)
    }

    /// Transitive closure of what `applications` imply, excluding the
    /// inputs unless something implies them back.
    pub fn rec_implied_applications(&self, applications: &HashSet<String>) -> HashSet<String> {
        DetectionUpdater::rec_implied_applications(self.database, applications)
    }
}
