//! 检测结果更新工具
//! 负责记录命中的技术与版本，以及递归推导关联技术（implies）

use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::version_extractor::VersionExtractor;
use crate::compiler::Pattern;
use crate::rule::SignatureDatabase;

/// Per-session detection state: matched applications and their versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionState {
    pub matched: HashSet<String>,
    pub versions: HashMap<String, Vec<String>>,
}

impl DetectionState {
    pub fn versions(&self, application: &str) -> &[String] {
        self.versions.get(application).map(Vec::as_slice).unwrap_or_default()
    }
}

/// 检测结果更新工具
pub struct DetectionUpdater;

impl DetectionUpdater {
    /// Records a successful match of `pattern` on `content` and collects any
    /// versions its template yields.
    pub fn update(state: &mut DetectionState, application: &str, pattern: &Pattern, content: &str) {
        if !state.matched.contains(application) {
            state.matched.insert(application.to_string());
        }

        if pattern.version().is_none() {
            return;
        }

        let versions = state.versions.entry(application.to_string()).or_default();
        VersionExtractor::extract_into(pattern, content, versions);
        if versions.is_empty() {
            state.versions.remove(application);
        }
    }

    /// Names directly implied by the given applications.
    ///
    /// Names absent from the database contribute nothing.
    pub fn implied_applications<'a, I>(database: &SignatureDatabase, applications: I) -> HashSet<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        applications
            .into_iter()
            .filter_map(|name| database.application(name))
            .flat_map(|app| app.implied_names())
            .map(str::to_string)
            .collect()
    }

    /// Transitive closure of implied applications, iterated to a fixed point.
    pub fn rec_implied_applications(
        database: &SignatureDatabase,
        detected: &HashSet<String>,
    ) -> HashSet<String> {
        let mut frontier = Self::implied_applications(database, detected);
        let mut implied = HashSet::new();
        let mut rounds = 0;

        while !implied.is_superset(&frontier) {
            rounds += 1;
            implied.extend(frontier);
            frontier = Self::implied_applications(database, &implied);
        }

        debug!("关联推导完成，轮数：{}，推导技术数：{}", rounds, implied.len());
        implied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::RuleCompiler;
    use crate::rule::RuleLoader;

    fn names(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn chain_database(b_implies: &str) -> SignatureDatabase {
        let json = format!(
            r#"{{
                "apps": {{
                    "A": {{"implies": "B"}},
                    "B": {{"implies": {b_implies}}},
                    "C": {{}}
                }},
                "categories": {{}}
            }}"#
        );
        RuleLoader::load_from_str(&json).unwrap()
    }

    #[test]
    fn test_transitive_closure() {
        let db = chain_database(r#""C""#);
        let implied = DetectionUpdater::rec_implied_applications(&db, &names(&["A"]));
        assert_eq!(implied, names(&["B", "C"]));
    }

    #[test]
    fn test_cycle_terminates() {
        let db = chain_database(r#"["A", "C"]"#);
        let implied = DetectionUpdater::rec_implied_applications(&db, &names(&["A"]));
        assert_eq!(implied, names(&["A", "B", "C"]));
    }

    #[test]
    fn test_unknown_implied_name_is_carried_through() {
        let db = chain_database(r#""Nonexistent""#);
        let implied = DetectionUpdater::rec_implied_applications(&db, &names(&["A"]));
        assert_eq!(implied, names(&["B", "Nonexistent"]));
    }

    #[test]
    fn test_nothing_implied() {
        let db = chain_database(r#""C""#);
        assert!(DetectionUpdater::rec_implied_applications(&db, &names(&["C"])).is_empty());
        assert!(DetectionUpdater::rec_implied_applications(&db, &HashSet::new()).is_empty());
    }

    #[test]
    fn test_update_accumulates_distinct_versions() {
        let mut state = DetectionState::default();
        let pattern = RuleCompiler::compile_pattern(r"PHP/(\d+\.\d+)\;version:\1").unwrap();

        DetectionUpdater::update(&mut state, "PHP", &pattern, "PHP/7.4");
        DetectionUpdater::update(&mut state, "PHP", &pattern, "PHP/8.1 PHP/7.4");

        assert!(state.matched.contains("PHP"));
        assert_eq!(state.versions("PHP"), ["7.4".to_string(), "8.1".to_string()]);
    }

    #[test]
    fn test_update_without_version_only_marks_match() {
        let mut state = DetectionState::default();
        let pattern = RuleCompiler::compile_pattern("nginx").unwrap();

        DetectionUpdater::update(&mut state, "Nginx", &pattern, "nginx");

        assert!(state.matched.contains("Nginx"));
        assert!(state.versions("Nginx").is_empty());
        assert!(!state.versions.contains_key("Nginx"));
    }
}
