//! 检测分析器：负责URL/HTML/Script/Cookie/Header/Meta各字段的匹配
//! 所有字段都会被检查，不因先前命中而短路：每个字段都可能贡献不同的版本号

use std::collections::BTreeMap;
use tracing::debug;

use crate::compiler::{KeyedPattern, Pattern};
use crate::extractor::PageSnapshot;
use crate::rule::Application;
use crate::utils::{DetectionState, DetectionUpdater};

/// Runs every field analyzer for one application.
///
/// Returns whether any field matched.
pub fn analyze_application(app: &Application, snapshot: &PageSnapshot, state: &mut DetectionState) -> bool {
    let mut detected = UrlAnalyzer::analyze(app, snapshot, state);
    detected |= HtmlAnalyzer::analyze(app, snapshot, state);
    detected |= ScriptAnalyzer::analyze(app, snapshot, state);
    detected |= CookieAnalyzer::analyze(app, snapshot, state);
    detected |= HeaderAnalyzer::analyze(app, snapshot, state);
    detected |= MetaAnalyzer::analyze(app, snapshot, state);
    detected
}

/// Matches one pattern against one piece of content and records the hit.
fn record_match(
    app: &Application,
    field: &str,
    pattern: &Pattern,
    content: &str,
    state: &mut DetectionState,
) -> bool {
    if !pattern.is_match(content) {
        return false;
    }

    debug!(
        "{}匹配成功：技术={}，规则={}",
        field,
        app.name,
        pattern.matcher.describe()
    );
    DetectionUpdater::update(state, &app.name, pattern, content);
    true
}

/// Keyed fields: a pattern is only tried when the snapshot has its key.
fn analyze_keyed<'s>(
    app: &Application,
    field: &str,
    patterns: &BTreeMap<String, KeyedPattern>,
    lookup: impl Fn(&str) -> Option<&'s str>,
    state: &mut DetectionState,
) -> bool {
    let mut detected = false;
    for (key, keyed) in patterns {
        let Some(value) = lookup(key) else {
            continue;
        };
        detected |= record_match(app, field, &keyed.pattern, keyed.subject(key, value), state);
    }
    detected
}

/// URL分析器
pub struct UrlAnalyzer;

impl UrlAnalyzer {
    pub fn analyze(app: &Application, snapshot: &PageSnapshot, state: &mut DetectionState) -> bool {
        let Some(pattern) = &app.url else {
            return false;
        };
        record_match(app, "URL", pattern, snapshot.url(), state)
    }
}

/// HTML分析器
pub struct HtmlAnalyzer;

impl HtmlAnalyzer {
    pub fn analyze(app: &Application, snapshot: &PageSnapshot, state: &mut DetectionState) -> bool {
        let mut detected = false;
        for pattern in &app.html {
            detected |= record_match(app, "HTML", pattern, snapshot.html(), state);
        }
        detected
    }
}

/// Script分析器（每条规则 × 每个script-src）
pub struct ScriptAnalyzer;

impl ScriptAnalyzer {
    pub fn analyze(app: &Application, snapshot: &PageSnapshot, state: &mut DetectionState) -> bool {
        let mut detected = false;
        for pattern in &app.script {
            for src in snapshot.scripts() {
                detected |= record_match(app, "Script", pattern, src, state);
            }
        }
        detected
    }
}

/// Cookie分析器
pub struct CookieAnalyzer;

impl CookieAnalyzer {
    pub fn analyze(app: &Application, snapshot: &PageSnapshot, state: &mut DetectionState) -> bool {
        analyze_keyed(app, "Cookie", &app.cookies, |key| snapshot.cookie(key), state)
    }
}

/// Header分析器
pub struct HeaderAnalyzer;

impl HeaderAnalyzer {
    pub fn analyze(app: &Application, snapshot: &PageSnapshot, state: &mut DetectionState) -> bool {
        analyze_keyed(app, "Header", &app.headers, |key| snapshot.header(key), state)
    }
}

/// Meta分析器
pub struct MetaAnalyzer;

impl MetaAnalyzer {
    pub fn analyze(app: &Application, snapshot: &PageSnapshot, state: &mut DetectionState) -> bool {
        analyze_keyed(app, "Meta", &app.meta, |key| snapshot.meta(key), state)
    }
}
