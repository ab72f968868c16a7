//! 规则编译器核心
//! 仅负责将规范化后的规则编译为可执行的正则模式

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;
use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use super::pattern::{KeyedPattern, Matcher, Pattern, PatternWarning};
use super::regex_fixer::RegexFixer;
use crate::rule::model::{Application, NormalizedApplication};

/// 规则编译器
pub struct RuleCompiler;

impl RuleCompiler {
    /// Pass 3: compile every pattern-carrying field of every application.
    ///
    /// Never fails: broken regexes become never-matching patterns and are
    /// reported through the returned warnings.
    pub fn compile(
        normalized: HashMap<String, NormalizedApplication>,
    ) -> (HashMap<String, Application>, Vec<PatternWarning>) {
        let start = Instant::now();
        let mut stats = CompileStats::default();
        let mut warnings = Vec::new();
        let mut applications = HashMap::with_capacity(normalized.len());

        for (name, app) in normalized {
            let compiled = Self::compile_application(&name, app, &mut stats, &mut warnings);
            applications.insert(name, compiled);
        }

        debug!("✅ 规则编译完成，总耗时{:?}", start.elapsed());
        debug!(
            "📊 编译统计：URL模式{}条、HTML模式{}条、Script模式{}条、Cookie模式{}条、Header模式{}条、Meta模式{}条、Implies{}条、无效{}条",
            stats.url_count,
            stats.html_count,
            stats.script_count,
            stats.cookie_count,
            stats.header_count,
            stats.meta_count,
            stats.implies_count,
            warnings.len()
        );

        (applications, warnings)
    }

    /// 编译单个技术规则
    fn compile_application(
        name: &str,
        app: NormalizedApplication,
        stats: &mut CompileStats,
        warnings: &mut Vec<PatternWarning>,
    ) -> Application {
        let mut ctx = CompileContext { application: name, warnings };

        let html = ctx.compile_list("html", &app.html);
        let script = ctx.compile_list("script", &app.script);
        let implies = ctx.compile_list("implies", &app.implies);
        let meta = ctx.compile_keyed("meta", &app.meta);
        let cookies = ctx.compile_keyed("cookies", &app.cookies);
        let headers = ctx.compile_keyed("headers", &app.headers);
        let url = (!app.url.is_empty()).then(|| ctx.compile("url", &app.url));

        stats.html_count += html.len();
        stats.script_count += script.len();
        stats.implies_count += implies.len();
        stats.meta_count += meta.len();
        stats.cookie_count += cookies.len();
        stats.header_count += headers.len();
        stats.url_count += usize::from(url.is_some());

        Application {
            name: name.to_string(),
            cats: app.cats,
            html,
            script,
            meta,
            cookies,
            headers,
            url,
            implies,
            js: app.js,
            icon: app.icon,
            website: app.website,
            cpe: app.cpe,
            extra: app.extra,
        }
    }

    /// Compiles one rule string without any application context.
    ///
    /// An expression the `regex` crate rejects is retried once after
    /// `RegexFixer` rewrites its Python-only constructs; the error returned is
    /// the one from the expression as written.
    pub fn compile_pattern(source: &str) -> Result<Pattern, (Pattern, regex::Error)> {
        let (expression, params) = Pattern::split_source(source);
        let application_pattern = expression.to_string();

        let built = Self::build_regex(expression).or_else(|err| match RegexFixer::fix(expression) {
            Some(fixed) => {
                let rebuilt = Self::build_regex(&fixed).map_err(|_| err)?;
                debug!("正则已兼容修复：{:?} -> {:?}", expression, fixed);
                Ok(rebuilt)
            }
            None => Err(err),
        });

        match built {
            Ok(regex) => Ok(Pattern {
                application_pattern,
                matcher: Matcher::Regex(regex),
                params,
            }),
            Err(err) => Err((
                Pattern {
                    application_pattern,
                    matcher: Matcher::Never,
                    params,
                },
                err,
            )),
        }
    }

    fn build_regex(expression: &str) -> Result<Regex, regex::Error> {
        RegexBuilder::new(expression).case_insensitive(true).build()
    }
}

/// Per-application compile state collecting warnings.
struct CompileContext<'a> {
    application: &'a str,
    warnings: &'a mut Vec<PatternWarning>,
}

impl CompileContext<'_> {
    fn compile(&mut self, field: &str, source: &str) -> Pattern {
        match RuleCompiler::compile_pattern(source) {
            Ok(pattern) => pattern,
            Err((pattern, err)) => {
                let warning = PatternWarning {
                    application: self.application.to_string(),
                    field: field.to_string(),
                    source: source.to_string(),
                    message: err.to_string(),
                };
                warn!("{}", warning);
                self.warnings.push(warning);
                pattern
            }
        }
    }

    /// 编译列表型模式（html/script/implies）
    fn compile_list(&mut self, field: &str, sources: &[String]) -> Vec<Pattern> {
        sources.iter().map(|source| self.compile(field, source)).collect()
    }

    /// 编译键值对型模式（meta/cookies/headers），空模式退化为键名本身
    fn compile_keyed(
        &mut self,
        field: &str,
        sources: &BTreeMap<String, String>,
    ) -> BTreeMap<String, KeyedPattern> {
        sources
            .iter()
            .map(|(key, source)| {
                let key_only = source.is_empty();
                let source = if key_only { key.as_str() } else { source.as_str() };
                let pattern = self.compile(field, source);
                (key.clone(), KeyedPattern { pattern, key_only })
            })
            .collect()
    }
}

/// 编译统计信息
#[derive(Debug, Clone, Default)]
struct CompileStats {
    url_count: usize,
    html_count: usize,
    script_count: usize,
    cookie_count: usize,
    header_count: usize,
    meta_count: usize,
    implies_count: usize,
}
