//! 编译后模式模型
//! 正则编译后的结构

use std::collections::BTreeMap;
use std::fmt;
use regex::Regex;

/// Separator between the regex and its `key:value` parameters in a rule string.
pub const PARAM_SEPARATOR: &str = "\\;";

/// Parameter holding the version template.
pub const VERSION_PARAM: &str = "version";

#[derive(Debug, Clone)]
pub enum Matcher {
    Regex(Regex), // 正则匹配（忽略大小写）
    Never,        // 编译失败的规则，永不匹配
}

impl Matcher {
    /// 简单匹配判断
    pub fn is_match(&self, input: &str) -> bool {
        match self {
            Matcher::Regex(regex) => regex.is_match(input),
            Matcher::Never => false,
        }
    }

    /// Capture groups of every non-overlapping occurrence in `input`.
    ///
    /// A regex without capturing groups reports the whole match as its only
    /// group; a group that did not participate reports an empty string.
    pub fn occurrences(&self, input: &str) -> Vec<Vec<String>> {
        let Matcher::Regex(regex) = self else {
            return Vec::new();
        };

        let implicit_group = regex.captures_len() == 1;
        regex
            .captures_iter(input)
            .map(|captures| {
                let groups = if implicit_group { 0..1 } else { 1..captures.len() };
                groups
                    .map(|i| captures.get(i).map_or_else(String::new, |m| m.as_str().to_string()))
                    .collect()
            })
            .collect()
    }

    /// 规则描述
    pub fn describe(&self) -> &str {
        match self {
            Matcher::Regex(r) => r.as_str(),
            Matcher::Never => "<never>",
        }
    }
}

/// One compiled rule string: the regex plus its named parameters.
#[derive(Debug, Clone)]
pub struct Pattern {
    /// Text of the first segment, before any parameter separator.
    pub application_pattern: String,
    pub matcher: Matcher,
    /// Every `key:value` segment, including the ones the engine ignores.
    pub params: BTreeMap<String, String>,
}

impl Pattern {
    /// Splits a rule string into its regex segment and parameters.
    ///
    /// Segments after the first are `key:value` pairs split on the first
    /// colon; segments without a colon are dropped.
    pub fn split_source(source: &str) -> (&str, BTreeMap<String, String>) {
        let mut segments = source.split(PARAM_SEPARATOR);
        let expression = segments.next().unwrap_or_default();
        let params = segments
            .filter_map(|segment| segment.split_once(':'))
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        (expression, params)
    }

    pub fn is_match(&self, content: &str) -> bool {
        self.matcher.is_match(content)
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Version template, if the rule declares one.
    pub fn version(&self) -> Option<&str> {
        self.param(VERSION_PARAM)
    }

    pub fn is_never(&self) -> bool {
        matches!(self.matcher, Matcher::Never)
    }
}

/// Pattern attached to a header, cookie or meta name.
#[derive(Debug, Clone)]
pub struct KeyedPattern {
    pub pattern: Pattern,
    /// Declared with an empty pattern: the key name itself is matched, so
    /// any value is accepted once the key is present.
    pub key_only: bool,
}

impl KeyedPattern {
    /// Text this pattern is matched against for a present `key` / `value`.
    pub fn subject<'a>(&self, key: &'a str, value: &'a str) -> &'a str {
        if self.key_only { key } else { value }
    }
}

/// A rule string that failed to compile and was replaced by a never-matching pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternWarning {
    pub application: String,
    pub field: String,
    pub source: String,
    pub message: String,
}

impl fmt::Display for PatternWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "caught {} while compiling regex {:?} ({}.{})",
            self.message, self.source, self.application, self.field
        )
    }
}
