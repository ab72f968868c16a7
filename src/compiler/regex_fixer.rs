//! 正则兼容修复
//! Rule databases are written for Python's `re`; this rewrites the constructs
//! it accepts but the `regex` crate rejects. Only applied after a direct
//! compile has failed.

use once_cell::sync::Lazy;
use regex::Regex;

// 环视（含一层嵌套括号），非精确解析
static LOOK_AROUND_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(\?\s*(?:=|!|<=|<!)(?:[^()]|\([^()]*\))*\)").unwrap()
});

// 计数重复 {n} {n,} {n,m}，以及Python的 {,m}
static COUNTED_REPETITION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\{(?:\d+(?:,\d*)?|,\d+)\}").unwrap()
});

/// Escapes of ASCII letters the `regex` crate understands.
const KNOWN_LETTER_ESCAPES: &str = "dDwWsSbBAzntrfvxpPu";

/// Shorthand classes that cannot be a range endpoint.
const SHORTHAND_CLASSES: &str = "dDwWsS";

/// 正则修复器
pub struct RegexFixer;

impl RegexFixer {
    /// Rewrites `expression`; `None` when there was nothing to rewrite.
    pub fn fix(expression: &str) -> Option<String> {
        let without_look_around = Self::remove_look_around(expression);
        let fixed = Self::escape_literals(&without_look_around);
        (fixed != expression).then_some(fixed)
    }

    /// 移除环视语法（(?=)(?!)(?<=)(?<!)，regex不支持）
    ///
    /// The match becomes wider than the rule intended: a negative look-ahead
    /// no longer excludes anything.
    pub fn remove_look_around(expression: &str) -> String {
        LOOK_AROUND_REGEX.replace_all(expression, "").into_owned()
    }

    /// Escapes what Python reads as a literal:
    /// * `{` / `}` that do not form a counted repetition;
    /// * `-` next to a shorthand class inside `[...]` (`[\w-.]`);
    /// * a trailing lone backslash.
    ///
    /// Escapes of unknown letters (`\i`, `\q`) lose their backslash, as Python
    /// treats them as the letter itself.
    pub fn escape_literals(expression: &str) -> String {
        let chars: Vec<(usize, char)> = expression.char_indices().collect();
        let mut fixed = String::with_capacity(expression.len() + 8);
        let mut in_class = false;
        // 字符集内上一个元素是否为\w\d\s等
        let mut after_shorthand = false;
        let mut i = 0;

        while i < chars.len() {
            let (offset, c) = chars[i];
            match c {
                '\\' => {
                    let Some(&(_, next)) = chars.get(i + 1) else {
                        fixed.push_str("\\\\");
                        break;
                    };
                    if next.is_ascii_alphabetic() && !KNOWN_LETTER_ESCAPES.contains(next) {
                        fixed.push(next);
                        after_shorthand = false;
                    } else {
                        fixed.push('\\');
                        fixed.push(next);
                        after_shorthand = SHORTHAND_CLASSES.contains(next);
                    }
                    i += 2;
                    continue;
                }
                '[' if !in_class => {
                    in_class = true;
                    after_shorthand = false;
                    fixed.push('[');
                    // 开头的^与]均为字面量
                    if let Some(&(_, '^')) = chars.get(i + 1) {
                        fixed.push('^');
                        i += 1;
                    }
                    if let Some(&(_, ']')) = chars.get(i + 1) {
                        fixed.push_str("\\]");
                        i += 1;
                    }
                }
                ']' if in_class => {
                    in_class = false;
                    fixed.push(']');
                }
                '-' if in_class => {
                    if after_shorthand || Self::shorthand_at(&chars, i + 1) {
                        fixed.push_str("\\-");
                    } else {
                        fixed.push('-');
                    }
                    after_shorthand = false;
                }
                '{' if !in_class => match COUNTED_REPETITION_REGEX.find(&expression[offset..]) {
                    Some(quantifier) => {
                        let quantifier = quantifier.as_str();
                        match quantifier.strip_prefix("{,") {
                            Some(max) => {
                                fixed.push_str("{0,");
                                fixed.push_str(max);
                            }
                            None => fixed.push_str(quantifier),
                        }
                        i += quantifier.chars().count();
                        continue;
                    }
                    None => fixed.push_str("\\{"),
                },
                '}' if !in_class => fixed.push_str("\\}"),
                _ => {
                    after_shorthand = false;
                    fixed.push(c);
                }
            }
            i += 1;
        }

        fixed
    }

    fn shorthand_at(chars: &[(usize, char)], i: usize) -> bool {
        matches!(
            (chars.get(i), chars.get(i + 1)),
            (Some(&(_, '\\')), Some(&(_, c))) if SHORTHAND_CLASSES.contains(c)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_look_around() {
        assert_eq!(
            RegexFixer::remove_look_around(r"bootstrap(?!-theme)(?:\.min)?\.js"),
            r"bootstrap(?:\.min)?\.js"
        );
        assert_eq!(RegexFixer::remove_look_around(r"(?<=v)(\d+)(?=\.js)"), r"(\d+)");
        assert_eq!(RegexFixer::remove_look_around(r"a(?!b(c)d)e"), "ae");
    }

    #[test]
    fn test_literal_braces_escaped() {
        assert_eq!(RegexFixer::escape_literals("jquery{"), r"jquery\{");
        assert_eq!(RegexFixer::escape_literals("var x = {a}"), r"var x = \{a\}");
        assert_eq!(RegexFixer::escape_literals(r"[a-f\d]{32}"), r"[a-f\d]{32}");
        assert_eq!(RegexFixer::escape_literals(r"x{2,}y{1,3}"), r"x{2,}y{1,3}");
        assert_eq!(RegexFixer::escape_literals("[{}]"), "[{}]");
        assert_eq!(RegexFixer::escape_literals(r"\d{,3}"), r"\d{0,3}");
    }

    #[test]
    fn test_hyphen_next_to_shorthand_escaped() {
        assert_eq!(RegexFixer::escape_literals(r"[\w-.]+"), r"[\w\-.]+");
        assert_eq!(RegexFixer::escape_literals(r"[.-\d]"), r"[.\-\d]");
        assert_eq!(RegexFixer::escape_literals(r"[a-z0-9-]"), r"[a-z0-9-]");
    }

    #[test]
    fn test_escapes() {
        assert_eq!(RegexFixer::escape_literals(r"\i\d\.\/"), r"i\d\.\/");
        assert_eq!(RegexFixer::escape_literals("abc\\"), r"abc\\");
        assert_eq!(RegexFixer::escape_literals(r"\{x\}"), r"\{x\}");
    }

    #[test]
    fn test_leading_bracket_in_class() {
        assert_eq!(RegexFixer::escape_literals("[]a]"), r"[\]a]");
        assert_eq!(RegexFixer::escape_literals("[^]a]"), r"[^\]a]");
    }

    #[test]
    fn test_fix_reports_unchanged() {
        assert_eq!(RegexFixer::fix(r"nginx(?:/([\d.]+))?"), None);
        assert_eq!(RegexFixer::fix("foo(bar"), None);
        assert_eq!(RegexFixer::fix("jquery{").as_deref(), Some(r"jquery\{"));
    }
}
