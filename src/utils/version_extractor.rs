//! 版本提取工具模块
//! 根据版本模板（`\N` 分组引用与 `\N?真:假` 三元表达式）从正则捕获结果生成版本号

use std::collections::BTreeSet;

use crate::compiler::Pattern;

/// 版本提取工具类
pub struct VersionExtractor;

impl VersionExtractor {
    /// Resolves a version template against the groups of one occurrence.
    ///
    /// For each group index N, from low to high:
    /// 1. every ternary `\N?TRUE:FALSE` becomes TRUE when group N is
    ///    non-empty, FALSE otherwise (FALSE runs to the end of the template);
    /// 2. every remaining `\N` becomes the group value.
    ///
    /// Only indices referenced by the template are visited; resolving never
    /// introduces a new one. References to groups the regex does not have
    /// resolve as empty groups.
    pub fn resolve<S: AsRef<str>>(template: &str, groups: &[S]) -> String {
        let mut version = template.to_string();

        for index in referenced_indices(template) {
            let value = groups.get(index - 1).map_or("", |g| g.as_ref());

            // 三元表达式必须先于普通分组引用解析
            while let Some(ternary) = Ternary::find(&version, index) {
                let branch = if value.is_empty() { &ternary.falsy } else { &ternary.truthy };
                version = version.replace(&ternary.expression, branch);
            }

            version = replace_reference(&version, index, value);
        }

        version
    }

    /// Extracts versions from every occurrence of `pattern` in `content`,
    /// appending the new, non-empty ones to `versions` in first-seen order.
    pub fn extract_into(pattern: &Pattern, content: &str, versions: &mut Vec<String>) {
        let Some(template) = pattern.version() else {
            return;
        };

        for groups in pattern.matcher.occurrences(content) {
            let version = Self::resolve(template, &groups);
            if !version.is_empty() && !versions.contains(&version) {
                versions.push(version);
            }
        }
    }
}

/// One `\N?TRUE:FALSE` expression located in a template.
#[derive(Debug, PartialEq, Eq)]
struct Ternary {
    expression: String,
    truthy: String,
    falsy: String,
}

impl Ternary {
    /// First ternary on group `index`: `\N?` followed by at least one
    /// non-colon character, a colon, and the rest of the template.
    fn find(template: &str, index: usize) -> Option<Self> {
        let marker = format!("\\{}?", index);
        let mut offset = 0;

        while let Some(pos) = template[offset..].find(&marker) {
            let start = offset + pos;
            let body = &template[start + marker.len()..];
            match body.find(':') {
                Some(colon) if colon > 0 => {
                    return Some(Self {
                        expression: template[start..].to_string(),
                        truthy: body[..colon].to_string(),
                        falsy: body[colon + 1..].to_string(),
                    });
                }
                _ => offset = start + marker.len(),
            }
        }

        None
    }
}

/// Replaces `\N` with `value` wherever it is not the prefix of a longer index.
fn replace_reference(template: &str, index: usize, value: &str) -> String {
    let reference = format!("\\{}", index);
    let mut resolved = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(&reference) {
        let after = &rest[pos + reference.len()..];
        resolved.push_str(&rest[..pos]);
        if after.starts_with(|c: char| c.is_ascii_digit()) {
            resolved.push_str(&reference);
        } else {
            resolved.push_str(value);
        }
        rest = after;
    }

    resolved.push_str(rest);
    resolved
}

/// Every N referenced as `\N` in the template, ascending.
fn referenced_indices(template: &str) -> BTreeSet<usize> {
    template
        .split('\\')
        .skip(1)
        .filter_map(|segment| {
            let digits: String = segment.chars().take_while(char::is_ascii_digit).collect();
            digits.parse::<usize>().ok()
        })
        .filter(|&index| index > 0)
        .collect()
}
