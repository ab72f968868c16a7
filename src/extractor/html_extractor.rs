//! HTML标签提取器
//! 负责从HTML中提取script-src、meta标签与图标地址

use std::cell::RefCell;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use markup5ever::interface::Attribute;
use tendril::StrTendril;

/// Tags pulled out of one HTML document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractedTags {
    pub script_srcs: Vec<String>,
    /// `(lower-cased name, content)` in document order.
    pub meta_tags: Vec<(String, String)>,
    pub icons: Vec<String>,
}

#[derive(Debug, Default)]
struct TagSink {
    tags: RefCell<ExtractedTags>,
}

impl TokenSink for TagSink {
    type Handle = ();

    fn process_token(&self, token: Token, _line: u64) -> TokenSinkResult<()> {
        if let Token::TagToken(Tag {
            kind: TagKind::StartTag,
            name,
            attrs,
            ..
        }) = token
        {
            match name.as_ref() {
                "script" => self.extract_script_src(&attrs),
                "meta" => self.extract_meta_tag(&attrs),
                "img" | "svg" | "i" => self.extract_icon(&attrs, "src"),
                "link" if is_icon_link(&attrs) => self.extract_icon(&attrs, "href"),
                _ => {}
            }
        }
        TokenSinkResult::Continue
    }
}

impl TagSink {
    /// 提取script-src
    fn extract_script_src(&self, attrs: &[Attribute]) {
        if let Some(src) = attr_value(attrs, "src") {
            self.tags.borrow_mut().script_srcs.push(src.to_string());
        }
    }

    /// 提取meta标签（需同时具备name与content）
    fn extract_meta_tag(&self, attrs: &[Attribute]) {
        if let (Some(name), Some(content)) = (attr_value(attrs, "name"), attr_value(attrs, "content")) {
            self.tags
                .borrow_mut()
                .meta_tags
                .push((name.to_lowercase(), content.to_string()));
        }
    }

    fn extract_icon(&self, attrs: &[Attribute], attr: &str) {
        if let Some(url) = attr_value(attrs, attr) {
            self.tags.borrow_mut().icons.push(url.to_string());
        }
    }
}

fn attr_value<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|attr| attr.name.local.as_ref() == name)
        .map(|attr| &*attr.value)
}

fn is_icon_link(attrs: &[Attribute]) -> bool {
    attr_value(attrs, "rel")
        .is_some_and(|rel| rel.split_ascii_whitespace().any(|r| r.eq_ignore_ascii_case("icon")))
}

/// HTML标签提取器
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    /// 创建新的提取器
    pub fn new() -> Self {
        Self
    }

    /// 从HTML字符串提取标签
    pub fn extract(&self, html: &str) -> ExtractedTags {
        let tokenizer = Tokenizer::new(TagSink::default(), TokenizerOpts::default());
        let queue = BufferQueue::default();
        queue.push_back(StrTendril::from(html));

        let _ = tokenizer.feed(&queue);
        tokenizer.end();

        tokenizer.sink.tags.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_extractor() {
        let html = r#"
            <script src="/jquery.min.js"></script>
            <meta name="Author" content="test_user">
            <meta name="generator" content="WordPress 6.0" />
            <meta property="og:title" content="ignored">
            <script>var inline = 1;</script>
            <script src="/vue.global.js"></script>
        "#;

        let tags = HtmlExtractor::new().extract(html);

        assert_eq!(
            tags.script_srcs,
            vec!["/jquery.min.js".to_string(), "/vue.global.js".to_string()]
        );
        assert_eq!(
            tags.meta_tags,
            vec![
                ("author".to_string(), "test_user".to_string()),
                ("generator".to_string(), "WordPress 6.0".to_string())
            ]
        );
        assert!(tags.icons.is_empty());
    }

    #[test]
    fn test_icons() {
        let html = r#"
            <link rel="shortcut icon" href="/favicon.ico">
            <link rel="stylesheet" href="/style.css">
            <img src="/logo.png" alt="">
        "#;

        let tags = HtmlExtractor::new().extract(html);
        assert_eq!(tags.icons, vec!["/favicon.ico".to_string(), "/logo.png".to_string()]);
    }
}
