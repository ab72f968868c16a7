//! 页面快照
//! The already fetched and parsed page the detector matches against.

use std::collections::HashMap;
use http::header::HeaderMap;
use url::Url;

use super::html_extractor::HtmlExtractor;
use crate::error::WapResult;
use crate::utils::HeaderConverter;

/// Observable surface of one page.
///
/// Header, cookie and meta names are stored lower-cased and looked up
/// case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSnapshot {
    url: String,
    html: String,
    headers: HashMap<String, String>,
    cookies: HashMap<String, String>,
    scripts: Vec<String>,
    meta: HashMap<String, String>,
    icons: Vec<String>,
}

impl PageSnapshot {
    pub fn builder(url: impl Into<String>) -> PageSnapshotBuilder {
        PageSnapshotBuilder::new(url)
    }

    /// Builds a snapshot from a raw HTTP response: headers and cookies from
    /// the header map, script/meta/icon tags from the body.
    pub fn from_response(url: &str, headers: &HeaderMap, body: &str) -> WapResult<Self> {
        let url = Url::parse(url)?;
        let tags = HtmlExtractor::new().extract(body);

        Ok(Self::builder(url.as_str())
            .html(body)
            .headers(HeaderConverter::to_single_value(&HeaderConverter::to_hashmap(headers)))
            .cookies(HeaderConverter::cookies(headers))
            .scripts(tags.script_srcs)
            .metas(tags.meta_tags)
            .icons(tags.icons)
            .build())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }

    pub fn icons(&self) -> &[String] {
        &self.icons
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        lookup(&self.headers, name)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        lookup(&self.cookies, name)
    }

    pub fn meta(&self, name: &str) -> Option<&str> {
        lookup(&self.meta, name)
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn cookies(&self) -> &HashMap<String, String> {
        &self.cookies
    }

    pub fn metas(&self) -> &HashMap<String, String> {
        &self.meta
    }
}

fn lookup<'a>(map: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    map.get(&name.to_lowercase()).map(String::as_str)
}

/// 页面快照构建器
#[derive(Debug, Clone, Default)]
pub struct PageSnapshotBuilder {
    snapshot: PageSnapshot,
}

impl PageSnapshotBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            snapshot: PageSnapshot {
                url: url.into(),
                ..PageSnapshot::default()
            },
        }
    }

    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.snapshot.html = html.into();
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.snapshot.headers.insert(name.to_lowercase(), value.into());
        self
    }

    pub fn headers<K: AsRef<str>, V: Into<String>>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self {
        for (name, value) in headers {
            self.snapshot.headers.insert(name.as_ref().to_lowercase(), value.into());
        }
        self
    }

    pub fn cookie(mut self, name: &str, value: impl Into<String>) -> Self {
        self.snapshot.cookies.insert(name.to_lowercase(), value.into());
        self
    }

    pub fn cookies<K: AsRef<str>, V: Into<String>>(mut self, cookies: impl IntoIterator<Item = (K, V)>) -> Self {
        for (name, value) in cookies {
            self.snapshot.cookies.insert(name.as_ref().to_lowercase(), value.into());
        }
        self
    }

    pub fn script(mut self, src: impl Into<String>) -> Self {
        self.snapshot.scripts.push(src.into());
        self
    }

    pub fn scripts<S: Into<String>>(mut self, srcs: impl IntoIterator<Item = S>) -> Self {
        self.snapshot.scripts.extend(srcs.into_iter().map(Into::into));
        self
    }

    pub fn meta(mut self, name: &str, content: impl Into<String>) -> Self {
        self.snapshot.meta.insert(name.to_lowercase(), content.into());
        self
    }

    /// Later entries with the same name win.
    pub fn metas<K: AsRef<str>, V: Into<String>>(mut self, metas: impl IntoIterator<Item = (K, V)>) -> Self {
        for (name, content) in metas {
            self.snapshot.meta.insert(name.as_ref().to_lowercase(), content.into());
        }
        self
    }

    pub fn icons<S: Into<String>>(mut self, icons: impl IntoIterator<Item = S>) -> Self {
        self.snapshot.icons.extend(icons.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> PageSnapshot {
        self.snapshot
    }
}
