//! Header格式转换工具
//! `http::HeaderMap` 到页面快照所需映射的转换

use std::collections::HashMap;
use std::time::Instant;
use http::header::{HeaderMap, SET_COOKIE};
use tracing::{debug, warn};

/// Header转换工具
pub struct HeaderConverter;

impl HeaderConverter {
    /// 将HeaderMap转换为HashMap<String, Vec<String>>（键名小写）
    pub fn to_hashmap(header_map: &HeaderMap) -> HashMap<String, Vec<String>> {
        let start = Instant::now();
        let mut map: HashMap<String, Vec<String>> = HashMap::new();

        for (key, value) in header_map.iter() {
            let Ok(value_str) = value.to_str() else {
                warn!("Header {} 的值不是可见ASCII，已跳过", key);
                continue;
            };
            map.entry(key.as_str().to_lowercase())
                .or_default()
                .push(value_str.to_string());
        }

        debug!(
            "Header转换完成，耗时{:?}，生成{}条记录",
            start.elapsed(),
            map.len()
        );

        map
    }

    /// Folds repeated headers into one value joined with `", "`.
    pub fn to_single_value(hashmap: &HashMap<String, Vec<String>>) -> HashMap<String, String> {
        hashmap
            .iter()
            .map(|(key, values)| (key.clone(), values.join(", ")))
            .collect()
    }

    /// Cookie name/value pairs from every `Set-Cookie` header.
    pub fn cookies(header_map: &HeaderMap) -> HashMap<String, String> {
        header_map
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(Self::parse_set_cookie)
            .collect()
    }

    /// `name=value; Path=/; ...` → `(name, value)`.
    pub fn parse_set_cookie(header: &str) -> Option<(String, String)> {
        let pair = header.split(';').next()?;
        let (name, value) = pair.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some((name.to_string(), value.trim().trim_matches('"').to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::HeaderValue;

    fn sample_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-powered-by", HeaderValue::from_static("PHP/7.4.3"));
        headers.append("vary", HeaderValue::from_static("Accept-Encoding"));
        headers.append("vary", HeaderValue::from_static("Cookie"));
        headers.append(SET_COOKIE, HeaderValue::from_static("PHPSESSID=abc123; path=/"));
        headers.append(SET_COOKIE, HeaderValue::from_static("wp-settings=\"x\"; HttpOnly"));
        headers
    }

    #[test]
    fn test_to_hashmap_lowercases_keys() {
        let map = HeaderConverter::to_hashmap(&sample_headers());
        assert_eq!(map["x-powered-by"], vec!["PHP/7.4.3".to_string()]);
        assert_eq!(map["vary"].len(), 2);
    }

    #[test]
    fn test_to_single_value_joins_repeats() {
        let single = HeaderConverter::to_single_value(&HeaderConverter::to_hashmap(&sample_headers()));
        assert_eq!(single["vary"], "Accept-Encoding, Cookie");
    }

    #[test]
    fn test_cookies_from_set_cookie() {
        let cookies = HeaderConverter::cookies(&sample_headers());
        assert_eq!(cookies.get("PHPSESSID").map(String::as_str), Some("abc123"));
        assert_eq!(cookies.get("wp-settings").map(String::as_str), Some("x"));
    }

    #[test]
    fn test_parse_set_cookie_rejects_garbage() {
        assert_eq!(HeaderConverter::parse_set_cookie("novalue"), None);
        assert_eq!(HeaderConverter::parse_set_cookie("=orphan"), None);
        assert_eq!(
            HeaderConverter::parse_set_cookie("a=b=c; Secure"),
            Some(("a".to_string(), "b=c".to_string()))
        );
    }
}
