use std::fmt;

use serde::Serialize;
use url::form_urlencoded;

/// A navigation target as written in the hash-history URL:
/// `#/book/12?from=home#chapter-3`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLocation {
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Query string as written, without the `?`.
    #[serde(skip)]
    raw_query: String,
    /// Includes the leading `#`, empty when absent.
    pub hash: String,
}

impl RouteLocation {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('#').unwrap_or(raw);

        let (rest, hash) = match raw.find('#') {
            Some(idx) => (&raw[..idx], raw[idx..].to_string()),
            None => (raw, String::new()),
        };
        let (path, raw_query) = rest.split_once('?').unwrap_or((rest, ""));

        Self {
            path: normalize_path(path),
            query: parse_query(raw_query),
            raw_query: raw_query.to_string(),
            hash,
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        let pair = form_urlencoded::Serializer::new(String::new())
            .append_pair(key, value)
            .finish();
        if !self.raw_query.is_empty() {
            self.raw_query.push('&');
        }
        self.raw_query.push_str(&pair);
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Path, query string and hash, as used for post-login redirects.
    /// The query keeps its original encoding.
    pub fn full_path(&self) -> String {
        let mut full = self.path.clone();
        if !self.raw_query.is_empty() {
            full.push('?');
            full.push_str(&self.raw_query);
        }
        full.push_str(&self.hash);
        full
    }
}

impl fmt::Display for RouteLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Leading slash enforced, trailing slash dropped (except for the root).
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
