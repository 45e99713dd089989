//! Request URL assembly.
//!
//! A [`PathSpec`] is either a sequence of [`PathPart`]s (segments, optionally
//! followed by query data) or a literal path/URL string. Segment sequences
//! become `<remoteUri>/<a>/<b>.json[?query]`; literal strings are used as-is
//! when they already contain the remote URI, which is how `next_page` cursors
//! pass through untouched.

use std::fmt::Display;

use serde_json::{Map, Value};

use crate::error::RequestError;

/// One element of a segment sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum PathPart {
    Segment(String),
    /// Query object, encoded as `key=value` pairs.
    Query(Map<String, Value>),
}

impl From<&str> for PathPart {
    fn from(value: &str) -> Self {
        Self::Segment(value.to_owned())
    }
}

impl From<String> for PathPart {
    fn from(value: String) -> Self {
        Self::Segment(value)
    }
}

impl From<u64> for PathPart {
    fn from(value: u64) -> Self {
        Self::Segment(value.to_string())
    }
}

impl From<Map<String, Value>> for PathPart {
    fn from(value: Map<String, Value>) -> Self {
        Self::Query(value)
    }
}

/// Path specification accepted by every request entry point.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSpec {
    Parts(Vec<PathPart>),
    Literal(String),
}

impl PathSpec {
    pub fn segments<I, P>(parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathPart>,
    {
        Self::Parts(parts.into_iter().map(Into::into).collect())
    }

    pub fn literal(path: impl Into<String>) -> Self {
        Self::Literal(path.into())
    }

    /// Append a trailing query object.
    pub fn with_query<K, V, I>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Display,
        V: Into<Value>,
    {
        let query = pairs
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.into()))
            .collect::<Map<_, _>>();
        self.push(PathPart::Query(query))
    }

    /// Append a trailing `?`-prefixed query string, used verbatim.
    pub fn with_raw_query(self, query: impl Into<String>) -> Self {
        self.push(PathPart::Segment(query.into()))
    }

    fn push(self, part: PathPart) -> Self {
        match self {
            Self::Parts(mut parts) => {
                parts.push(part);
                Self::Parts(parts)
            }
            Self::Literal(path) => {
                let query = match part {
                    PathPart::Query(query) => encode_query(&query),
                    PathPart::Segment(raw) => raw,
                };
                Self::Literal(append_query(path, &query))
            }
        }
    }
}

/// Join `query` (`?`-prefixed or bare) onto a literal path that may already carry one.
fn append_query(mut path: String, query: &str) -> String {
    let query = query.trim_start_matches(['?', '&']);
    if query.is_empty() {
        return path;
    }
    path.push(if path.contains('?') { '&' } else { '?' });
    path.push_str(query);
    path
}

impl From<&str> for PathSpec {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_owned())
    }
}

impl From<String> for PathSpec {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl<P: Into<PathPart>> From<Vec<P>> for PathSpec {
    fn from(parts: Vec<P>) -> Self {
        Self::segments(parts)
    }
}

/// Build the fully qualified request URL.
pub fn assemble_url(remote_uri: &str, path: &PathSpec) -> Result<String, RequestError> {
    match path {
        PathSpec::Parts(parts) => assemble_parts(remote_uri, parts),
        PathSpec::Literal(literal) if literal.contains(remote_uri) => Ok(literal.clone()),
        PathSpec::Literal(literal) => Ok(format!("{remote_uri}{literal}")),
    }
}

fn assemble_parts(remote_uri: &str, parts: &[PathPart]) -> Result<String, RequestError> {
    let (segments, params) = match parts.split_last() {
        Some((PathPart::Query(query), rest)) => (rest, encode_query(query)),
        Some((PathPart::Segment(last), rest)) if last.starts_with('?') => (rest, last.clone()),
        _ => (parts, String::new()),
    };

    let mut joined = Vec::with_capacity(segments.len());
    for part in segments {
        match part {
            PathPart::Segment(segment) => joined.push(segment.as_str()),
            PathPart::Query(_) => {
                return Err(RequestError::InvalidPath(String::from(
                    "query data is only allowed as the last path element",
                )));
            }
        }
    }

    Ok(format!("{remote_uri}/{}.json{params}", joined.join("/")))
}

/// Encode a query object as `?k=v&k=v`. Arrays repeat their key.
pub fn encode_query(query: &Map<String, Value>) -> String {
    let mut pairs = Vec::with_capacity(query.len());
    for (key, value) in query {
        let key = urlencoding::encode(key);
        match value {
            Value::Array(items) => {
                for item in items {
                    pairs.push(format!("{key}={}", urlencoding::encode(&scalar(item))));
                }
            }
            other => pairs.push(format!("{key}={}", urlencoding::encode(&scalar(other)))),
        }
    }

    if pairs.is_empty() {
        String::new()
    } else {
        format!("?{}", pairs.join("&"))
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
