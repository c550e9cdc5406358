//! Location parsing and query encoding.
//!
//! Query values are encoded the way the browser router does it: `/`, `:`,
//! `@` and friends stay readable, so a return path reads
//! `/login?redirect=/journal` rather than `%2Fjournal`.
//!
//! Decoding goes through `urlencoding`. Encoding is hand-written because
//! `urlencoding::encode` escapes everything outside the unreserved set,
//! including `/`, and has no way to widen the safe set.

/// A parsed in-app location: path, query pairs and hash.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Fragment without the leading `#`.
    pub hash: String,
}

impl Location {
    /// Parse `raw` (`/path?k=v#hash`). Missing leading slash is added; an
    /// empty path becomes `/`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let (rest, hash) = raw.split_once('#').unwrap_or((raw, ""));
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

        Self { path: normalize_path(path), query: parse_query(query), hash: hash.to_owned() }
    }

    #[must_use]
    pub fn from_path(path: &str) -> Self {
        Self { path: normalize_path(path), ..Self::default() }
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// First value for `key`.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Path plus encoded query and hash.
    #[must_use]
    pub fn full_path(&self) -> String {
        let mut out = self.path.clone();
        if !self.query.is_empty() {
            out.push('?');
            let pairs: Vec<String> = self
                .query
                .iter()
                .map(|(k, v)| format!("{}={}", encode_query_value(k), encode_query_value(v)))
                .collect();
            out.push_str(&pairs.join("&"));
        }
        if !self.hash.is_empty() {
            out.push('#');
            out.push_str(&self.hash);
        }
        out
    }
}

fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_owned()
    } else if path.starts_with('/') {
        path.to_owned()
    } else {
        format!("/{path}")
    }
}

fn parse_query(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_query_value(k), decode_query_value(v))
        })
        .collect()
}

fn decode_query_value(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).map_or(spaced.clone(), std::borrow::Cow::into_owned)
}

/// Percent-encode a query key or value, leaving path-like characters
/// readable. Spaces become `+`.
#[must_use]
pub fn encode_query_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'.'
            | b'_'
            | b'~'
            | b'/'
            | b'?'
            | b':'
            | b'@'
            | b'!'
            | b'$'
            | b'\''
            | b'('
            | b')'
            | b'*'
            | b','
            | b';' => out.push(char::from(byte)),
            b' ' => out.push('+'),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

#[cfg(test)]
#[path = "location_test.rs"]
mod tests;
