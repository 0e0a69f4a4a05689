//! Request construction: verbs, versioned paths, parameter encoding and
//! header merging.
//!
//! Query strings and form bodies share one encoder. Array values are written
//! as repeated keys (`ids=a&ids=b`); nested objects cannot be form-encoded and
//! are rejected before any network activity.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::map::Entry;
use serde_json::Value;
use url::form_urlencoded;

use crate::error::{Error, Result};

/// Ordered parameter mapping used for query strings and request bodies.
pub type Params = serde_json::Map<String, Value>;

/// Content type for JSON request bodies.
pub const JSON: &str = "application/json";

/// Content type for form-encoded request bodies (the default).
pub const FORM: &str = "application/x-www-form-urlencoded";

static VERSIONED_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/v\d+/").expect("version pattern is valid"));

/// HTTP verbs accepted by the gateway.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
        }
    }

    /// The matching `reqwest` method.
    pub fn method(&self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
            Self::Head => reqwest::Method::HEAD,
            Self::Options => reqwest::Method::OPTIONS,
            Self::Patch => reqwest::Method::PATCH,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "PATCH" => Ok(Self::Patch),
            other => Err(Error::config(format!("Unsupported HTTP verb `{}`", other))),
        }
    }
}

/// A single logical API call, consumed by [`Client::call`](crate::Client::call).
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub verb: Verb,
    /// Logical path, version-qualified by the gateway unless it already
    /// starts with `/v<N>/`.
    pub path: String,
    pub query: Option<Value>,
    pub body: Option<Value>,
    /// Header overrides; these win over the client's defaults.
    pub headers: Vec<(String, String)>,
}

impl RequestSpec {
    pub fn new(verb: Verb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
            query: None,
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Verb::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Verb::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Verb::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Verb::Delete, path)
    }

    pub fn head(path: impl Into<String>) -> Self {
        Self::new(Verb::Head, path)
    }

    pub fn options(path: impl Into<String>) -> Self {
        Self::new(Verb::Options, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Verb::Patch, path)
    }

    /// Set the query parameters. Must be a JSON object of scalars or arrays.
    pub fn query(mut self, query: impl Into<Value>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Set the body. Without an explicit `Content-Type` it is form-encoded.
    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the body and declare it as JSON.
    pub fn json(self, body: impl Into<Value>) -> Self {
        self.body(body).header(CONTENT_TYPE.as_str(), JSON)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Whether `path` already carries a `/v<N>/` version segment.
pub fn is_versioned(path: &str) -> bool {
    VERSIONED_PATH.is_match(path)
}

/// Prefix `path` with `/<version>` unless it is already versioned.
pub fn versioned_path(path: &str, version: &str) -> String {
    if is_versioned(path) {
        path.to_string()
    } else if path.starts_with('/') {
        format!("/{}{}", version, path)
    } else {
        format!("/{}/{}", version, path)
    }
}

/// Whether `path` has a `.` or `..` segment, literal or percent-encoded.
///
/// URL parsing resolves these, which would send the request to another
/// resource than the one named.
pub fn has_dot_segment(path: &str) -> bool {
    path.split('/').any(|segment| {
        matches!(
            segment.to_ascii_lowercase().as_str(),
            "." | ".." | "%2e" | ".%2e" | "%2e." | "%2e%2e"
        )
    })
}

/// Build a parameter map from `key=value` pairs; repeated keys collect into an array.
pub fn params_from_pairs<I, K, V>(pairs: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut params = Params::new();
    for (key, value) in pairs {
        let value = Value::String(value.into());
        match params.entry(key.into()) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                Value::Array(items) => items.push(value),
                existing => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
            },
        }
    }
    params
}

/// View an optional value as a parameter map.
pub(crate) fn as_params<'a>(value: Option<&'a Value>, what: &str) -> Result<Option<&'a Params>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(other) => Err(Error::config(format!(
            "{} must be a JSON object, got {}",
            what, other
        ))),
    }
}

fn form_scalar(key: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Array(_) | Value::Object(_) => Err(Error::config(format!(
            "Cannot form-encode nested value for `{}`",
            key
        ))),
    }
}

/// Encode a flat parameter map as `application/x-www-form-urlencoded`.
pub fn encode_form(params: &Params) -> Result<String> {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        let items = match value {
            Value::Array(items) => items.as_slice(),
            single => std::slice::from_ref(single),
        };
        for item in items {
            match form_scalar(key, item)? {
                Some(v) => serializer.append_pair(key, &v),
                None => serializer.append_key_only(key),
            };
        }
    }
    Ok(serializer.finish())
}

/// Merge caller headers over `defaults`. Names compare case-insensitively;
/// a caller value replaces every default value under the same name.
pub fn merge_headers(defaults: &HeaderMap, overrides: &[(String, String)]) -> Result<HeaderMap> {
    let mut headers = defaults.clone();
    for (name, value) in overrides {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::config(format!("Invalid header name `{}`: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::config(format!("Invalid value for header `{}`: {}", name, e)))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// Serialize `body` according to the effective `Content-Type`.
///
/// An empty or absent body yields `None` and leaves the headers untouched.
/// A non-empty body without a declared type is form-encoded and the header
/// is set accordingly.
pub fn encode_body(body: Option<&Value>, headers: &mut HeaderMap) -> Result<Option<Vec<u8>>> {
    let params = match as_params(body, "Request body")? {
        Some(params) if !params.is_empty() => params,
        _ => return Ok(None),
    };

    let declared = match headers.get(CONTENT_TYPE) {
        Some(value) => value
            .to_str()
            .map_err(|_| Error::config("Content-Type header is not valid text"))?
            .to_string(),
        None => {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM));
            FORM.to_string()
        }
    };

    let essence = declared
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        JSON => Ok(Some(serde_json::to_vec(params)?)),
        FORM => Ok(Some(encode_form(params)?.into_bytes())),
        _ => Err(Error::config(format!(
            "Unrecognized Content-Type `{}`",
            declared
        ))),
    }
}
