//! Per-request options and their defaults.
//!
//! A call's [`RequestOptions`] are merged over the client defaults with
//! [`RequestOptions::resolve`]. Headers merge key by key; every other field
//! is taken from the call when set, from the defaults otherwise.

use std::collections::BTreeMap;
use std::time::Duration;

use derive_more::Display;
use serde_json::{Map, Value};

use crate::{ContentType, Result, header};

/// Default delay between two attempts.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Credentials mode attached to a request.
///
/// The hyper transport has no cookie jar, so the mode is carried on the
/// [`Http`](crate::Http) for handlers and custom transports to read.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Credentials {
    /// Send credentials with every request.
    #[default]
    #[display("include")]
    Include,
    /// Send credentials to the same origin only.
    #[display("same-origin")]
    SameOrigin,
    /// Never send credentials.
    #[display("omit")]
    Omit,
}

/// Options of one request, or the defaults of a client.
///
/// Unset fields fall back to the defaults when resolved.
///
/// # Example
///
/// ```
/// use courier::RequestOptions;
/// use serde_json::json;
///
/// let options = RequestOptions::new()
///     .header("X-Trace", "abc")
///     .params(json!({"page": 2}))
///     .max_attempts(3);
/// assert_eq!(options.headers().get("x-trace").map(String::as_str), Some("abc"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    credentials: Option<Credentials>,
    headers: BTreeMap<String, String>,
    max_attempts: Option<u32>,
    retry_interval: Option<Duration>,
    params: Option<Value>,
    data: Option<Value>,
    direct: bool,
}

impl RequestOptions {
    /// Empty options: everything comes from the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in default set.
    ///
    /// JSON `accept` and `content-type` headers, credentials included, a
    /// single attempt, 100 ms between attempts, empty params and data.
    #[must_use]
    pub fn defaults() -> Self {
        Self::new()
            .header(header::ACCEPT, ContentType::Json.as_str())
            .header(header::CONTENT_TYPE, ContentType::Json.as_str())
            .credentials(Credentials::Include)
            .max_attempts(1)
            .retry_interval(DEFAULT_RETRY_INTERVAL)
            .params(Value::Object(Map::new()))
            .data(Value::Object(Map::new()))
    }

    /// Set a header. Names are case-insensitive and stored lowercased.
    #[must_use]
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Set the credentials mode.
    #[must_use]
    pub const fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the total number of transport calls allowed on `408`.
    #[must_use]
    pub const fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Set the delay before each retry.
    #[must_use]
    pub const fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = Some(interval);
        self
    }

    /// Set the query parameters merged into the URL.
    #[must_use]
    pub fn params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    /// Set the JSON payload of POST and PUT requests.
    #[must_use]
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Serialize `value` as the JSON payload.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be represented as JSON.
    pub fn json<T: serde::Serialize>(self, value: &T) -> Result<Self> {
        let data = serde_json::to_value(value)?;
        Ok(self.data(data))
    }

    /// Use the URL as given, without the client endpoint prefix.
    #[must_use]
    pub const fn direct(mut self, direct: bool) -> Self {
        self.direct = direct;
        self
    }

    /// Headers set on these options, lowercased.
    #[must_use]
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Whether the endpoint prefix is skipped.
    #[must_use]
    pub const fn is_direct(&self) -> bool {
        self.direct
    }

    /// Merge these options over `defaults`.
    #[must_use]
    pub fn resolve(self, defaults: &Self) -> ResolvedOptions {
        let mut headers = defaults.headers.clone();
        headers.extend(self.headers);

        ResolvedOptions {
            credentials: self
                .credentials
                .or(defaults.credentials)
                .unwrap_or_default(),
            headers,
            max_attempts: self
                .max_attempts
                .or(defaults.max_attempts)
                .unwrap_or(1)
                .max(1),
            retry_interval: self
                .retry_interval
                .or(defaults.retry_interval)
                .unwrap_or(DEFAULT_RETRY_INTERVAL),
            params: self
                .params
                .or_else(|| defaults.params.clone())
                .unwrap_or(Value::Null),
            data: self
                .data
                .or_else(|| defaults.data.clone())
                .unwrap_or(Value::Null),
            direct: self.direct,
        }
    }
}

/// Options after merging over the client defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    /// Credentials mode.
    pub credentials: Credentials,
    /// Merged headers, lowercased.
    pub headers: BTreeMap<String, String>,
    /// Total number of transport calls allowed, at least 1.
    pub max_attempts: u32,
    /// Delay before each retry.
    pub retry_interval: Duration,
    /// Query parameters, `null` when none.
    pub params: Value,
    /// JSON payload, `null` for no body.
    pub data: Value,
    /// Skip the endpoint prefix.
    pub direct: bool,
}
