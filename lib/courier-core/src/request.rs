//! HTTP request building.
//!
//! Use [`Request::builder`] to construct requests with headers, query parameters, and bodies.
//!
//! # Example
//!
//! ```
//! use courier_core::{Request, Method};
//! use bytes::Bytes;
//! use serde_json::json;
//!
//! let request = Request::<Bytes>::builder(Method::Get, "https://api.example.com/?page=1".parse().unwrap())
//!     .header("accept", "application/json")
//!     .query(&json!({"page": 2}))
//!     .expect("query")
//!     .build();
//! assert_eq!(request.url().as_str(), "https://api.example.com/?page=2");
//! ```

use std::collections::HashMap;

use bytes::Bytes;
use serde_json::Value;

use crate::{Method, query::QueryParams};

/// An HTTP request with method, URL, headers, and optional body.
#[derive(Debug, Clone)]
pub struct Request<B = Bytes> {
    method: Method,
    url: url::Url,
    headers: HashMap<String, String>,
    body: Option<B>,
}

impl<B> Request<B> {
    /// Creates a new [`RequestBuilder`].
    #[must_use]
    pub fn builder(method: Method, url: url::Url) -> RequestBuilder<B> {
        RequestBuilder::new(method, url)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Mutable access to headers.
    #[must_use]
    pub fn headers_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.headers
    }

    /// Single header value by name, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&B> {
        self.body.as_ref()
    }

    /// Consume into (method, url, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (Method, url::Url, HashMap<String, String>, Option<B>) {
        (self.method, self.url, self.headers, self.body)
    }

    /// Rebuild a request from its parts.
    #[must_use]
    pub fn from_parts(
        method: Method,
        url: url::Url,
        headers: HashMap<String, String>,
        body: Option<B>,
    ) -> Self {
        Self {
            method,
            url,
            headers,
            body,
        }
    }
}

/// Builder for constructing [`Request`] instances.
#[derive(Debug, Clone)]
pub struct RequestBuilder<B = Bytes> {
    method: Method,
    url: url::Url,
    headers: HashMap<String, String>,
    body: Option<B>,
}

impl<B> RequestBuilder<B> {
    /// Creates a new builder.
    #[must_use]
    pub fn new(method: Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets multiple headers.
    #[must_use]
    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Merges query parameters into the URL; existing keys are overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if `params` is neither an object, a string nor `null`.
    pub fn query(mut self, params: &Value) -> crate::Result<Self> {
        let mut merged = QueryParams::parse(self.url.query().unwrap_or_default());
        merged.merge(QueryParams::from_value(params)?);
        if merged.is_empty() {
            self.url.set_query(None);
        } else {
            self.url.set_query(Some(&merged.encode()));
        }
        Ok(self)
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: B) -> Self {
        self.body = Some(body);
        self
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request<B> {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl RequestBuilder<Bytes> {
    /// Set a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn json<T: serde::Serialize>(self, value: &T) -> crate::Result<Self> {
        let body = crate::to_json(value)?;
        Ok(self
            .header(http::header::CONTENT_TYPE.as_str(), crate::ContentType::Json.as_str())
            .body(body))
    }
}
