//! Request lifecycle.
//!
//! An [`Http`] is built synchronously by [`ApiClient::request`], so every
//! construction error surfaces before any network activity. [`Http::run`]
//! then drives one logical request to completion:
//!
//! 1. send the request through the client transport,
//! 2. run the response through the client's handlers,
//! 3. parse the body of the resulting response as JSON (`{}` on failure),
//! 4. resolve on `200..=299`, reject with [`Error::Status`] otherwise.
//!
//! Retries happen in step 2: the [`RetryPolicy`](crate::RetryPolicy) handler
//! runs steps 1 and 2 again for the next attempt, and the final attempt's
//! response is the one parsed and dispatched.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use courier_core::pipeline::{Values, pipeline};
use futures_util::future::BoxFuture;
use serde_json::Value;
use tracing::{Instrument, debug, info_span};
use url::Url;

use crate::{ApiClient, Credentials, Error, Method, Request, RequestOptions, Response, Result};

/// One logical request and its current attempt.
///
/// Immutable once built; a retry works on [`Http::next_attempt`].
#[derive(Clone)]
pub struct Http {
    client: ApiClient,
    method: Method,
    url: Url,
    headers: BTreeMap<String, String>,
    credentials: Credentials,
    body: Option<Bytes>,
    max_attempts: u32,
    retry_interval: Duration,
    attempt: u32,
}

impl fmt::Debug for Http {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Http")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers)
            .field("credentials", &self.credentials)
            .field("body_len", &self.body.as_ref().map(Bytes::len))
            .field("attempt", &self.attempt)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

impl Http {
    /// Build the first attempt of a request.
    ///
    /// `options` are merged over the client defaults. Unless the options are
    /// direct, the client endpoint is prepended to `url`. Params are merged
    /// into the query string and `data` becomes the JSON body of POST and
    /// PUT requests.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRequest`] if `url` is empty or the params cannot be
    ///   flattened,
    /// - [`Error::InvalidUrl`] if the resulting URL is not absolute,
    /// - [`Error::JsonSerialization`] if the body cannot be encoded.
    pub fn new(client: ApiClient, method: Method, url: &str, options: RequestOptions) -> Result<Self> {
        if url.is_empty() {
            return Err(Error::invalid_request("url must not be empty"));
        }

        let options = options.resolve(client.defaults());

        let target = if options.direct {
            url.to_string()
        } else {
            format!("{}{url}", client.endpoint())
        };
        let target = courier_core::merge_query(&target, &options.params)?;
        let url = Url::parse(&target)?;

        let body = if method.has_body() && !options.data.is_null() {
            Some(courier_core::to_json(&options.data)?)
        } else {
            None
        };

        Ok(Self {
            client,
            method,
            url,
            headers: options.headers,
            credentials: options.credentials,
            body,
            max_attempts: options.max_attempts,
            retry_interval: options.retry_interval,
            attempt: 1,
        })
    }

    /// The same request, one attempt later.
    #[must_use]
    pub fn next_attempt(&self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self.clone()
        }
    }

    /// The client this request was built by.
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Resolved URL, query included.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Merged headers, lowercased.
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Credentials mode.
    #[must_use]
    pub const fn credentials(&self) -> Credentials {
        self.credentials
    }

    /// Encoded JSON body, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Total number of transport calls allowed on retry.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before each retry.
    #[must_use]
    pub const fn retry_interval(&self) -> Duration {
        self.retry_interval
    }

    /// Current attempt, starting at 1.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// The transport request for this attempt.
    #[must_use]
    pub fn to_request(&self) -> Request<Bytes> {
        let headers = self
            .headers
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()));
        let builder = Request::builder(self.method, self.url.clone()).headers(headers);
        match &self.body {
            Some(body) => builder.body(body.clone()).build(),
            None => builder.build(),
        }
    }

    /// Send this attempt and run the response through the client handlers.
    ///
    /// Returns the context forwarded by the last handler, which is the
    /// context of a later attempt when a handler retried.
    ///
    /// # Errors
    ///
    /// Returns the transport error, the first error signalled by a handler,
    /// or [`Error::MissingResponse`] if no context came out of the handlers.
    pub fn exchange(self: Arc<Self>) -> BoxFuture<'static, Result<ResponseContext>> {
        Box::pin(async move {
            debug!(attempt = self.attempt, "sending request");
            let response = self.client.transport().call(self.to_request()).await?;
            debug!(
                attempt = self.attempt,
                status = response.status(),
                "response received"
            );

            let handlers = self.client.handlers().snapshot();
            let context = ResponseContext {
                response,
                http: self,
            };
            let values = pipeline(handlers, Values::one(context)).await?;

            values.into_single().ok_or(Error::MissingResponse)
        })
    }

    /// Drive the request to completion.
    ///
    /// # Errors
    ///
    /// - [`Error::Status`] when the final status is outside `200..=299`;
    ///   an object body then carries an `httpStatus` field,
    /// - any transport or handler error, unchanged.
    pub async fn run(self) -> Result<Value> {
        let span = info_span!("request", method = %self.method, url = %self.url);

        async move {
            let context = Arc::new(self).exchange().await?;
            let status = context.status();
            let body = context.response().json_or_empty();

            if (200..=299).contains(&status) {
                debug!(status, "request resolved");
                Ok(body)
            } else {
                debug!(status, "request rejected");
                Err(Error::status_with_body(status, body))
            }
        }
        .instrument(span)
        .await
    }
}

/// A transport response and the attempt that produced it.
///
/// This is the value response handlers receive and forward.
#[derive(Debug, Clone)]
pub struct ResponseContext {
    response: Response<Bytes>,
    http: Arc<Http>,
}

impl ResponseContext {
    /// Pair a response with the attempt that produced it.
    #[must_use]
    pub const fn new(response: Response<Bytes>, http: Arc<Http>) -> Self {
        Self { response, http }
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.response.status()
    }

    /// The transport response.
    #[must_use]
    pub const fn response(&self) -> &Response<Bytes> {
        &self.response
    }

    /// The attempt that produced the response.
    #[must_use]
    pub const fn http(&self) -> &Arc<Http> {
        &self.http
    }

    /// Consume into the transport response.
    #[must_use]
    pub fn into_response(self) -> Response<Bytes> {
        self.response
    }
}
