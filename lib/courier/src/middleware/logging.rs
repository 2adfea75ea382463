//! Transport exchange logging.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use bytes::Bytes;
use tower::{Layer, Service};
use tracing::{Instrument, Level, debug, info, span, warn};

use crate::{Error, Request, Response, Result};

/// Layer that logs every transport exchange.
///
/// # Example
///
/// ```ignore
/// use courier::HyperClient;
/// use courier::middleware::LoggingLayer;
///
/// let transport = HyperClient::builder()
///     .layer(LoggingLayer::debug())
///     .build();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer {
    level: LogLevel,
}

/// Verbosity of the logging middleware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Request headers and body size, at debug level.
    Debug,
    /// Method, URL and outcome only, at info level.
    #[default]
    Info,
}

impl LoggingLayer {
    /// Create a new logging layer with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logging layer that logs at debug level.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
        }
    }

    /// Verbosity of this layer.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = Logging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logging {
            inner,
            level: self.level,
        }
    }
}

/// Service that logs transport exchanges.
#[derive(Debug, Clone)]
pub struct Logging<S> {
    inner: S,
    level: LogLevel,
}

impl<S> Service<Request<Bytes>> for Logging<S>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let method = request.method();
        let url = request.url().to_string();
        let level = self.level;

        let span = span!(Level::INFO, "transport", %method, %url);

        // Call the service that was polled ready, leave a fresh clone behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(
            async move {
                let start = Instant::now();

                match level {
                    LogLevel::Debug => debug!(
                        headers = ?request.headers(),
                        body_len = request.body().map_or(0, Bytes::len),
                        "sending request"
                    ),
                    LogLevel::Info => info!("sending request"),
                }

                let result = inner.call(request).await;
                let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

                match &result {
                    Ok(response) if response.is_success() => {
                        info!(status = response.status(), elapsed_ms, "exchange completed");
                    }
                    Ok(response) => {
                        warn!(status = response.status(), elapsed_ms, "exchange returned an error status");
                    }
                    Err(err) => {
                        warn!(error = %err, elapsed_ms, "exchange failed");
                    }
                }

                result
            }
            .instrument(span),
        )
    }
}
