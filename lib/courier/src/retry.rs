//! Built-in retry handler for timed-out requests.

use std::sync::Arc;

use courier_core::pipeline::{Next, Outcome, Task, Values};
use futures_util::future::BoxFuture;
use tracing::{Instrument, Span, debug};

use crate::{Error, ResponseContext};

/// Status that triggers a retry by default: `408 Request Timeout`.
pub const REQUEST_TIMEOUT: u16 = 408;

/// Response handler that re-issues a request answered with `408`.
///
/// A context is retried while `max_attempts > attempt`. The attempt counter
/// starts at 1, so `max_attempts = n` means at most `n` transport calls.
/// Before retrying, the handler waits the request's retry interval, then runs
/// a full exchange for the next attempt (transport call and every handler,
/// itself included) and returns that exchange's context without calling
/// `next`. Any other context is forwarded unchanged.
///
/// Retries must run inside a tokio runtime: every attempt after the first
/// is spawned as its own task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    status: u16,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            status: REQUEST_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    /// Retry on another status than `408`.
    #[must_use]
    pub const fn with_status(status: u16) -> Self {
        Self { status }
    }

    /// The status that triggers a retry.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Whether `context` is retried.
    #[must_use]
    pub fn should_retry(&self, context: &ResponseContext) -> bool {
        let http = context.http();
        context.status() == self.status && http.max_attempts() > http.attempt()
    }
}

impl Task<ResponseContext, Error> for RetryPolicy {
    fn arity(&self) -> usize {
        1
    }

    fn call(
        &self,
        args: Values<ResponseContext>,
        next: Next<ResponseContext, Error>,
    ) -> BoxFuture<'static, Outcome<ResponseContext, Error>> {
        let Some(context) = args.into_single() else {
            return next.proceed(Values::from(vec![None]));
        };

        if !self.should_retry(&context) {
            return next.proceed(Values::one(context));
        }

        let http = Arc::clone(context.http());
        Box::pin(async move {
            let interval = http.retry_interval();
            debug!(
                status = context.status(),
                attempt = http.attempt(),
                max_attempts = http.max_attempts(),
                retry_in_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
                "retry scheduled"
            );
            drop(context);

            tokio::time::sleep(interval).await;

            // One task per attempt keeps the poll depth constant.
            let attempt = Arc::new(http.next_attempt())
                .exchange()
                .instrument(Span::current());
            let retried = tokio::spawn(attempt)
                .await
                .map_err(|err| Error::handler(format!("retry attempt aborted: {err}")))??;
            Ok(Values::one(retried))
        })
    }
}
