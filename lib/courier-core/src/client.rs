//! Transport trait.
//!
//! [`HttpClient`] is the single call primitive the rest of courier relies
//! on: send one request, get back a status, headers and a buffered body.
//! Every attempt of a logical request, retries included, goes through it.

use std::future::Future;

use bytes::Bytes;

use crate::{Request, Response, Result};

/// Core HTTP transport trait.
///
/// Implementations report a non-2xx status as a normal [`Response`]; only
/// failures to obtain a response at all (connection, TLS, timeout) are
/// errors.
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails for any reason:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send;
}
