//! HTTP client with a response-handler pipeline and timeout retries.
//!
//! Every response goes through an ordered chain of handlers before the
//! request settles. Handlers are pipeline [`Task`](pipeline::Task)s over a
//! [`ResponseContext`]; the built-in [`RetryPolicy`] re-issues requests
//! answered with `408 Request Timeout`. After the handlers, the body is
//! parsed as JSON and the request resolves on `2xx`, rejects with
//! [`Error::Status`] otherwise.
//!
//! # Example
//!
//! ```ignore
//! use courier::prelude::*;
//! use serde_json::json;
//!
//! let client = ApiClient::builder()
//!     .endpoint("https://api.example.com")
//!     .build(HyperClient::builder().with_logging().build());
//!
//! client.register_response_handler(TaskFn::new(
//!     |(context,): (Option<ResponseContext>,), next: Next<ResponseContext, Error>| {
//!         if context.as_ref().is_some_and(|c| c.status() == 401) {
//!             return next.fail(Error::handler("session expired"));
//!         }
//!         next.proceed(Values::from(vec![context]))
//!     },
//! ));
//!
//! let created = client
//!     .post("/users", RequestOptions::new().data(json!({"name": "ada"})).max_attempts(3))
//!     .await?;
//! ```

mod api_client;
mod client;
mod config;
mod connector;
mod http;
pub mod middleware;
mod options;
pub mod prelude;
mod registry;
mod retry;
pub mod settle;

pub use api_client::{ApiClient, ApiClientBuilder, InitOptions};
pub use client::{BoxedService, HyperClient, HyperClientBuilder, ServiceFuture};
pub use config::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_POOL_IDLE_PER_HOST, DEFAULT_POOL_IDLE_TIMEOUT, DEFAULT_TIMEOUT,
    TransportConfig, TransportConfigBuilder,
};
pub use self::http::{Http, ResponseContext};
pub use options::{Credentials, DEFAULT_RETRY_INTERVAL, RequestOptions, ResolvedOptions};
pub use registry::{HandlerRegistry, ResponseHandler};
pub use retry::{REQUEST_TIMEOUT, RetryPolicy};

// Re-export the pipeline engine
pub use courier_core::pipeline;

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use courier_core::{
    ContentType, Error, HttpClient, Method, QueryParams, Request, RequestBuilder, Response,
    Result, STATUS_FIELD, error_message, from_json, json_or_empty, merge_query, to_json,
};

// Re-export http types for status codes and headers
pub use courier_core::{StatusCode, header};
