//! Core types and the task pipeline engine for the courier HTTP client.
//!
//! This crate provides the transport-agnostic pieces of courier:
//! - [`Method`] - the four supported HTTP methods
//! - [`Request`] and [`RequestBuilder`] - HTTP request types
//! - [`Response`] - HTTP response type
//! - [`Error`] and [`Result`] - Error handling
//! - [`HttpClient`] - the transport trait
//! - [`pipeline`] - sequential tasks with arity adaptation
//! - [`merge_query`] - query-string merging

mod body;
mod client;
mod error;
mod method;
pub mod pipeline;
pub mod prelude;
mod query;
mod request;
mod response;

pub use body::{ContentType, from_json, json_or_empty, to_json};
pub use client::HttpClient;
pub use error::{Error, Result, STATUS_FIELD, error_message};
pub use method::Method;
pub use query::{QueryParams, merge_query};
pub use request::{Request, RequestBuilder};
pub use response::Response;

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
