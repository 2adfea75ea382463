//! Prelude module for convenient imports.
//!
//! ```ignore
//! use courier::prelude::*;
//! ```

pub use crate::pipeline::{Next, Pipeline, Task, TaskFn, Values};
pub use crate::{
    ApiClient, Credentials, Error, Http, HyperClient, InitOptions, Method, RequestOptions,
    ResponseContext, Result, RetryPolicy, StatusCode,
};
pub use serde::{Deserialize, Serialize};
