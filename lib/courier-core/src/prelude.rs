//! Prelude module for convenient imports.
//!
//! ```ignore
//! use courier_core::prelude::*;
//! ```

pub use crate::pipeline::{Next, Pipeline, Task, TaskFn, Values};
pub use crate::{
    ContentType, Error, HttpClient, Method, Request, RequestBuilder, Response, Result, from_json,
    to_json,
};
