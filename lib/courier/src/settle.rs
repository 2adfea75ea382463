//! Ready-made settled futures.
//!
//! Handlers and callers sometimes need to produce an already settled
//! outcome where a future is expected. These helpers wrap a value in a
//! ready future.

use std::future::{Ready, ready};

use serde_json::Value;

pub use courier_core::error_message;

/// A future resolved with `value`.
pub fn resolve<T, E>(value: T) -> Ready<Result<T, E>> {
    ready(Ok(value))
}

/// A future rejected with `error`.
pub fn reject<T, E>(error: E) -> Ready<Result<T, E>> {
    ready(Err(error))
}

/// A future rejected with the human-readable message of an error body.
///
/// An object body is replaced by its message, see [`error_message`]:
/// `message` first, then `errors[0].message`, the empty string otherwise.
/// Arrays count as objects and have no message, so they reject with the
/// empty string. Any other value is rejected unchanged.
///
/// # Example
///
/// ```
/// use courier::settle;
/// use serde_json::json;
///
/// # async fn demo() {
/// let rejected = settle::error::<()>(json!({"errors": [{"message": "name is taken"}]})).await;
/// assert_eq!(rejected, Err(json!("name is taken")));
/// # }
/// ```
pub fn error<T>(body: Value) -> Ready<Result<T, Value>> {
    match body {
        Value::Object(_) | Value::Array(_) => ready(Err(Value::String(error_message(&body)))),
        other => ready(Err(other)),
    }
}
