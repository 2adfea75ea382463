//! Error types for courier.
//!
//! A non-2xx status is not a transport failure: it travels through the
//! response pipeline like any other response and only becomes
//! [`Error::Status`] when the lifecycle dispatches the parsed body.

use derive_more::{Display, Error, From};
use serde_json::Value;

/// Field attached to rejected object bodies, holding the numeric status.
pub const STATUS_FIELD: &str = "httpStatus";

/// Main error type for courier operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The server answered with a status outside `200..=299`.
    ///
    /// `body` is the parsed response body (`{}` when it could not be
    /// parsed); object bodies also carry the status under [`STATUS_FIELD`].
    #[display("HTTP error {status}")]
    #[from(skip)]
    Status {
        /// HTTP status code.
        status: u16,
        /// Parsed response body.
        #[error(not(source))]
        body: Value,
    },

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout at the transport level.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "user.address.city").
        path: String,
        /// Error message.
        message: String,
    },

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    /// The response pipeline completed without forwarding a response.
    #[display("response pipeline produced no response")]
    #[from(skip)]
    MissingResponse,

    /// A response handler aborted the pipeline.
    #[display("handler error: {_0}")]
    #[from(skip)]
    Handler(#[error(not(source))] String),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a status rejection, attaching [`STATUS_FIELD`] to object bodies.
    #[must_use]
    pub fn status_with_body(status: u16, mut body: Value) -> Self {
        if let Value::Object(map) = &mut body {
            map.insert(STATUS_FIELD.to_string(), Value::from(status));
        }
        Self::Status { status, body }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a handler error, used by response handlers to abort a pipeline.
    #[must_use]
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this is a transport timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns the HTTP status code if this is a status rejection.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }

    /// The parsed body of a status rejection.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        match self {
            Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Human-readable message for this error.
    ///
    /// For a status rejection the message comes from the body, see
    /// [`error_message`]. Other errors use their display form.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Status { body, .. } => error_message(body),
            other => other.to_string(),
        }
    }

    /// Decode the body of a status rejection into a typed value.
    ///
    /// Returns `None` if this is not a status rejection.
    pub fn decode_body<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.body().map(|body| {
            serde_path_to_error::deserialize(body).map_err(|e| {
                Self::json_deserialization(e.path().to_string(), e.inner().to_string())
            })
        })
    }
}

/// Extract a human-readable message from an error body.
///
/// Looks at `message` first, then at `errors[0].message`; anything else
/// yields an empty string.
#[must_use]
pub fn error_message(body: &Value) -> String {
    let direct = body.get("message").and_then(Value::as_str);
    let nested = || {
        body.get("errors")
            .and_then(|errors| errors.get(0))
            .and_then(|first| first.get("message"))
            .and_then(Value::as_str)
    };

    direct
        .filter(|message| !message.is_empty())
        .or_else(nested)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn error_display() {
        let err = Error::status_with_body(404, json!({}));
        assert_eq!(err.to_string(), "HTTP error 404");

        let err = Error::Timeout;
        assert_eq!(err.to_string(), "request timeout");

        let err = Error::connection("failed to connect");
        assert_eq!(err.to_string(), "connection error: failed to connect");

        let err = Error::handler("token expired");
        assert_eq!(err.to_string(), "handler error: token expired");

        let err = Error::json_deserialization("user.address.city", "missing field `city`");
        assert_eq!(
            err.to_string(),
            "JSON deserialization error at 'user.address.city': missing field `city`"
        );
    }

    #[test]
    fn status_rejection_attaches_status_field() {
        let err = Error::status_with_body(422, json!({"message": "bad input"}));
        assert_eq!(err.status(), Some(422));
        assert_eq!(
            err.body(),
            Some(&json!({"message": "bad input", "httpStatus": 422}))
        );
    }

    #[test]
    fn status_rejection_keeps_non_object_bodies() {
        let err = Error::status_with_body(500, json!([1, 2]));
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.body(), Some(&json!([1, 2])));
    }

    #[test]
    fn error_status_classes() {
        let err = Error::status_with_body(404, json!({}));
        assert!(err.is_client_error());
        assert!(!err.is_server_error());

        let err = Error::status_with_body(503, json!({}));
        assert!(!err.is_client_error());
        assert!(err.is_server_error());

        let err = Error::Timeout;
        assert_eq!(err.status(), None);
        assert!(!err.is_client_error());
        assert!(err.is_timeout());
        assert!(!err.is_connection());
    }

    #[test]
    fn message_prefers_top_level_field() {
        let body = json!({"message": "top", "errors": [{"message": "nested"}]});
        assert_eq!(error_message(&body), "top");
    }

    #[test]
    fn message_falls_back_to_first_error() {
        let body = json!({"errors": [{"message": "first"}, {"message": "second"}]});
        assert_eq!(error_message(&body), "first");
    }

    #[test]
    fn message_defaults_to_empty() {
        assert_eq!(error_message(&json!({})), "");
        assert_eq!(error_message(&json!({"errors": []})), "");
        assert_eq!(error_message(&json!({"errors": [{"code": 1}]})), "");
        assert_eq!(error_message(&json!("plain")), "");
    }

    #[test]
    fn error_message_method() {
        let err = Error::status_with_body(400, json!({"errors": [{"message": "invalid"}]}));
        assert_eq!(err.message(), "invalid");
        assert_eq!(Error::Timeout.message(), "request timeout");
    }

    #[test]
    fn error_decode_body() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct ApiError {
            message: String,
            #[serde(rename = "httpStatus")]
            http_status: u16,
        }

        let err = Error::status_with_body(409, json!({"message": "conflict"}));
        let decoded = err
            .decode_body::<ApiError>()
            .expect("status rejection")
            .expect("decode");
        assert_eq!(
            decoded,
            ApiError {
                message: "conflict".to_string(),
                http_status: 409,
            }
        );

        assert!(Error::Timeout.decode_body::<ApiError>().is_none());
    }
}
