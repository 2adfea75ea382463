//! HTTP method types.

use std::str::FromStr;

use derive_more::Display;

/// HTTP request method.
///
/// Only the four methods the client knows how to shape are representable.
/// Any other method is refused when parsing, before a request exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Method {
    /// GET method - retrieve a resource.
    #[display("GET")]
    Get,
    /// POST method - create a resource.
    #[display("POST")]
    Post,
    /// PUT method - replace a resource.
    #[display("PUT")]
    Put,
    /// DELETE method - remove a resource.
    #[display("DELETE")]
    Delete,
}

impl Method {
    /// All supported methods, in factory order.
    pub const ALL: [Self; 4] = [Self::Get, Self::Post, Self::Put, Self::Delete];

    /// Returns `true` if requests with this method carry a JSON body.
    #[must_use]
    pub const fn has_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }

    /// Returns `true` if the method is idempotent.
    #[must_use]
    pub const fn is_idempotent(&self) -> bool {
        !matches!(self, Self::Post)
    }
}

impl FromStr for Method {
    type Err = crate::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            other => Err(crate::Error::InvalidRequest(format!(
                "Http Method {other} is illegal"
            ))),
        }
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
        }
    }
}

impl TryFrom<http::Method> for Method {
    type Error = crate::Error;

    fn try_from(method: http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_display() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Post.to_string(), "POST");
        assert_eq!(Method::Put.to_string(), "PUT");
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }

    #[test]
    fn method_parse_round_trips_display() {
        for method in Method::ALL {
            assert_eq!(method.to_string().parse::<Method>().expect("parse"), method);
        }
    }

    #[test]
    fn method_parse_rejects_unsupported() {
        let err = "PATCH".parse::<Method>().expect_err("PATCH is not supported");
        assert_eq!(err.to_string(), "invalid request: Http Method PATCH is illegal");

        // Case matters: the enumeration is upper-case only
        assert!("get".parse::<Method>().is_err());
        assert!("".parse::<Method>().is_err());
    }

    #[test]
    fn method_has_body() {
        assert!(Method::Post.has_body());
        assert!(Method::Put.has_body());
        assert!(!Method::Get.has_body());
        assert!(!Method::Delete.has_body());
    }

    #[test]
    fn method_is_idempotent() {
        assert!(Method::Get.is_idempotent());
        assert!(Method::Put.is_idempotent());
        assert!(Method::Delete.is_idempotent());
        assert!(!Method::Post.is_idempotent());
    }

    #[test]
    fn method_into_http() {
        assert_eq!(http::Method::from(Method::Get), http::Method::GET);
        assert_eq!(http::Method::from(Method::Delete), http::Method::DELETE);
    }

    #[test]
    fn method_from_http() {
        assert_eq!(
            Method::try_from(http::Method::POST).expect("POST"),
            Method::Post
        );
        assert!(Method::try_from(http::Method::PATCH).is_err());
        assert!(Method::try_from(http::Method::HEAD).is_err());
    }
}
