//! Transport-level error type.
//!
//! [`Error`] describes why a request failed *below* the envelope layer: the
//! connection broke, the deadline passed, the server answered with a non-2xx
//! status, or the request was aborted because a newer one replaced it.
//! Callers of the interceptor see these wrapped in a [`crate::Rejection`].

use std::time::Duration;

use derive_more::{Display, Error, From};

/// Main error type for transport operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// Non-2xx HTTP status.
    #[display("Request failed with status code {status}")]
    #[from(skip)]
    Http {
        /// HTTP status code.
        status: u16,
        /// Reason phrase or server-provided detail.
        message: String,
        /// Response body, if available.
        #[error(not(source))]
        body: Option<bytes::Bytes>,
    },

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// The transport deadline elapsed.
    #[display("timeout of {}ms exceeded", _0.as_millis())]
    #[from(skip)]
    Timeout(#[error(not(source))] Duration),

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
        /// JSON path to the error (e.g., "data.items[0].id").
        path: String,
        /// Error message.
        message: String,
    },

    /// Form serialization error.
    #[display("form serialization error: {_0}")]
    #[from]
    FormSerialization(serde_html_form::ser::Error),

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    /// The request was aborted before it settled.
    #[display("request cancelled: {reason}")]
    #[from(skip)]
    Cancelled {
        /// Reason given by whoever cancelled the request.
        reason: String,
    },
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an HTTP error from status code and message.
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: None,
        }
    }

    /// Create an HTTP error with body.
    #[must_use]
    pub fn http_with_body(status: u16, message: impl Into<String>, body: bytes::Bytes) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: Some(body),
        }
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

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a cancellation error.
    #[must_use]
    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::Cancelled {
            reason: reason.into(),
        }
    }

    /// The message in the transport's own wording, before translation.
    ///
    /// Connection failures collapse to the bare `"Network Error"` so the
    /// translator can match them exactly; everything else uses `Display`.
    #[must_use]
    pub fn raw_message(&self) -> String {
        match self {
            Self::Connection(_) => "Network Error".to_string(),
            other => other.to_string(),
        }
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` if the request was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Returns the HTTP status code if this is an HTTP error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the response body if this is an HTTP error with a body.
    #[must_use]
    pub fn body(&self) -> Option<&bytes::Bytes> {
        match self {
            Self::Http { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_uses_transport_wording() {
        let err = Error::http(500, "Internal Server Error");
        assert_eq!(err.to_string(), "Request failed with status code 500");
        assert_eq!(err.raw_message(), "Request failed with status code 500");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn connection_raw_message_is_bare() {
        let err = Error::connection("tcp connect error: Connection refused");
        assert_eq!(
            err.to_string(),
            "connection error: tcp connect error: Connection refused"
        );
        assert_eq!(err.raw_message(), "Network Error");
        assert!(err.is_connection());
    }

    #[test]
    fn timeout_mentions_deadline() {
        let err = Error::Timeout(Duration::from_millis(5000));
        assert_eq!(err.to_string(), "timeout of 5000ms exceeded");
        assert!(err.is_timeout());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn cancelled_keeps_reason() {
        let err = Error::cancelled("duplicate request suppressed");
        assert!(err.is_cancelled());
        assert_eq!(
            err.to_string(),
            "request cancelled: duplicate request suppressed"
        );
    }

    #[test]
    fn body_only_on_http() {
        let body = bytes::Bytes::from_static(br#"{"code":500}"#);
        let err = Error::http_with_body(500, "boom", body.clone());
        assert_eq!(err.body(), Some(&body));
        assert!(Error::Timeout(Duration::from_secs(1)).body().is_none());
    }
}
