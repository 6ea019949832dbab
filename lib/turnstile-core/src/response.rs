//! Raw HTTP response as produced by the transport.

use std::collections::HashMap;

use bytes::Bytes;

use crate::Envelope;

/// HTTP response with status, headers, and body.
#[derive(Debug, Clone)]
pub struct Response<B = Bytes> {
    status: u16,
    headers: HashMap<String, String>,
    body: B,
}

impl<B> Response<B> {
    /// Creates a new response.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: B) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &B {
        &self.body
    }

    /// Consume into body.
    #[must_use]
    pub fn into_body(self) -> B {
        self.body
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

impl Response<Bytes> {
    /// Decode the body as an [`Envelope`].
    ///
    /// An empty body decodes to [`Envelope::default`], which classifies as
    /// success since its `code` is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not a JSON object.
    pub fn envelope(&self) -> crate::Result<Envelope> {
        if self.body.is_empty() {
            return Ok(Envelope::default());
        }
        crate::from_json(&self.body)
    }

    /// Decode the body as an [`Envelope`], keeping mistyped fields in `extra`.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not JSON.
    pub fn lenient_envelope(&self) -> crate::Result<Envelope> {
        if self.body.is_empty() {
            return Ok(Envelope::default());
        }
        crate::from_json(&self.body).map(Envelope::from_value)
    }

    /// Converts a non-2xx response into the matching transport error.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Http`] carrying the status and body when the
    /// status is outside 2xx.
    pub fn error_for_status(self) -> crate::Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let reason = http::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("Unknown Status");
        Err(crate::Error::http_with_body(self.status, reason, self.body))
    }
}
