//! Outbound request descriptor.
//!
//! Besides method, URL, headers and body, every [`Request`] carries
//! [`RequestOptions`] that steer the interceptor: `no_token` skips bearer
//! injection, `never_cancel` keeps the request out of duplicate suppression.
//!
//! # Example
//!
//! ```
//! use turnstile_core::{Method, Request};
//!
//! let request: Request = Request::builder(Method::POST, "https://example.com/api/orders".parse().unwrap())
//!     .header("Accept", "application/json")
//!     .never_cancel()
//!     .build();
//!
//! assert_eq!(request.key().as_str(), "/api/orders");
//! assert!(request.options().never_cancel);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::Method;

/// Identity used for duplicate suppression: the URL path, nothing else.
///
/// Method, query string and body are deliberately ignored, so a `GET` and a
/// `POST` to the same path collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestKey(Arc<str>);

impl RequestKey {
    /// Builds a key from an arbitrary path string.
    #[must_use]
    pub fn new(path: impl AsRef<str>) -> Self {
        Self(Arc::from(path.as_ref()))
    }

    /// Builds the key of a URL.
    #[must_use]
    pub fn from_url(url: &url::Url) -> Self {
        Self::new(url.path())
    }

    /// The path this key stands for.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-request interceptor switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Do not attach the `Authorization` header.
    pub no_token: bool,
    /// Never register with (or be cancelled by) duplicate suppression.
    pub never_cancel: bool,
}

/// An HTTP request with method, URL, headers, optional body and options.
#[derive(Debug, Clone)]
pub struct Request<B = Bytes> {
    method: Method,
    url: url::Url,
    headers: HashMap<String, String>,
    body: Option<B>,
    options: RequestOptions,
}

impl<B> Request<B> {
    /// Creates a new [`RequestBuilder`].
    #[must_use]
    pub fn builder(method: Method, url: url::Url) -> RequestBuilder<B> {
        RequestBuilder::new(method, url)
    }

    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Dedup key of this request.
    #[must_use]
    pub fn key(&self) -> RequestKey {
        RequestKey::from_url(&self.url)
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Mutable access to headers.
    #[must_use]
    pub fn headers_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.headers
    }

    /// Single header value by name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Sets a header unless one with the same (case-insensitive) name exists.
    ///
    /// Returns whether the header was inserted.
    pub fn set_default_header(&mut self, name: &str, value: &str) -> bool {
        let present = self
            .headers
            .keys()
            .any(|existing| existing.eq_ignore_ascii_case(name));
        if !present {
            self.headers.insert(name.to_string(), value.to_string());
        }
        !present
    }

    /// Sets a header, replacing any existing one whose name matches ignoring case.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers
            .retain(|existing, _| !existing.eq_ignore_ascii_case(name));
        self.headers.insert(name.to_string(), value.into());
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&B> {
        self.body.as_ref()
    }

    /// Interceptor options.
    #[must_use]
    pub const fn options(&self) -> RequestOptions {
        self.options
    }

    /// Consume into (method, url, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (Method, url::Url, HashMap<String, String>, Option<B>) {
        (self.method, self.url, self.headers, self.body)
    }
}

/// Builder for constructing [`Request`] instances.
#[derive(Debug, Clone)]
pub struct RequestBuilder<B = Bytes> {
    method: Method,
    url: url::Url,
    headers: HashMap<String, String>,
    body: Option<B>,
    options: RequestOptions,
}

impl<B> RequestBuilder<B> {
    /// Creates a new builder.
    #[must_use]
    pub fn new(method: Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: HashMap::new(),
            body: None,
            options: RequestOptions::default(),
        }
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Appends a query parameter to the URL.
    #[must_use]
    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(name, value);
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: B) -> Self {
        self.body = Some(body);
        self
    }

    /// Skip bearer token injection for this request.
    #[must_use]
    pub const fn no_token(mut self) -> Self {
        self.options.no_token = true;
        self
    }

    /// Exclude this request from duplicate suppression.
    #[must_use]
    pub const fn never_cancel(mut self) -> Self {
        self.options.never_cancel = true;
        self
    }

    /// Replace all options at once.
    #[must_use]
    pub const fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request<B> {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
            options: self.options,
        }
    }
}

impl RequestBuilder<Bytes> {
    /// Set a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn json<T: serde::Serialize>(self, value: &T) -> crate::Result<Self> {
        let body = crate::to_json(value)?;
        Ok(self
            .header("Content-Type", crate::ContentType::Json.as_str())
            .body(body))
    }

    /// Set a form-urlencoded body.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn form<T: serde::Serialize>(self, value: &T) -> crate::Result<Self> {
        let body = crate::to_form(value)?;
        Ok(self
            .header("Content-Type", crate::ContentType::FormUrlEncoded.as_str())
            .body(body))
    }
}
