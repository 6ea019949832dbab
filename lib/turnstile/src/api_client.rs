//! Base-URL API client with the interceptor pre-installed.
//!
//! [`ApiClient`] wraps an intercepted transport with a base URL and a set of
//! default headers. Callers pass paths relative to the base; the dedup key and
//! the auth-endpoint comparison both use the resolved URL path.

use std::borrow::Cow;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use tower::util::BoxCloneService;
use tower::{Layer, Service};
use url::Url;

use crate::config::{InterceptorConfig, TransportConfig};
use crate::interceptor::{
    InterceptedFuture, Interceptor, InterceptorBuilder, InterceptorLayer, PendingRegistry,
};
use crate::transport::HyperTransport;
use crate::{
    ContentType, CredentialSource, Envelope, Error, Messages, Method, Notifier, Rejection, Request,
    RequestBuilder, Response, Result, SessionController,
};

/// Type-erased intercepted service.
pub type BoxedService = BoxCloneService<Request<Bytes>, Envelope, Rejection>;

/// Thread-safe wrapper for [`BoxedService`].
#[derive(Clone)]
struct SyncService {
    inner: Arc<Mutex<BoxedService>>,
}

impl SyncService {
    fn new(service: BoxedService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    /// Dispatch happens inside `call`, so admission order is call order.
    fn call(&self, request: Request<Bytes>) -> InterceptedFuture {
        let mut service = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        service.call(request)
    }
}

/// HTTP client that runs every request through the interceptor.
///
/// Cheap to clone; clones share the transport, the registry and the
/// collaborators.
///
/// # Example
///
/// ```ignore
/// use turnstile::{ApiClient, SharedToken};
///
/// let token = SharedToken::default();
/// let client = ApiClient::builder("https://example.com/api")
///     .credentials(token.clone())
///     .build()?;
///
/// let envelope = client.get("/users?page=1").await?;
/// let users: Vec<User> = envelope.data_as()?;
/// ```
#[derive(Clone)]
pub struct ApiClient {
    service: SyncService,
    base_url: Url,
    default_headers: Vec<(String, String)>,
    interceptor: Arc<Interceptor>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("default_headers", &self.default_headers)
            .field("interceptor", &self.interceptor)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new builder for the given base URL.
    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder::new(base_url)
    }

    /// The base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The interceptor shared by all clones.
    #[must_use]
    pub fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }

    /// Requests currently in flight under duplicate suppression.
    #[must_use]
    pub fn registry(&self) -> &PendingRegistry {
        self.interceptor.registry()
    }

    /// Resolve a base-relative path (optionally with `?query`) to a URL.
    ///
    /// Absolute URLs are used as-is.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Url {
        if let Ok(absolute) = Url::parse(path) {
            return absolute;
        }

        let (path, query) = path
            .split_once('?')
            .map_or((path, None), |(path, query)| (path, Some(query)));

        let mut url = self.base_url.clone();
        url.set_path(&join_path(self.base_url.path(), path));
        url.set_query(query);
        url
    }

    /// Start a request against a base-relative path.
    #[must_use]
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder<Bytes> {
        Request::builder(method, self.resolve(path))
    }

    /// Send a fully built request.
    ///
    /// The request is admitted (and any in-flight duplicate cancelled) before
    /// this returns; the transport runs when the future is polled.
    ///
    /// # Errors
    ///
    /// Every outcome except success resolves to a [`Rejection`].
    pub fn send(&self, mut request: Request<Bytes>) -> InterceptedFuture {
        for (name, value) in &self.default_headers {
            request.set_default_header(name, value);
        }
        self.service.call(request)
    }

    /// `GET` a base-relative path.
    pub fn get(&self, path: &str) -> InterceptedFuture {
        self.send(self.request(Method::GET, path).build())
    }

    /// `DELETE` a base-relative path.
    pub fn delete(&self, path: &str) -> InterceptedFuture {
        self.send(self.request(Method::DELETE, path).build())
    }

    /// `POST` a JSON body.
    pub fn post_json<T: Serialize>(&self, path: &str, body: &T) -> InterceptedFuture {
        self.send_built(self.request(Method::POST, path).json(body))
    }

    /// `PUT` a JSON body.
    pub fn put_json<T: Serialize>(&self, path: &str, body: &T) -> InterceptedFuture {
        self.send_built(self.request(Method::PUT, path).json(body))
    }

    /// `POST` a form-urlencoded body.
    pub fn post_form<T: Serialize>(&self, path: &str, body: &T) -> InterceptedFuture {
        self.send_built(self.request(Method::POST, path).form(body))
    }

    fn send_built(&self, builder: Result<RequestBuilder<Bytes>>) -> InterceptedFuture {
        match builder {
            Ok(builder) => self.send(builder.build()),
            Err(error) => {
                let rejection = self.interceptor.classifier().reject(error);
                Box::pin(std::future::ready(Err(rejection)))
            }
        }
    }
}

/// Concatenate a base path and a relative path with exactly one `/` between.
fn join_path(base: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return base.to_string();
    }
    format!("{}/{path}", base.trim_end_matches('/'))
}

/// Builder for [`ApiClient`].
///
/// Every request gets `Content-Type: application/json;charset=utf-8` unless it
/// sets its own. `auth_endpoint` paths are resolved against the base URL path, like every
/// other request path.
pub struct ApiClientBuilder {
    base_url: String,
    transport: TransportConfig,
    config: InterceptorConfig,
    interceptor: InterceptorBuilder,
    default_headers: Vec<(String, String)>,
}

impl std::fmt::Debug for ApiClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClientBuilder")
            .field("base_url", &self.base_url)
            .field("transport", &self.transport)
            .field("config", &self.config)
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

impl ApiClientBuilder {
    /// Creates a builder with default configuration.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            transport: TransportConfig::default(),
            config: InterceptorConfig::default(),
            interceptor: Interceptor::builder(),
            default_headers: vec![(
                http::header::CONTENT_TYPE.to_string(),
                ContentType::JsonUtf8.as_str().to_string(),
            )],
        }
    }

    /// Set the whole-request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.transport.timeout = timeout;
        self
    }

    /// Set the TCP connect timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.transport.connect_timeout = timeout;
        self
    }

    /// Replace the transport configuration.
    #[must_use]
    pub fn transport_config(mut self, config: TransportConfig) -> Self {
        self.transport = config;
        self
    }

    /// Replace the interceptor configuration.
    #[must_use]
    pub fn interceptor_config(mut self, config: InterceptorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the business success code.
    #[must_use]
    pub const fn success_sentinel(mut self, sentinel: i64) -> Self {
        self.config.success_sentinel = sentinel;
        self
    }

    /// Enable or disable the re-authentication prompt.
    #[must_use]
    pub const fn auth_expiry_enabled(mut self, enabled: bool) -> Self {
        self.config.auth_expiry_enabled = enabled;
        self
    }

    /// Set the token endpoint exempt from classification.
    #[must_use]
    pub fn auth_endpoint(mut self, path: impl Into<Cow<'static, str>>) -> Self {
        self.config.auth_endpoint = Some(path.into());
        self
    }

    /// Set the message catalog.
    #[must_use]
    pub fn messages(mut self, messages: Messages) -> Self {
        self.config.messages = messages;
        self
    }

    /// Set where bearer tokens come from.
    #[must_use]
    pub fn credentials(mut self, source: impl CredentialSource + 'static) -> Self {
        self.interceptor = self.interceptor.credentials(source);
        self
    }

    /// Set the modal/message display.
    #[must_use]
    pub fn notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.interceptor = self.interceptor.notifier(notifier);
        self
    }

    /// Set the logout hook.
    #[must_use]
    pub fn session(mut self, session: impl SessionController + 'static) -> Self {
        self.interceptor = self.interceptor.session(session);
        self
    }

    /// Add a header sent unless the request sets it already.
    ///
    /// Replaces an earlier default with the same name.
    #[must_use]
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.default_headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.default_headers.push((name, value.into()));
        self
    }

    /// Build a client over [`HyperTransport`].
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot be parsed.
    pub fn build(self) -> Result<ApiClient> {
        let transport = HyperTransport::with_config(self.transport.clone());
        self.build_with(transport)
    }

    /// Build a client over a custom transport service.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot be parsed.
    pub fn build_with<S>(self, transport: S) -> Result<ApiClient>
    where
        S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>
            + Clone
            + Send
            + 'static,
        S::Future: Send + 'static,
    {
        let base_url = Url::parse(&self.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::invalid_request(format!(
                "not a base URL: {base_url}"
            )));
        }

        let mut config = self.config;
        config.auth_endpoint = config
            .auth_endpoint
            .map(|endpoint| Cow::Owned(join_path(base_url.path(), &endpoint)));

        let interceptor = Arc::new(self.interceptor.config(config).build());
        let service = InterceptorLayer::new(Arc::clone(&interceptor)).layer(transport);

        Ok(ApiClient {
            service: SyncService::new(BoxCloneService::new(service)),
            base_url,
            default_headers: self.default_headers,
            interceptor,
        })
    }
}
