//! Transport and interceptor configuration.

use std::borrow::Cow;
use std::time::Duration;

use turnstile_core::Messages;

/// Reason handed to the canceller of a superseded request.
pub const DUPLICATE_REASON: &str = "duplicate request suppressed";

/// Default token-issuance path, exempt from envelope classification.
pub const DEFAULT_AUTH_ENDPOINT: &str = "/auth/oauth/token";

/// Configuration for [`crate::HyperTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Whole-request deadline.
    pub timeout: Duration,
    /// TCP connect deadline.
    pub connect_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_idle_per_host: usize,
    /// Idle connection timeout.
    pub pool_idle_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            pool_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

impl TransportConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::default()
    }
}

/// Builder for [`TransportConfig`].
#[derive(Debug, Clone, Default)]
pub struct TransportConfigBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    pool_idle_per_host: Option<usize>,
    pool_idle_timeout: Option<Duration>,
}

impl TransportConfigBuilder {
    /// Set the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the maximum idle connections per host.
    #[must_use]
    pub const fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.pool_idle_per_host = Some(count);
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub const fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> TransportConfig {
        let defaults = TransportConfig::default();
        TransportConfig {
            timeout: self.timeout.unwrap_or(defaults.timeout),
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            pool_idle_per_host: self
                .pool_idle_per_host
                .unwrap_or(defaults.pool_idle_per_host),
            pool_idle_timeout: self.pool_idle_timeout.unwrap_or(defaults.pool_idle_timeout),
        }
    }
}

/// Behaviour of the interceptor pipeline.
///
/// Backends disagree on the business success code (`0` vs `200`) and on
/// whether a 401 envelope should prompt for re-authentication; both are
/// explicit here.
#[derive(Debug, Clone)]
pub struct InterceptorConfig {
    /// Envelope `code` meaning success. Default `0`.
    pub success_sentinel: i64,
    /// Prompt for re-authentication on envelope 401 and HTTP 424. Default `true`.
    pub auth_expiry_enabled: bool,
    /// Path whose responses bypass classification. Default `/auth/oauth/token`.
    pub auth_endpoint: Option<Cow<'static, str>>,
    /// Reason passed to the canceller of a superseded duplicate.
    pub duplicate_reason: Cow<'static, str>,
    /// User-facing strings.
    pub messages: Messages,
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self {
            success_sentinel: 0,
            auth_expiry_enabled: true,
            auth_endpoint: Some(Cow::Borrowed(DEFAULT_AUTH_ENDPOINT)),
            duplicate_reason: Cow::Borrowed(DUPLICATE_REASON),
            messages: Messages::default(),
        }
    }
}

impl InterceptorConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> InterceptorConfigBuilder {
        InterceptorConfigBuilder::default()
    }

    /// Whether `path` is the exempt token endpoint.
    #[must_use]
    pub fn is_auth_endpoint(&self, path: &str) -> bool {
        self.auth_endpoint
            .as_deref()
            .is_some_and(|endpoint| endpoint == path)
    }
}

/// Builder for [`InterceptorConfig`].
#[derive(Debug, Clone, Default)]
pub struct InterceptorConfigBuilder {
    success_sentinel: Option<i64>,
    auth_expiry_enabled: Option<bool>,
    auth_endpoint: Option<Option<Cow<'static, str>>>,
    duplicate_reason: Option<Cow<'static, str>>,
    messages: Option<Messages>,
}

impl InterceptorConfigBuilder {
    /// Set the business success code.
    #[must_use]
    pub const fn success_sentinel(mut self, sentinel: i64) -> Self {
        self.success_sentinel = Some(sentinel);
        self
    }

    /// Enable or disable the re-authentication prompt.
    #[must_use]
    pub const fn auth_expiry_enabled(mut self, enabled: bool) -> Self {
        self.auth_expiry_enabled = Some(enabled);
        self
    }

    /// Set the exempt token endpoint path.
    #[must_use]
    pub fn auth_endpoint(mut self, path: impl Into<Cow<'static, str>>) -> Self {
        self.auth_endpoint = Some(Some(path.into()));
        self
    }

    /// Classify every endpoint, including token issuance.
    #[must_use]
    pub fn without_auth_endpoint(mut self) -> Self {
        self.auth_endpoint = Some(None);
        self
    }

    /// Set the duplicate cancellation reason.
    #[must_use]
    pub fn duplicate_reason(mut self, reason: impl Into<Cow<'static, str>>) -> Self {
        self.duplicate_reason = Some(reason.into());
        self
    }

    /// Set the message catalog.
    #[must_use]
    pub fn messages(mut self, messages: Messages) -> Self {
        self.messages = Some(messages);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> InterceptorConfig {
        let defaults = InterceptorConfig::default();
        InterceptorConfig {
            success_sentinel: self.success_sentinel.unwrap_or(defaults.success_sentinel),
            auth_expiry_enabled: self
                .auth_expiry_enabled
                .unwrap_or(defaults.auth_expiry_enabled),
            auth_endpoint: self.auth_endpoint.unwrap_or(defaults.auth_endpoint),
            duplicate_reason: self.duplicate_reason.unwrap_or(defaults.duplicate_reason),
            messages: self.messages.unwrap_or(defaults.messages),
        }
    }
}
