//! The interceptor pipeline.
//!
//! An [`Interceptor`] bundles the two halves that share one
//! [`PendingRegistry`]:
//!
//! - [`Dispatcher`] (outbound): duplicate suppression, then bearer auth
//! - [`Classifier`] (inbound): release, then envelope or error classification
//!
//! [`InterceptorLayer`] composes them around any transport service.
//!
//! # Example
//!
//! ```ignore
//! use turnstile::{Interceptor, InterceptorConfig, SharedToken, TracingNotifier};
//!
//! let token = SharedToken::default();
//! let interceptor = Interceptor::builder()
//!     .config(InterceptorConfig::builder().success_sentinel(200).build())
//!     .credentials(token.clone())
//!     .notifier(TracingNotifier)
//!     .session(|| println!("logged out"))
//!     .build();
//! ```

mod classifier;
mod dispatcher;
mod layer;
mod registry;

use std::sync::Arc;

pub use classifier::{Classifier, SESSION_EXPIRED_CODE};
pub use dispatcher::{AUTHORIZATION, Dispatched, Dispatcher};
pub use layer::{Intercepted, InterceptedFuture, InterceptorLayer};
pub use registry::{Admission, CancelSignal, Canceller, Lease, PendingRegistry, Ticket};

use crate::collaborators::{NoopSession, TracingNotifier};
use crate::config::InterceptorConfig;
use crate::{CredentialSource, Notifier, SessionController};

/// Outbound and inbound pipeline sharing one registry.
#[derive(Debug)]
pub struct Interceptor {
    registry: Arc<PendingRegistry>,
    dispatcher: Dispatcher,
    classifier: Classifier,
}

impl Interceptor {
    /// Create a new interceptor builder.
    #[must_use]
    pub fn builder() -> InterceptorBuilder {
        InterceptorBuilder::default()
    }

    /// The pending request registry.
    #[must_use]
    pub fn registry(&self) -> &PendingRegistry {
        &self.registry
    }

    /// The outbound half.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The inbound half.
    #[must_use]
    pub const fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Wrap into a tower layer.
    #[must_use]
    pub fn into_layer(self) -> InterceptorLayer {
        InterceptorLayer::new(Arc::new(self))
    }
}

/// Builder for [`Interceptor`].
///
/// Unset collaborators default to: no credentials, [`TracingNotifier`],
/// [`NoopSession`].
#[derive(Default)]
pub struct InterceptorBuilder {
    config: InterceptorConfig,
    credentials: Option<Arc<dyn CredentialSource>>,
    notifier: Option<Arc<dyn Notifier>>,
    session: Option<Arc<dyn SessionController>>,
}

impl std::fmt::Debug for InterceptorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorBuilder")
            .field("config", &self.config)
            .field("credentials", &self.credentials.is_some())
            .field("notifier", &self.notifier.is_some())
            .field("session", &self.session.is_some())
            .finish()
    }
}

impl InterceptorBuilder {
    /// Set the pipeline configuration.
    #[must_use]
    pub fn config(mut self, config: InterceptorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set where bearer tokens come from.
    #[must_use]
    pub fn credentials(mut self, source: impl CredentialSource + 'static) -> Self {
        self.credentials = Some(Arc::new(source));
        self
    }

    /// Set the modal/message display.
    #[must_use]
    pub fn notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Some(Arc::new(notifier));
        self
    }

    /// Set the logout hook.
    #[must_use]
    pub fn session(mut self, session: impl SessionController + 'static) -> Self {
        self.session = Some(Arc::new(session));
        self
    }

    /// Build the interceptor.
    #[must_use]
    pub fn build(self) -> Interceptor {
        let registry = Arc::new(PendingRegistry::with_reason(
            self.config.duplicate_reason.as_ref(),
        ));
        let notifier: Arc<dyn Notifier> = match self.notifier {
            Some(notifier) => notifier,
            None => Arc::new(TracingNotifier),
        };
        let session: Arc<dyn SessionController> = match self.session {
            Some(session) => session,
            None => Arc::new(NoopSession),
        };

        Interceptor {
            dispatcher: Dispatcher::new(Arc::clone(&registry), self.credentials),
            classifier: Classifier::new(Arc::clone(&registry), notifier, session, self.config),
            registry,
        }
    }
}
