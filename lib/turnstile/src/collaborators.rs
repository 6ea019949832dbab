//! Ready-made collaborators.
//!
//! Real applications plug in their own UI and session handling; these cover
//! the headless cases (services, CLIs, tests).

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info, warn};

use crate::{Callback, CredentialSource, Notifier, SessionController};

/// A token fixed at construction.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wraps `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CredentialSource for StaticToken {
    fn token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// A token slot shared between the interceptor and the code that signs in.
///
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct SharedToken {
    slot: Arc<RwLock<Option<String>>>,
}

impl SharedToken {
    /// Store a token, e.g. after a successful login.
    pub fn set(&self, token: impl Into<String>) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    /// Forget the token.
    pub fn clear(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl CredentialSource for SharedToken {
    fn token(&self) -> Option<String> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Headless notifier that writes to `tracing`.
///
/// Confirmations cannot be answered without a user, so they are dismissed
/// on the spot.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn confirm(&self, message: &str, _on_accept: Callback, on_dismiss: Callback) {
        info!(%message, "confirmation requested, dismissing");
        on_dismiss();
    }

    fn announce(&self, message: &str) {
        warn!(%message, "announce");
    }

    fn dismiss_all(&self) {
        debug!("dismiss all");
    }
}

/// Session controller for applications without a login flow.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSession;

impl SessionController for NoopSession {
    fn force_logout(&self) {
        warn!("logout requested but no session controller is configured");
    }
}
