//! Narrow interfaces to the world outside the interceptor.
//!
//! - [`CredentialSource`] - where bearer tokens come from
//! - [`Notifier`] - modal and transient-message display
//! - [`SessionController`] - global logout
//!
//! All three are object safe and used as `Arc<dyn ...>`.

/// One-shot callback handed to [`Notifier::confirm`].
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Supplies the current bearer token, if any.
pub trait CredentialSource: Send + Sync {
    /// The token to send, or `None` when signed out.
    fn token(&self) -> Option<String>;
}

impl<F> CredentialSource for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn token(&self) -> Option<String> {
        self()
    }
}

/// Shows modals and transient messages.
pub trait Notifier: Send + Sync {
    /// Show a blocking confirmation.
    ///
    /// Exactly one of the callbacks is invoked, whenever the user decides.
    /// Implementations must not block the caller while waiting.
    fn confirm(&self, message: &str, on_accept: Callback, on_dismiss: Callback);

    /// Show a transient, fire-and-forget message.
    fn announce(&self, message: &str);

    /// Close every open modal.
    fn dismiss_all(&self);
}

/// Ends the user's session.
pub trait SessionController: Send + Sync {
    /// Log out and send the user to re-authenticate.
    fn force_logout(&self);
}

impl<F> SessionController for F
where
    F: Fn() + Send + Sync,
{
    fn force_logout(&self) {
        self();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn closures_are_credential_sources() {
        let source: Arc<dyn CredentialSource> = Arc::new(|| Some("abc".to_string()));
        assert_eq!(source.token().as_deref(), Some("abc"));
    }

    #[test]
    fn closures_are_session_controllers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let session: Arc<dyn SessionController> = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        session.force_logout();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
