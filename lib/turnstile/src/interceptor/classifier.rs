//! Inbound half of the pipeline.
//!
//! Every settled request passes through [`Classifier::settle`] exactly once:
//! the registry entry is released first, then the response or error walks a
//! fixed decision tree ending in one [`Outcome`].

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};

use super::registry::{Lease, PendingRegistry};
use crate::config::InterceptorConfig;
use crate::{
    Envelope, Error, ErrorTranslator, Notifier, Outcome, Rejection, RequestKey, Response,
    SessionController, Translation,
};

/// Envelope code signalling an expired session.
pub const SESSION_EXPIRED_CODE: i64 = 401;

/// Turns responses and transport errors into [`Outcome`]s.
#[derive(Clone)]
pub struct Classifier {
    registry: Arc<PendingRegistry>,
    notifier: Arc<dyn Notifier>,
    session: Arc<dyn SessionController>,
    translator: ErrorTranslator,
    config: InterceptorConfig,
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Classifier {
    /// Creates a classifier over a shared registry.
    #[must_use]
    pub fn new(
        registry: Arc<PendingRegistry>,
        notifier: Arc<dyn Notifier>,
        session: Arc<dyn SessionController>,
        config: InterceptorConfig,
    ) -> Self {
        Self {
            registry,
            notifier,
            session,
            translator: ErrorTranslator::new(config.messages.clone()),
            config,
        }
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &InterceptorConfig {
        &self.config
    }

    /// Release the request and settle it for the caller.
    ///
    /// Non-2xx responses take the failure path, like transport errors. A
    /// request cancelled by a newer duplicate is aborted without
    /// classification or notification.
    ///
    /// # Errors
    ///
    /// Every outcome except success is returned as a [`Rejection`].
    pub fn settle(
        &self,
        key: &RequestKey,
        lease: Option<Lease>,
        result: crate::Result<Response<Bytes>>,
    ) -> Result<Envelope, Rejection> {
        if let Some(lease) = lease {
            let released = lease.release();
            debug!(%key, released, "settled");
            crate::observe::pending(self.registry.len());
        }

        let outcome = match result {
            Err(Error::Cancelled { reason }) => {
                debug!(%key, %reason, "aborted");
                return Err(Rejection::Aborted { reason });
            }
            Err(error) => self.on_error(error),
            Ok(response) => match response.error_for_status() {
                Ok(response) => self.on_response(key, &response),
                Err(error) => self.on_error(error),
            },
        };

        crate::observe::outcome(outcome.label());
        outcome.into_result()
    }

    /// Success path: a 2xx response arrived.
    ///
    /// Auth endpoint bodies are decoded leniently and handed back as they are.
    pub fn on_response(&self, key: &RequestKey, response: &Response<Bytes>) -> Outcome {
        if self.config.is_auth_endpoint(key.as_str()) {
            return match response.lenient_envelope() {
                Ok(envelope) => Outcome::Success(envelope),
                Err(error) => self.on_error(error),
            };
        }

        match response.envelope() {
            Ok(envelope) => self.on_envelope(key, envelope),
            Err(error) => self.on_error(error),
        }
    }

    /// Classify a decoded envelope.
    pub fn on_envelope(&self, key: &RequestKey, envelope: Envelope) -> Outcome {
        if self.config.is_auth_endpoint(key.as_str()) {
            return Outcome::Success(envelope);
        }

        let sentinel = self.config.success_sentinel;
        let code = envelope.code_or(sentinel);

        if code == SESSION_EXPIRED_CODE && self.config.auth_expiry_enabled {
            self.prompt_reauthentication();
            return Outcome::SilentReject;
        }

        if code != sentinel {
            let message = envelope
                .msg
                .clone()
                .unwrap_or_else(|| self.translator.messages().business_fallback(code));
            warn!(%key, code, %message, "business error");
            self.notifier.announce(&message);
            return Outcome::BusinessError {
                code,
                msg: envelope.msg,
            };
        }

        Outcome::Success(envelope)
    }

    /// Failure path: the transport failed or answered non-2xx.
    pub fn on_error(&self, error: Error) -> Outcome {
        self.fail(error).into()
    }

    /// Reject a request that could not even be built.
    #[must_use]
    pub fn reject(&self, error: Error) -> Rejection {
        self.fail(error).into()
    }

    fn fail(&self, error: Error) -> Failure {
        let message = match self.translator.interpret(&error.raw_message()) {
            Translation::ReAuthenticate if self.config.auth_expiry_enabled => {
                self.prompt_reauthentication();
                return Failure::Silent;
            }
            Translation::ReAuthenticate => self
                .translator
                .messages()
                .status_failure(&error.status().unwrap_or_default().to_string()),
            Translation::Notify(message) => message,
        };

        warn!(error = %error, %message, "request failed");
        self.notifier.announce(&message);
        Failure::Visible { message, error }
    }

    fn prompt_reauthentication(&self) {
        info!("session expired, asking the user to sign in again");
        self.notifier.dismiss_all();

        let session = Arc::clone(&self.session);
        let notifier = Arc::clone(&self.notifier);
        self.notifier.confirm(
            &self.translator.messages().session_expired,
            Box::new(move || session.force_logout()),
            Box::new(move || notifier.dismiss_all()),
        );
    }
}

/// Where the failure path ends: it never resolves.
enum Failure {
    Silent,
    Visible { message: String, error: Error },
}

impl From<Failure> for Outcome {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::Silent => Self::SilentReject,
            Failure::Visible { message, error } => Self::UserVisibleReject { message, error },
        }
    }
}

impl From<Failure> for Rejection {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::Silent => Self::Silent,
            Failure::Visible { message, error } => Self::Transport {
                message,
                source: error,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::Callback;

    #[derive(Default)]
    struct Recorder {
        announced: Mutex<Vec<String>>,
        confirmations: Mutex<usize>,
    }

    impl Notifier for Recorder {
        fn announce(&self, message: &str) {
            self.announced
                .lock()
                .expect("lock")
                .push(message.to_string());
        }

        fn confirm(&self, _message: &str, _on_confirm: Callback, _on_cancel: Callback) {
            *self.confirmations.lock().expect("lock") += 1;
        }

        fn dismiss_all(&self) {}
    }

    fn classifier(notifier: &Arc<Recorder>) -> Classifier {
        let notifier: Arc<dyn Notifier> = Arc::clone(notifier) as Arc<dyn Notifier>;
        Classifier::new(
            Arc::new(PendingRegistry::new()),
            notifier,
            Arc::new(|| {}),
            InterceptorConfig::default(),
        )
    }

    #[test]
    fn reject_announces_transport_failures() {
        let notifier = Arc::new(Recorder::default());
        let classifier = classifier(&notifier);

        let rejection = classifier.reject(Error::connection("refused"));

        assert!(matches!(rejection, Rejection::Transport { .. }));
        assert_eq!(notifier.announced.lock().expect("lock").len(), 1);
    }

    #[test]
    fn reject_on_session_expiry_is_silent() {
        let notifier = Arc::new(Recorder::default());
        let classifier = classifier(&notifier);

        let rejection = classifier.reject(Error::http(424, "Failed Dependency"));

        assert!(matches!(rejection, Rejection::Silent));
        assert_eq!(*notifier.confirmations.lock().expect("lock"), 1);
        assert!(notifier.announced.lock().expect("lock").is_empty());
    }

    #[test]
    fn auth_endpoint_accepts_non_integer_code() {
        let notifier = Arc::new(Recorder::default());
        let classifier = classifier(&notifier);
        let response = Response::new(
            200,
            HashMap::new(),
            Bytes::from_static(br#"{"code":"invalid_grant","access_token":"x"}"#),
        );

        let outcome = classifier.on_response(&RequestKey::new("/auth/oauth/token"), &response);

        let Outcome::Success(envelope) = outcome else {
            panic!("expected success, got {}", outcome.label());
        };
        assert_eq!(envelope.code, None);
        assert_eq!(envelope.field("access_token"), Some(serde_json::json!("x")));
        assert!(notifier.announced.lock().expect("lock").is_empty());
    }

    #[test]
    fn other_endpoints_reject_non_integer_code() {
        let notifier = Arc::new(Recorder::default());
        let classifier = classifier(&notifier);
        let response = Response::new(
            200,
            HashMap::new(),
            Bytes::from_static(br#"{"code":"invalid_grant"}"#),
        );

        let outcome = classifier.on_response(&RequestKey::new("/api/users"), &response);

        assert!(matches!(outcome, Outcome::UserVisibleReject { .. }));
    }
}
