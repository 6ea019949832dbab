//! Outbound half of the pipeline.

use std::sync::Arc;

use tracing::{debug, info};

use super::registry::{CancelSignal, Canceller, Lease, PendingRegistry};
use crate::{CredentialSource, Request};

/// Header carrying the bearer token.
pub const AUTHORIZATION: &str = "Authorization";

/// Registration of a dispatched request with the registry.
#[derive(Debug)]
pub struct Dispatched {
    /// Registry entry, released when the request settles or is dropped.
    pub lease: Lease,
    /// Fires when a newer duplicate cancels this request.
    pub signal: CancelSignal,
    /// Whether admitting this request cancelled an earlier one.
    pub superseded: bool,
}

/// Prepares each outgoing request: duplicate suppression, then bearer auth.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<PendingRegistry>,
    credentials: Option<Arc<dyn CredentialSource>>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("credentials", &self.credentials.is_some())
            .finish()
    }
}

impl Dispatcher {
    /// Creates a dispatcher over a shared registry.
    #[must_use]
    pub fn new(
        registry: Arc<PendingRegistry>,
        credentials: Option<Arc<dyn CredentialSource>>,
    ) -> Self {
        Self {
            registry,
            credentials,
        }
    }

    /// Mutate `request` for transmission.
    ///
    /// Returns `None` for `never_cancel` requests, which stay out of the
    /// registry entirely. Never fails.
    pub fn dispatch<B>(&self, request: &mut Request<B>) -> Option<Dispatched> {
        let options = request.options();

        let dispatched = (!options.never_cancel).then(|| {
            let key = request.key();
            let (canceller, signal) = Canceller::pair();
            let admission = self.registry.admit_or_cancel(key.clone(), canceller);
            if admission.superseded {
                info!(%key, "cancelled in-flight duplicate");
                crate::observe::duplicate_suppressed();
            } else {
                debug!(%key, "admitted");
            }
            crate::observe::pending(self.registry.len());
            Dispatched {
                lease: Lease::new(Arc::clone(&self.registry), admission.ticket),
                signal,
                superseded: admission.superseded,
            }
        });

        if !options.no_token
            && let Some(token) = self.credentials.as_ref().and_then(|source| source.token())
        {
            request.set_header(AUTHORIZATION, format!("Bearer {token}"));
        }

        dispatched
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::Method;

    fn request(path: &str) -> turnstile_core::RequestBuilder<Bytes> {
        let url = url::Url::parse(&format!("https://h.test{path}")).expect("url");
        Request::builder(Method::GET, url)
    }

    fn dispatcher(token: Option<&str>) -> (Dispatcher, Arc<PendingRegistry>) {
        let registry = Arc::new(PendingRegistry::new());
        let token = token.map(str::to_string);
        let source: Arc<dyn CredentialSource> = Arc::new(move || token.clone());
        (Dispatcher::new(Arc::clone(&registry), Some(source)), registry)
    }

    #[test]
    fn injects_bearer_header() {
        let (dispatcher, _registry) = dispatcher(Some("abc"));
        let mut request = request("/api/users").build();

        dispatcher.dispatch(&mut request);

        assert_eq!(request.header(AUTHORIZATION), Some("Bearer abc"));
    }

    #[test]
    fn no_token_skips_header() {
        let (dispatcher, _registry) = dispatcher(Some("abc"));
        let mut request = request("/api/users").no_token().build();

        dispatcher.dispatch(&mut request);

        assert!(request.header(AUTHORIZATION).is_none());
    }

    #[test]
    fn absent_token_skips_header() {
        let (dispatcher, _registry) = dispatcher(None);
        let mut request = request("/api/users").build();

        dispatcher.dispatch(&mut request);

        assert!(request.header(AUTHORIZATION).is_none());
    }

    #[test]
    fn registers_by_path() {
        let (dispatcher, registry) = dispatcher(None);
        let mut request = request("/api/users?page=1").build();

        let dispatched = dispatcher.dispatch(&mut request).expect("registered");

        assert_eq!(dispatched.lease.ticket().key().as_str(), "/api/users");
        assert!(registry.contains(dispatched.lease.ticket().key()));
    }

    #[test]
    fn never_cancel_skips_registry() {
        let (dispatcher, registry) = dispatcher(Some("abc"));
        let mut request = request("/api/upload").never_cancel().build();

        assert!(dispatcher.dispatch(&mut request).is_none());
        assert!(registry.is_empty());
        assert_eq!(request.header(AUTHORIZATION), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn second_dispatch_cancels_first() {
        let (dispatcher, registry) = dispatcher(None);
        let mut first = request("/api/submit").build();
        let mut second = request("/api/submit").build();

        let first = dispatcher.dispatch(&mut first).expect("first");
        let second = dispatcher.dispatch(&mut second).expect("second");

        assert_eq!(first.signal.cancelled().await, "duplicate request suppressed");
        assert_eq!(registry.len(), 1);
        assert!(second.superseded);
        assert!(second.lease.release());
    }

    #[test]
    fn replaces_caller_authorization_in_any_case() {
        let (dispatcher, _registry) = dispatcher(Some("abc"));
        let mut request = request("/api/users")
            .header("authorization", "Basic xyz")
            .build();

        dispatcher.dispatch(&mut request);

        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.header(AUTHORIZATION), Some("Bearer abc"));
    }

    #[test]
    fn no_token_keeps_caller_authorization() {
        let (dispatcher, _registry) = dispatcher(Some("abc"));
        let mut request = request("/api/users")
            .header("authorization", "Basic xyz")
            .no_token()
            .build();

        dispatcher.dispatch(&mut request);

        assert_eq!(request.header("authorization"), Some("Basic xyz"));
    }

    #[test]
    fn dropping_dispatched_frees_key() {
        let (dispatcher, registry) = dispatcher(None);
        let mut first = request("/api/submit").build();
        let mut second = request("/api/submit").build();

        drop(dispatcher.dispatch(&mut first));
        assert!(registry.is_empty());

        let second = dispatcher.dispatch(&mut second).expect("second");
        assert!(!second.superseded);
    }
}
