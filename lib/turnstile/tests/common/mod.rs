//! Shared fixtures for the turnstile integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use turnstile::tower::Service;
use turnstile::{
    Callback, Error, Notifier, Request, Response, SessionController, TransportFuture,
};

/// A confirmation the notifier was asked to show.
pub struct Confirmation {
    pub message: String,
    pub on_accept: Callback,
    pub on_dismiss: Callback,
}

#[derive(Default)]
struct Recorded {
    announcements: Vec<String>,
    confirmations: Vec<Confirmation>,
    dismissals: usize,
}

/// Notifier that records every call; clones share the record.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    recorded: Arc<Mutex<Recorded>>,
}

impl RecordingNotifier {
    pub fn announcements(&self) -> Vec<String> {
        self.recorded.lock().expect("lock").announcements.clone()
    }

    pub fn confirmation_messages(&self) -> Vec<String> {
        self.recorded
            .lock()
            .expect("lock")
            .confirmations
            .iter()
            .map(|confirmation| confirmation.message.clone())
            .collect()
    }

    /// Removes and returns the oldest pending confirmation.
    pub fn take_confirmation(&self) -> Option<Confirmation> {
        let mut recorded = self.recorded.lock().expect("lock");
        (!recorded.confirmations.is_empty()).then(|| recorded.confirmations.remove(0))
    }

    pub fn dismissals(&self) -> usize {
        self.recorded.lock().expect("lock").dismissals
    }
}

impl Notifier for RecordingNotifier {
    fn confirm(&self, message: &str, on_accept: Callback, on_dismiss: Callback) {
        self.recorded
            .lock()
            .expect("lock")
            .confirmations
            .push(Confirmation {
                message: message.to_string(),
                on_accept,
                on_dismiss,
            });
    }

    fn announce(&self, message: &str) {
        self.recorded
            .lock()
            .expect("lock")
            .announcements
            .push(message.to_string());
    }

    fn dismiss_all(&self) {
        self.recorded.lock().expect("lock").dismissals += 1;
    }
}

/// Session controller counting forced logouts.
#[derive(Clone, Default)]
pub struct CountingSession {
    logouts: Arc<AtomicUsize>,
}

impl CountingSession {
    pub fn logouts(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }
}

impl SessionController for CountingSession {
    fn force_logout(&self) {
        self.logouts.fetch_add(1, Ordering::SeqCst);
    }
}

/// A 2xx response carrying `body` as JSON.
pub fn json_response(body: &serde_json::Value) -> Response<Bytes> {
    status_response(200, body)
}

/// A response with the given status carrying `body` as JSON.
pub fn status_response(status: u16, body: &serde_json::Value) -> Response<Bytes> {
    Response::new(
        status,
        HashMap::from([("content-type".to_string(), "application/json".to_string())]),
        Bytes::from(body.to_string()),
    )
}

type Responder = dyn Fn(&Request<Bytes>) -> turnstile::Result<Response<Bytes>> + Send + Sync;

/// In-memory transport: answers through a closure, records every request.
#[derive(Clone)]
pub struct MockTransport {
    respond: Arc<Responder>,
    seen: Arc<Mutex<Vec<Request<Bytes>>>>,
    delay: Duration,
}

impl MockTransport {
    pub fn new(
        respond: impl Fn(&Request<Bytes>) -> turnstile::Result<Response<Bytes>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Arc::new(respond),
            seen: Arc::default(),
            delay: Duration::ZERO,
        }
    }

    /// Always answers 200 with `body`.
    pub fn json(body: serde_json::Value) -> Self {
        Self::new(move |_| Ok(json_response(&body)))
    }

    /// Hold every response for `delay` before answering.
    #[must_use]
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn seen(&self) -> Vec<Request<Bytes>> {
        self.seen.lock().expect("lock").clone()
    }
}

impl Service<Request<Bytes>> for MockTransport {
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = TransportFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<turnstile::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let result = (self.respond)(&request);
        self.seen.lock().expect("lock").push(request);
        let delay = self.delay;
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            result
        })
    }
}
