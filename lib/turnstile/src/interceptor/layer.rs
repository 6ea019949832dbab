//! Tower layer wiring the dispatcher and classifier around a transport.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use tower::{Layer, Service};
use tracing::{Instrument, Level, span};

use super::Interceptor;
use super::dispatcher::Dispatched;
use crate::{Envelope, Error, Rejection, Request, Response};

/// Future returned by [`Intercepted`].
pub type InterceptedFuture = Pin<Box<dyn Future<Output = Result<Envelope, Rejection>> + Send>>;

/// Layer that runs requests through an [`Interceptor`].
///
/// The wrapped service is the transport; the resulting service resolves with
/// an [`Envelope`] or rejects with a [`Rejection`].
///
/// # Example
///
/// ```ignore
/// use turnstile::{HyperTransport, Interceptor};
/// use tower::ServiceBuilder;
///
/// let service = ServiceBuilder::new()
///     .layer(Interceptor::builder().build().into_layer())
///     .service(HyperTransport::new());
/// ```
#[derive(Debug, Clone)]
pub struct InterceptorLayer {
    interceptor: Arc<Interceptor>,
}

impl InterceptorLayer {
    /// Layer over a shared interceptor.
    #[must_use]
    pub const fn new(interceptor: Arc<Interceptor>) -> Self {
        Self { interceptor }
    }
}

impl<S> Layer<S> for InterceptorLayer {
    type Service = Intercepted<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Intercepted {
            inner,
            interceptor: Arc::clone(&self.interceptor),
        }
    }
}

/// Service produced by [`InterceptorLayer`].
#[derive(Debug, Clone)]
pub struct Intercepted<S> {
    inner: S,
    interceptor: Arc<Interceptor>,
}

impl<S> Intercepted<S> {
    /// The interceptor driving this service.
    #[must_use]
    pub fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }
}

impl<S> Service<Request<Bytes>> for Intercepted<S>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Envelope;
    type Error = Rejection;
    type Future = InterceptedFuture;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Rejection>> {
        self.inner
            .poll_ready(cx)
            .map_err(|error| self.interceptor.classifier().reject(error))
    }

    /// Admission and header injection happen here, synchronously; the
    /// transport call starts when the returned future is first polled.
    /// Dropping the future before it settles releases the admission.
    fn call(&mut self, mut request: Request<Bytes>) -> Self::Future {
        let key = request.key();
        let span = span!(Level::INFO, "http_request", method = %request.method(), %key);
        let dispatched = self.interceptor.dispatcher().dispatch(&mut request);

        let interceptor = Arc::clone(&self.interceptor);
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(
            async move {
                let (lease, result) = match dispatched {
                    Some(Dispatched { lease, signal, .. }) => {
                        let result = tokio::select! {
                            reason = signal.cancelled() => Err(Error::cancelled(reason)),
                            result = inner.call(request) => result,
                        };
                        (Some(lease), result)
                    }
                    None => (None, inner.call(request).await),
                };

                interceptor.classifier().settle(&key, lease, result)
            }
            .instrument(span),
        )
    }
}
