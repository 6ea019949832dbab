//! HTTP request interceptor.
//!
//! Every request sent through an [`ApiClient`] (or any service wrapped in an
//! [`InterceptorLayer`]) is:
//!
//! 1. admitted to the [`PendingRegistry`], cancelling an in-flight request
//!    to the same URL path unless marked `never_cancel`
//! 2. signed with `Authorization: Bearer <token>` unless marked `no_token`
//! 3. classified on completion into exactly one [`Outcome`]: success,
//!    silent rejection (re-authentication prompted), user-visible rejection
//!    (message announced) or business error
//!
//! # Example
//!
//! ```ignore
//! use turnstile::prelude::*;
//!
//! let token = SharedToken::default();
//! let client = ApiClient::builder("https://example.com/api")
//!     .credentials(token.clone())
//!     .session(|| println!("signed out"))
//!     .build()?;
//!
//! match client.get("/orders").await {
//!     Ok(envelope) => println!("{:?}", envelope.data),
//!     Err(Rejection::Aborted { .. }) => {} // superseded by a newer call
//!     Err(rejection) => eprintln!("{rejection}"),
//! }
//! ```

mod api_client;
mod collaborators;
mod config;
pub mod interceptor;
mod observe;
pub mod prelude;
mod transport;

// Re-export client types
pub use api_client::{ApiClient, ApiClientBuilder, BoxedService};
pub use collaborators::{NoopSession, SharedToken, StaticToken, TracingNotifier};
pub use config::{
    DEFAULT_AUTH_ENDPOINT, DUPLICATE_REASON, InterceptorConfig, InterceptorConfigBuilder,
    TransportConfig, TransportConfigBuilder,
};
pub use interceptor::{Interceptor, InterceptorBuilder, InterceptorLayer, PendingRegistry};
pub use transport::{HyperTransport, TransportFuture};

// Re-export tower for layer composition
pub use tower;

// Re-export core types
pub use turnstile_core::{
    Callback, ContentType, CredentialSource, Envelope, Error, ErrorTranslator, Messages, Method,
    Notifier, Outcome, Rejection, Request, RequestBuilder, RequestKey, RequestOptions, Response,
    Result, SessionController, StatusCode, Translation, from_json, header, to_form, to_json,
};
