//! Prelude module for convenient imports.
//!
//! ```ignore
//! use turnstile::prelude::*;
//! ```

pub use crate::{
    ApiClient, CredentialSource, Envelope, Error, HyperTransport, Interceptor, InterceptorConfig,
    Method, Notifier, Outcome, Rejection, Request, Response, Result, SessionController,
    SharedToken, StaticToken, TracingNotifier,
};
