//! Prelude module for convenient imports.
//!
//! ```ignore
//! use turnstile_core::prelude::*;
//! ```

pub use crate::{
    CredentialSource, Envelope, Error, Method, Notifier, Outcome, Rejection, Request,
    RequestBuilder, Response, Result, SessionController,
};
