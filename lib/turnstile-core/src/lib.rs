//! Core types and traits for the turnstile request interceptor.
//!
//! This crate provides the transport-agnostic pieces:
//! - [`Request`], [`RequestBuilder`], [`RequestOptions`] and [`RequestKey`]
//! - [`Response`] - raw transport response
//! - [`Envelope`] - the `{ code, msg, data, token }` business wrapper
//! - [`Outcome`] and [`Rejection`] - classified results
//! - [`Error`] and [`Result`] - transport-level errors
//! - [`ErrorTranslator`] and [`Messages`] - user-facing error text
//! - [`CredentialSource`], [`Notifier`], [`SessionController`] - collaborators

mod body;
mod collaborator;
mod envelope;
mod error;
mod outcome;
pub mod prelude;
mod request;
mod response;
mod translate;

pub use body::{ContentType, from_json, to_form, to_json};
pub use collaborator::{Callback, CredentialSource, Notifier, SessionController};
pub use envelope::Envelope;
pub use error::{Error, Result};
pub use outcome::{Outcome, Rejection};
pub use request::{Request, RequestBuilder, RequestKey, RequestOptions};
pub use response::Response;
pub use translate::{ErrorTranslator, Messages, Translation};

// Re-export http crate types for methods, status codes and headers
pub use http::{Method, StatusCode, header};
