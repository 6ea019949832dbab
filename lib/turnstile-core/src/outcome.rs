//! Classified results of an intercepted request.

use derive_more::{Display, Error};

use crate::{Envelope, Error};

/// The single result the classifier produces for a settled request.
#[derive(Debug)]
pub enum Outcome {
    /// Business success; the full envelope (not just `data`) goes to the caller.
    Success(Envelope),
    /// Session expired; a re-authentication prompt is already on screen.
    SilentReject,
    /// Transport failure, already announced to the user.
    UserVisibleReject {
        /// Localized message that was announced.
        message: String,
        /// The original error, for programmatic inspection.
        error: Error,
    },
    /// Well-formed envelope with a non-success code, already announced.
    BusinessError {
        /// Business code returned by the server.
        code: i64,
        /// Server message.
        msg: Option<String>,
    },
}

impl Outcome {
    /// Short label, used for logs and metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::SilentReject => "silent_reject",
            Self::UserVisibleReject { .. } => "user_visible_reject",
            Self::BusinessError { .. } => "business_error",
        }
    }

    /// Settles the outcome: resolve on success, reject otherwise.
    ///
    /// # Errors
    ///
    /// Every outcome other than [`Outcome::Success`] becomes a [`Rejection`].
    pub fn into_result(self) -> Result<Envelope, Rejection> {
        match self {
            Self::Success(envelope) => Ok(envelope),
            Self::SilentReject => Err(Rejection::Silent),
            Self::UserVisibleReject { message, error } => Err(Rejection::Transport {
                message,
                source: error,
            }),
            Self::BusinessError { code, msg } => Err(Rejection::Business { code, msg }),
        }
    }
}

/// Why an intercepted call did not resolve.
///
/// Except for [`Rejection::Aborted`], the user has already been told (by a
/// modal or a transient message) by the time a caller sees this.
#[derive(Debug, Display, Error)]
pub enum Rejection {
    /// The session expired and a re-authentication prompt is showing.
    #[display("session expired")]
    Silent,

    /// The server answered with a non-success business code.
    #[display("business error {code}: {}", msg.as_deref().unwrap_or("<no message>"))]
    Business {
        /// Business code.
        code: i64,
        /// Server message.
        msg: Option<String>,
    },

    /// The transport failed.
    #[display("{message}")]
    Transport {
        /// Localized message that was announced.
        message: String,
        /// The original transport error.
        source: Error,
    },

    /// A newer request to the same endpoint replaced this one.
    #[display("aborted: {reason}")]
    Aborted {
        /// Cancellation reason.
        reason: String,
    },
}

impl Rejection {
    /// The original transport error, if any.
    #[must_use]
    pub const fn transport_error(&self) -> Option<&Error> {
        match self {
            Self::Transport { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Returns `true` for a re-authentication rejection.
    #[must_use]
    pub const fn is_silent(&self) -> bool {
        matches!(self, Self::Silent)
    }

    /// Returns `true` when a newer duplicate aborted this request.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}
