//! Translation of raw transport messages into user-facing text.
//!
//! Rules are applied in order, first match wins:
//!
//! | Raw message | Result |
//! |-------------|--------|
//! | exactly `Network Error` | [`Messages::network_error`] |
//! | contains `timeout` | [`Messages::timeout`] |
//! | contains `Request failed with status code 424` | re-authentication |
//! | contains `Request failed with status code` | [`Messages::status_failure`] with the trailing three characters |
//! | anything else | unchanged |

use std::borrow::Cow;

const NETWORK_ERROR: &str = "Network Error";
const TIMEOUT: &str = "timeout";
const STATUS_PREFIX: &str = "Request failed with status code";
const SESSION_EXPIRED_STATUS: &str = "Request failed with status code 424";

/// Localized strings shown to the user.
///
/// Templates use `{status}` and `{code}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Messages {
    /// Backend unreachable.
    pub network_error: Cow<'static, str>,
    /// Request deadline exceeded.
    pub timeout: Cow<'static, str>,
    /// Non-2xx HTTP status; `{status}` is replaced with the status code.
    pub status_failure: Cow<'static, str>,
    /// Content of the re-authentication confirmation.
    pub session_expired: Cow<'static, str>,
    /// Business error without a server message; `{code}` is replaced.
    pub business_fallback: Cow<'static, str>,
}

impl Default for Messages {
    fn default() -> Self {
        Self::english()
    }
}

impl Messages {
    /// English catalog.
    #[must_use]
    pub const fn english() -> Self {
        Self {
            network_error: Cow::Borrowed("Unable to reach the backend service"),
            timeout: Cow::Borrowed("The request timed out"),
            status_failure: Cow::Borrowed("Backend endpoint error ({status})"),
            session_expired: Cow::Borrowed(
                "Your session has expired. You can stay on this page or sign in again.",
            ),
            business_fallback: Cow::Borrowed("Request failed (code {code})"),
        }
    }

    /// Simplified Chinese catalog.
    #[must_use]
    pub const fn chinese() -> Self {
        Self {
            network_error: Cow::Borrowed("后端接口连接异常"),
            timeout: Cow::Borrowed("系统接口请求超时"),
            status_failure: Cow::Borrowed("系统接口{status}异常"),
            session_expired: Cow::Borrowed(
                "登录状态已过期，您可以继续留在该页面，或者重新登录",
            ),
            business_fallback: Cow::Borrowed("请求失败（错误码 {code}）"),
        }
    }

    /// Renders [`Messages::status_failure`] for a status.
    #[must_use]
    pub fn status_failure(&self, status: &str) -> String {
        self.status_failure.replace("{status}", status)
    }

    /// Renders [`Messages::business_fallback`] for a code.
    #[must_use]
    pub fn business_fallback(&self, code: i64) -> String {
        self.business_fallback.replace("{code}", &code.to_string())
    }
}

/// What a raw transport message turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// The session is gone; prompt for re-authentication instead of a message.
    ReAuthenticate,
    /// Show this message.
    Notify(String),
}

/// Stateless, total mapping from raw messages to [`Translation`]s.
#[derive(Debug, Clone, Default)]
pub struct ErrorTranslator {
    messages: Messages,
}

impl ErrorTranslator {
    /// Creates a translator over a message catalog.
    #[must_use]
    pub const fn new(messages: Messages) -> Self {
        Self { messages }
    }

    /// The catalog in use.
    #[must_use]
    pub const fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Classify a raw message.
    #[must_use]
    pub fn interpret(&self, raw: &str) -> Translation {
        if raw == NETWORK_ERROR {
            Translation::Notify(self.messages.network_error.to_string())
        } else if raw.contains(TIMEOUT) {
            Translation::Notify(self.messages.timeout.to_string())
        } else if raw.contains(SESSION_EXPIRED_STATUS) {
            Translation::ReAuthenticate
        } else if raw.contains(STATUS_PREFIX) {
            Translation::Notify(self.messages.status_failure(trailing_status(raw)))
        } else {
            Translation::Notify(raw.to_string())
        }
    }

    /// The text a user would see for a raw message.
    ///
    /// The re-authentication case renders as [`Messages::session_expired`].
    #[must_use]
    pub fn translate(&self, raw: &str) -> String {
        match self.interpret(raw) {
            Translation::ReAuthenticate => self.messages.session_expired.to_string(),
            Translation::Notify(message) => message,
        }
    }
}

/// Last three characters of `raw`, where the status code sits.
fn trailing_status(raw: &str) -> &str {
    raw.char_indices()
        .rev()
        .nth(2)
        .and_then(|(start, _)| raw.get(start..))
        .unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translator() -> ErrorTranslator {
        ErrorTranslator::default()
    }

    #[test]
    fn network_error_requires_exact_match() {
        let t = translator();
        assert_eq!(t.translate("Network Error"), "Unable to reach the backend service");
        assert_eq!(t.translate("Network Error!"), "Network Error!");
    }

    #[test]
    fn timeout_substring() {
        assert_eq!(
            translator().translate("timeout of 5000ms exceeded"),
            "The request timed out"
        );
    }

    #[test]
    fn status_code_is_interpolated() {
        let message = translator().translate("Request failed with status code 500");
        assert_eq!(message, "Backend endpoint error (500)");
        assert!(message.contains("500"));
    }

    #[test]
    fn status_424_reauthenticates() {
        assert_eq!(
            translator().interpret("Request failed with status code 424"),
            Translation::ReAuthenticate
        );
    }

    #[test]
    fn timeout_rule_wins_over_status() {
        assert_eq!(
            translator().translate("timeout while Request failed with status code 424"),
            "The request timed out"
        );
    }

    #[test]
    fn other_messages_pass_through() {
        let raw = "JSON deserialization error at 'data': expected value";
        assert_eq!(translator().translate(raw), raw);
        assert_eq!(translator().translate(""), "");
    }

    #[test]
    fn chinese_catalog() {
        let t = ErrorTranslator::new(Messages::chinese());
        assert_eq!(t.translate("Network Error"), "后端接口连接异常");
        assert_eq!(t.translate("timeout of 1ms exceeded"), "系统接口请求超时");
        assert_eq!(
            t.translate("Request failed with status code 502"),
            "系统接口502异常"
        );
    }

    #[test]
    fn trailing_status_is_char_safe() {
        assert_eq!(trailing_status("code 404"), "404");
        assert_eq!(trailing_status("ab"), "ab");
        assert_eq!(trailing_status("状态码é42"), "é42");
    }

    #[test]
    fn business_fallback_renders_code() {
        assert_eq!(
            Messages::english().business_fallback(1001),
            "Request failed (code 1001)"
        );
    }
}
