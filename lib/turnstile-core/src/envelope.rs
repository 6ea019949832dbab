//! Normalized response wrapper.
//!
//! Backends wrap every payload as `{ code, msg, data, token }`, where `code` is
//! a *business* status independent of the HTTP status. Which value of `code`
//! means "success" differs between deployments (`0` or `200`), so the
//! sentinel is always passed in rather than assumed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Business-level response wrapper.
///
/// Fields the wrapper does not name are kept in [`Envelope::extra`], so an
/// envelope re-serializes to the payload the server sent. Token endpoints rely
/// on this: their responses (`access_token`, `expires_in`, ...) are handed back
/// verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    /// Business status; absent means success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    /// Server message, shown to the user on business errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    /// Payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Token issued alongside the payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Any other top-level fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<T> Default for Envelope<T> {
    fn default() -> Self {
        Self {
            code: None,
            msg: None,
            data: None,
            token: None,
            extra: Map::new(),
        }
    }
}

impl<T> Envelope<T> {
    /// The business code, falling back to `sentinel` when absent.
    #[must_use]
    pub fn code_or(&self, sentinel: i64) -> i64 {
        self.code.unwrap_or(sentinel)
    }

    /// Whether this envelope reports success under `sentinel`.
    #[must_use]
    pub fn is_success(&self, sentinel: i64) -> bool {
        self.code_or(sentinel) == sentinel
    }

    /// Consume into the payload.
    #[must_use]
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

impl Envelope<Value> {
    /// Decode the payload into a concrete type.
    ///
    /// Returns `Ok(None)` when the envelope has no `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` does not match `U`.
    pub fn data_as<U: serde::de::DeserializeOwned>(&self) -> crate::Result<Option<U>> {
        self.data
            .as_ref()
            .map(|data| {
                serde_path_to_error::deserialize(data).map_err(|e| {
                    crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
                })
            })
            .transpose()
    }

    /// Look up a top-level field, named or not.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "code" => self.code.map(Value::from),
            "msg" => self.msg.clone().map(Value::from),
            "data" => self.data.clone(),
            "token" => self.token.clone().map(Value::from),
            other => self.extra.get(other).cloned(),
        }
    }

    /// Build an envelope from arbitrary JSON without rejecting odd shapes.
    ///
    /// Named fields of the wrong type (e.g. `"code": "invalid_grant"`) stay in
    /// [`Envelope::extra`]. A body that is not an object becomes `data`.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut extra) = value else {
            return Self {
                data: Some(value).filter(|data| !data.is_null()),
                ..Self::default()
            };
        };

        let code = extra.get("code").and_then(Value::as_i64);
        if code.is_some() {
            extra.remove("code");
        }

        Self {
            code,
            msg: take_string(&mut extra, "msg"),
            data: extra.remove("data").filter(|data| !data.is_null()),
            token: take_string(&mut extra, "token"),
            extra,
        }
    }
}

fn take_string(map: &mut Map<String, Value>, name: &str) -> Option<String> {
    if !map.get(name).is_some_and(Value::is_string) {
        return None;
    }
    match map.remove(name) {
        Some(Value::String(value)) => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use serde_json::json;

    use super::*;

    #[test]
    fn absent_code_defaults_to_sentinel() {
        let envelope: Envelope = serde_json::from_value(json!({"data": {"x": 1}})).expect("parse");
        check!(envelope.code_or(0) == 0);
        check!(envelope.code_or(200) == 200);
        check!(envelope.is_success(0));
        check!(envelope.is_success(200));
    }

    #[test]
    fn sentinel_is_not_hardcoded() {
        let envelope: Envelope = serde_json::from_value(json!({"code": 200})).expect("parse");
        check!(envelope.is_success(200));
        check!(!envelope.is_success(0));
    }

    #[test]
    fn unknown_fields_survive() {
        let raw = json!({
            "access_token": "t-1",
            "token_type": "bearer",
            "expires_in": 3600
        });
        let envelope: Envelope = serde_json::from_value(raw.clone()).expect("parse");
        check!(envelope.code.is_none());
        check!(envelope.field("access_token") == Some(json!("t-1")));
        check!(serde_json::to_value(&envelope).expect("serialize") == raw);
    }

    #[test]
    fn from_value_keeps_mistyped_fields() {
        let envelope = Envelope::from_value(json!({
            "code": "invalid_grant",
            "msg": "bad credentials",
            "token": 42,
            "data": null,
        }));

        check!(envelope.code.is_none());
        check!(envelope.msg.as_deref() == Some("bad credentials"));
        check!(envelope.token.is_none());
        check!(envelope.data.is_none());
        check!(envelope.field("code") == None);
        check!(envelope.extra.get("code") == Some(&json!("invalid_grant")));
        check!(envelope.extra.get("token") == Some(&json!(42)));
    }

    #[test]
    fn from_value_matches_strict_decoding() {
        let raw = json!({"code": 0, "msg": "ok", "data": [1], "token": "t", "extra": true});
        let strict: Envelope = serde_json::from_value(raw.clone()).expect("parse");
        check!(Envelope::from_value(raw) == strict);
    }

    #[test]
    fn from_value_wraps_non_object() {
        let envelope = Envelope::from_value(json!("plain"));
        check!(envelope.data == Some(json!("plain")));
        check!(envelope.extra.is_empty());
    }

    #[test]
    fn data_as_decodes_payload() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct Point {
            x: i32,
        }

        let envelope: Envelope =
            serde_json::from_value(json!({"code": 0, "data": {"x": 1}})).expect("parse");
        let_assert!(Ok(Some(point)) = envelope.data_as::<Point>());
        check!(point == Point { x: 1 });

        let empty = Envelope::<Value>::default();
        let_assert!(Ok(None) = empty.data_as::<Point>());
    }

    #[test]
    fn data_as_reports_mismatch() {
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Point {
            x: i32,
        }

        let envelope: Envelope =
            serde_json::from_value(json!({"data": {"x": "one"}})).expect("parse");
        let_assert!(
            Err(crate::Error::JsonDeserialization { path, .. }) = envelope.data_as::<Point>()
        );
        check!(path == "x");
    }
}
