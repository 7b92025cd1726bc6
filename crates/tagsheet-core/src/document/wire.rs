//! JSON result envelope exchanged with clients.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// `{"ok": true[, "value": ..]}` or `{"ok": false, "error": ".."}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome<T> {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Outcome<T> {
    pub fn success(value: T) -> Outcome<T> {
        Outcome {
            ok: true,
            value: Some(value),
            error: None,
        }
    }

    /// Success without a payload.
    pub fn done() -> Outcome<T> {
        Outcome {
            ok: true,
            value: None,
            error: None,
        }
    }

    pub fn failure(error: impl Display) -> Outcome<T> {
        Outcome {
            ok: false,
            value: None,
            error: Some(error.to_string()),
        }
    }

    /// Back to a `Result`; a failure without a message reads as `"unknown error"`.
    pub fn into_result(self) -> Result<Option<T>, String> {
        if self.ok {
            Ok(self.value)
        } else {
            Err(self.error.unwrap_or_else(|| "unknown error".to_string()))
        }
    }
}

impl<T, E: Display> From<Result<T, E>> for Outcome<T> {
    fn from(result: Result<T, E>) -> Outcome<T> {
        match result {
            Ok(value) => Outcome::success(value),
            Err(e) => Outcome::failure(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SheetError;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let outcome = Outcome::success(3);
        assert_eq!(serde_json::to_value(&outcome).unwrap(), json!({"ok": true, "value": 3}));
        let done: Outcome<()> = Outcome::done();
        assert_eq!(serde_json::to_value(&done).unwrap(), json!({"ok": true}));
    }

    #[test]
    fn test_failure_from_result() {
        let result: Result<u8, SheetError> = Err(SheetError::RowNotFound("r9".into()));
        let outcome = Outcome::from(result);
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"ok": false, "error": "Row not found: r9"})
        );
        assert_eq!(outcome.into_result(), Err("Row not found: r9".to_string()));
    }

    #[test]
    fn test_parse_envelope() {
        let outcome: Outcome<String> =
            serde_json::from_value(json!({"ok": true, "value": "x"})).unwrap();
        assert_eq!(outcome.into_result(), Ok(Some("x".to_string())));
    }
}
