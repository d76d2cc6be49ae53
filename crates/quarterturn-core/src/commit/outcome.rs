//! Classification of rotation replies.
//!
//! [`classify`] is a pure function from reply shape to [`RotateOutcome`]:
//!
//! | Reply                                           | Outcome          |
//! |-------------------------------------------------|------------------|
//! | transport error or non-2xx status               | `Failed`         |
//! | truthy `success`, `results` or `ok`             | `Success`        |
//! | truthy `error`                                  | `Rejected`       |
//! | anything else, including a malformed body       | `AssumedSuccess` |
//!
//! Truthiness follows the JSON conventions of the web frontends that talk to
//! this endpoint: `null`, `false`, `0` and `""` are falsy, everything else
//! (including empty arrays and objects) is truthy.

use super::backend::{RotateReply, TransportError};
use serde_json::{Map, Value};

/// Result of one rotation request.
#[derive(Debug, Clone, PartialEq)]
pub enum RotateOutcome {
    /// The server confirmed the rotation, optionally with a new image URL.
    Success { image_url: Option<String> },
    /// HTTP success without any explicit signal.
    AssumedSuccess,
    /// The server reported an error payload.
    Rejected { error: Value },
    /// No usable reply.
    Failed(TransportError),
}

impl RotateOutcome {
    /// Whether the image on the server is considered rotated.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            RotateOutcome::Success { .. } | RotateOutcome::AssumedSuccess
        )
    }

    /// Replacement display source for a successful outcome.
    ///
    /// Uses the server's URL when supplied, otherwise the current source with a
    /// cache-busting parameter. `None` for failures.
    pub fn display_source(&self, current: &str, param: &str, token: u64) -> Option<String> {
        match self {
            RotateOutcome::Success {
                image_url: Some(url),
            } => Some(url.clone()),
            RotateOutcome::Success { image_url: None } | RotateOutcome::AssumedSuccess => {
                Some(cache_busted(current, param, token))
            }
            RotateOutcome::Rejected { .. } | RotateOutcome::Failed(_) => None,
        }
    }
}

/// Classify a reply into an outcome.
pub fn classify(reply: &Result<RotateReply, TransportError>) -> RotateOutcome {
    let reply = match reply {
        Ok(reply) => reply,
        Err(err) => return RotateOutcome::Failed(err.clone()),
    };
    if !reply.is_success_status() {
        return RotateOutcome::Failed(TransportError::Status {
            status: reply.status,
            body: reply.body.clone(),
        });
    }

    let payload = parse_payload(&reply.body);
    let signalled = ["success", "results", "ok"]
        .iter()
        .any(|field| payload.get(*field).is_some_and(is_truthy));

    if signalled {
        let image_url = payload
            .get("image_url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string);
        return RotateOutcome::Success { image_url };
    }

    match payload.get("error") {
        Some(error) if is_truthy(error) => RotateOutcome::Rejected {
            error: Value::Object(payload.clone()),
        },
        _ => RotateOutcome::AssumedSuccess,
    }
}

/// Parse a reply body, treating anything that is not a JSON object as empty.
fn parse_payload(body: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Replace any query string of `src` with `?{param}={token}`.
pub fn cache_busted(src: &str, param: &str, token: u64) -> String {
    let base = src.split('?').next().unwrap_or_default();
    format!("{base}?{param}={token}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ok(body: &str) -> Result<RotateReply, TransportError> {
        Ok(RotateReply::new(200, body))
    }

    #[test]
    fn test_success_flags() {
        for body in [r#"{"success": true}"#, r#"{"results": [1]}"#, r#"{"ok": 1}"#] {
            assert_eq!(
                classify(&ok(body)),
                RotateOutcome::Success { image_url: None },
                "body {body}"
            );
        }
    }

    #[test]
    fn test_success_with_image_url() {
        let outcome = classify(&ok(r#"{"success": true, "image_url": "/t/a.jpg?r=2"}"#));
        assert_eq!(
            outcome,
            RotateOutcome::Success {
                image_url: Some("/t/a.jpg?r=2".into())
            }
        );
    }

    #[test]
    fn test_empty_image_url_ignored() {
        let outcome = classify(&ok(r#"{"ok": true, "image_url": ""}"#));
        assert_eq!(outcome, RotateOutcome::Success { image_url: None });
    }

    #[test]
    fn test_success_wins_over_error() {
        let outcome = classify(&ok(r#"{"success": true, "error": "ignored"}"#));
        assert!(outcome.is_success());
    }

    #[test]
    fn test_error_payload() {
        let outcome = classify(&ok(r#"{"error": "unsupported format"}"#));
        assert_eq!(
            outcome,
            RotateOutcome::Rejected {
                error: json!({"error": "unsupported format"})
            }
        );
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_falsy_flags_are_ambiguous() {
        let outcome = classify(&ok(r#"{"success": false, "ok": 0, "error": ""}"#));
        assert_eq!(outcome, RotateOutcome::AssumedSuccess);
    }

    #[test]
    fn test_empty_and_malformed_bodies() {
        for body in ["", "not json", "null", "[1,2]", "{}", "\"text\""] {
            assert_eq!(classify(&ok(body)), RotateOutcome::AssumedSuccess, "body {body:?}");
        }
    }

    #[test]
    fn test_non_success_status_fails() {
        let outcome = classify(&Ok(RotateReply::new(500, r#"{"success": true}"#)));
        assert_eq!(
            outcome,
            RotateOutcome::Failed(TransportError::Status {
                status: 500,
                body: r#"{"success": true}"#.into()
            })
        );
    }

    #[test]
    fn test_transport_error_fails() {
        let err = TransportError::Network("connection reset".into());
        assert_eq!(classify(&Err(err.clone())), RotateOutcome::Failed(err));
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!("no")));
        assert!(is_truthy(&json!(-1)));
    }

    #[test]
    fn test_cache_busted() {
        assert_eq!(cache_busted("/t/a.jpg", "v", 42), "/t/a.jpg?v=42");
        assert_eq!(cache_busted("/t/a.jpg?v=1&x=2", "v", 43), "/t/a.jpg?v=43");
    }

    #[test]
    fn test_display_source() {
        let current = "/t/a.jpg?v=1";
        let replaced = RotateOutcome::Success {
            image_url: Some("/new.jpg".into()),
        };
        assert_eq!(replaced.display_source(current, "v", 5).as_deref(), Some("/new.jpg"));
        assert_eq!(
            RotateOutcome::AssumedSuccess.display_source(current, "v", 5).as_deref(),
            Some("/t/a.jpg?v=5")
        );
        let failed = RotateOutcome::Failed(TransportError::Network("x".into()));
        assert_eq!(failed.display_source(current, "v", 5), None);
    }
}
