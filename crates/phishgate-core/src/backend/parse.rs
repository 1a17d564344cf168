//! Decode and validate the backend response body.

use super::{BackendError, Prediction};

/// Parse a response body into a [`Prediction`].
///
/// The body must be JSON with a `data` array of exactly three string-like
/// entries (strings pass through; numbers and booleans are stringified).
/// Anything else is [`BackendError::Malformed`], which the retry layer treats
/// as a failed attempt rather than a crash.
pub(crate) fn parse_prediction(body: &[u8]) -> Result<Prediction, BackendError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| BackendError::Malformed(format!("undecodable response body: {e}")))?;

    let data = value
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| BackendError::Malformed("response has no `data` array".to_string()))?;

    if data.len() != 3 {
        return Err(BackendError::Malformed(format!(
            "expected 3 response fields, got {}",
            data.len()
        )));
    }

    Ok(Prediction {
        summary: stringify(&data[0], "summary")?,
        confidence: stringify(&data[1], "confidence")?,
        detail: stringify(&data[2], "detail")?,
    })
}

fn stringify(value: &serde_json::Value, field: &str) -> Result<String, BackendError> {
    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => Err(BackendError::Malformed(format!(
            "`{field}` field is not string-like: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_string_fields() {
        let body = br#"{"data": ["Phishing Detected", "87%", "The link mimics a bank login."]}"#;
        let p = parse_prediction(body).unwrap();
        assert_eq!(p.summary, "Phishing Detected");
        assert_eq!(p.confidence, "87%");
        assert_eq!(p.detail, "The link mimics a bank login.");
    }

    #[test]
    fn stringifies_numeric_confidence() {
        let body = br#"{"data": ["Safe", 99.5, "No indicators found."]}"#;
        let p = parse_prediction(body).unwrap();
        assert_eq!(p.confidence, "99.5");
    }

    #[test]
    fn rejects_wrong_arity() {
        let body = br#"{"data": ["only", "two"]}"#;
        assert!(matches!(
            parse_prediction(body),
            Err(BackendError::Malformed(_))
        ));
        let body = br#"{"data": ["a", "b", "c", "d"]}"#;
        assert!(matches!(
            parse_prediction(body),
            Err(BackendError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_missing_or_non_array_data() {
        assert!(matches!(
            parse_prediction(br#"{"result": "ok"}"#),
            Err(BackendError::Malformed(_))
        ));
        assert!(matches!(
            parse_prediction(br#"{"data": "not an array"}"#),
            Err(BackendError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_non_json_body() {
        assert!(matches!(
            parse_prediction(b"<html>502 Bad Gateway</html>"),
            Err(BackendError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_nested_field_values() {
        let body = br#"{"data": ["Safe", {"pct": 99}, "detail"]}"#;
        assert!(matches!(
            parse_prediction(body),
            Err(BackendError::Malformed(_))
        ));
    }
}
