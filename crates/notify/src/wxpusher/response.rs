use reqwest::StatusCode;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use wxnotify_core::notify::entity::NotificationOutcome;

// Longest slice of a raw body carried back in an outcome.
const DETAIL_LIMIT: usize = 256;

/// # Summary
/// Parses a provider response body.
///
/// # Logic
/// Malformed, empty or non-object bodies degrade to an empty map instead of an error.
pub fn parse_body(body: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// # Summary
/// The delivery predicate.
///
/// # Logic
/// Success requires all three clauses:
/// 1. the HTTP status is `200 OK`;
/// 2. the parsed body is not empty;
/// 3. the body's `success` field is truthy.
pub fn is_delivered(status: u16, body: &Map<String, Value>) -> bool {
    status == StatusCode::OK.as_u16() && !body.is_empty() && body.get("success").is_some_and(is_truthy)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// # Summary
/// Best-effort human readable description of an HTTP status code.
///
/// # Returns
/// * The canonical reason phrase, or an empty string when the code is unknown.
pub fn status_description(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or_default()
}

/// # Summary
/// Turns one HTTP exchange into a final outcome.
///
/// # Logic
/// 1. Parses the body leniently.
/// 2. Applies `is_delivered`.
/// 3. On success logs the number of notified targets at info level.
/// 4. On failure logs a warning summary plus the full response at debug level.
///
/// # Arguments
/// * `status` - HTTP status code returned by the transport.
/// * `raw` - Raw response body.
/// * `notified` - Users plus topics included in the request.
///
/// # Returns
/// * `NotificationOutcome` carrying the status and a short detail string.
pub fn interpret(status: u16, raw: &[u8], notified: usize) -> NotificationOutcome {
    let body = parse_body(raw);

    if is_delivered(status, &body) {
        info!("Sent WxPusher notification to {} targets.", notified);
        return NotificationOutcome::delivered(status, provider_message(&body, raw));
    }

    let description = status_description(status);
    warn!(
        "Failed to send WxPusher notification: {}{}error={}.",
        description,
        if description.is_empty() { "" } else { ", " },
        status
    );
    if body.is_empty() {
        debug!("Response Details:\r\n{}", String::from_utf8_lossy(raw));
    } else {
        debug!("Response Details:\r\n{:?}", body);
    }

    NotificationOutcome::rejected(status, provider_message(&body, raw))
}

// WxPusher puts its explanation in `msg`; fall back to the raw body.
fn provider_message(body: &Map<String, Value>, raw: &[u8]) -> String {
    match body.get("msg").and_then(Value::as_str) {
        Some(msg) => msg.to_string(),
        None => String::from_utf8_lossy(raw).chars().take(DETAIL_LIMIT).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicate_boundaries() {
        let ok = parse_body(br#"{"success": true, "code": 1000, "msg": "ok"}"#);
        let refused = parse_body(br#"{"success": false, "code": 1001}"#);

        assert!(is_delivered(200, &ok));
        assert!(!is_delivered(200, &refused));
        assert!(!is_delivered(500, &ok));
        assert!(!is_delivered(200, &Map::new()));
    }

    #[test]
    fn test_parse_body_degrades_to_empty() {
        assert!(parse_body(b"").is_empty());
        assert!(parse_body(b"<html>bad gateway</html>").is_empty());
        assert!(parse_body(b"[true]").is_empty());
        assert!(parse_body(b"{}").is_empty());
    }

    #[test]
    fn test_success_indicator_truthiness() {
        assert!(is_delivered(200, &parse_body(br#"{"success": 1}"#)));
        assert!(!is_delivered(200, &parse_body(br#"{"success": 0}"#)));
        assert!(!is_delivered(200, &parse_body(br#"{"success": null}"#)));
        assert!(!is_delivered(200, &parse_body(br#"{"code": 1000}"#)));
    }

    #[test]
    fn test_status_description() {
        assert_eq!(status_description(500), "Internal Server Error");
        assert_eq!(status_description(404), "Not Found");
        assert_eq!(status_description(599), "");
    }

    #[test]
    fn test_interpret_outcomes() {
        let outcome = interpret(200, br#"{"success": true, "msg": "done"}"#, 2);
        assert!(outcome.success);
        assert_eq!(outcome.status, Some(200));
        assert_eq!(outcome.detail, "done");

        let outcome = interpret(502, b"upstream down", 2);
        assert!(!outcome.success);
        assert_eq!(outcome.status, Some(502));
        assert_eq!(outcome.detail, "upstream down");
    }
}
