//! Integration tests for the diagnostic translator.
//!
//! Pins the never-throws contract, header extraction, and the hint rules on
//! realistic failure bodies.

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;

use periscope::diagnostics::describe;

fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        map.insert(*name, HeaderValue::from_str(value).unwrap());
    }
    map
}

#[test]
fn test_not_found_segment_names_the_token_and_suggests_plural() {
    let body = r#"{"error":{"code":"0x80060888","message":"Resource not found for the segment 'foo'."}}"#;
    let report = describe(StatusCode::NOT_FOUND, &HeaderMap::new(), body, Some("https://o/api/data/v9.2/foo"));

    assert_eq!(report.status_code, 404);
    assert_eq!(report.status_text, "Not Found");
    assert_eq!(report.error_code.as_deref(), Some("0x80060888"));
    assert!(report.message.contains("segment 'foo'"));
    assert_eq!(report.hints.len(), 1);
    assert!(report.hints[0].contains("'foo'"));
    assert!(report.hints[0].contains("foos"), "hint should suggest the plural form");
}

#[test]
fn test_empty_body_still_yields_a_report() {
    let report = describe(StatusCode::BAD_GATEWAY, &HeaderMap::new(), "", None);

    assert_eq!(report.status_code, 502);
    assert_eq!(report.status_text, "Bad Gateway");
    assert_eq!(report.message, "Bad Gateway");
    assert!(report.error_code.is_none());
    assert!(report.raw_body.is_none());
    assert!(report.hints.is_empty());
}

#[test]
fn test_unparseable_body_is_kept_as_context() {
    let body = "<html><body>Gateway timeout</body></html>";
    let report = describe(StatusCode::GATEWAY_TIMEOUT, &HeaderMap::new(), body, None);

    assert_eq!(report.status_code, 504);
    assert_eq!(report.raw_body.as_deref(), Some(body));
    assert_eq!(report.message, "Gateway Timeout");
}

#[test]
fn test_correlation_and_request_ids_extracted() {
    let headers = headers(&[
        ("x-ms-service-request-id", "req-123"),
        ("x-ms-correlation-request-id", "corr-456"),
    ]);
    let report = describe(StatusCode::BAD_REQUEST, &headers, "", None);

    assert_eq!(report.request_id.as_deref(), Some("req-123"));
    assert_eq!(report.correlation_id.as_deref(), Some("corr-456"));
}

#[test]
fn test_rate_limit_state_extracted_and_drives_retriability() {
    let headers = headers(&[
        ("x-ms-ratelimit-burst-remaining-xrm-requests", "0"),
        ("x-ms-ratelimit-time-remaining-xrm-requests", "42"),
    ]);
    let report = describe(StatusCode::SERVICE_UNAVAILABLE, &headers, "", None);

    let limit = report.rate_limit.expect("rate limit state");
    assert_eq!(limit.remaining, 0);
    assert_eq!(limit.window_seconds, 42);
    assert!(report.is_retriable());
}

#[test]
fn test_too_many_requests_is_retriable_without_headers() {
    let report = describe(StatusCode::TOO_MANY_REQUESTS, &HeaderMap::new(), "", None);
    assert!(report.is_retriable());
}

#[test]
fn test_client_errors_are_not_retriable() {
    let report = describe(StatusCode::BAD_REQUEST, &HeaderMap::new(), "", None);
    assert!(!report.is_retriable());
}

#[test]
fn test_unknown_property_hint_on_bad_request() {
    let body = r#"{"error":{"code":"0x80060107","message":"Could not find a property named 'pum_portfolo' on type 'Microsoft.Dynamics.CRM.pum_initiative'."}}"#;
    let report = describe(StatusCode::BAD_REQUEST, &HeaderMap::new(), body, None);

    assert_eq!(report.hints.len(), 1);
    assert!(report.hints[0].contains("pum_portfolo"));
}

#[test]
fn test_syntax_error_hint_names_the_position() {
    let body = r#"{"error":{"message":"Syntax error at position 18 in '_pum_portfolio_value eq '."}}"#;
    let report = describe(StatusCode::BAD_REQUEST, &HeaderMap::new(), body, None);

    assert_eq!(report.hints.len(), 1);
    assert!(report.hints[0].contains("position 18"));
}

#[test]
fn test_hints_fire_from_raw_body_when_parse_fails() {
    // Some gateways wrap the OData error in plain text; rules still match.
    let body = "upstream said: Resource not found for the segment 'pum_initiative'.";
    let report = describe(StatusCode::NOT_FOUND, &HeaderMap::new(), body, None);

    assert_eq!(report.hints.len(), 1);
    assert!(report.hints[0].contains("pum_initiatives"));
}

#[test]
fn test_display_includes_hints_and_identifiers() {
    let headers = headers(&[("x-ms-service-request-id", "req-9")]);
    let body = r#"{"error":{"message":"Resource not found for the segment 'foo'."}}"#;
    let report = describe(StatusCode::NOT_FOUND, &headers, body, Some("https://o/api/data/v9.2/foo"));

    let rendered = report.to_string();
    assert!(rendered.contains("404 Not Found"));
    assert!(rendered.contains("hint:"));
    assert!(rendered.contains("req-9"));
    assert!(rendered.contains("https://o/api/data/v9.2/foo"));
}
