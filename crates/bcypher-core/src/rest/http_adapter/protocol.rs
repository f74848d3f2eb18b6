use reqwest::{Method, StatusCode};
use serde_json::Value;

use crate::error::{ApiError, CoreError};
use crate::rest::types::Query;

/// Longest slice of a non-JSON error body kept in the error message.
const RAW_ERROR_SNIPPET: usize = 200;

/// Success statuses per verb: GET and PUT expect 200, POST 200 or 201,
/// DELETE 204 or 200. Other verbs accept any 2xx.
pub(super) fn is_success_status(method: &Method, status: StatusCode) -> bool {
    let code = status.as_u16();
    if method == Method::GET || method == Method::PUT {
        code == 200
    } else if method == Method::POST {
        code == 200 || code == 201
    } else if method == Method::DELETE {
        code == 204 || code == 200
    } else {
        status.is_success()
    }
}

/// Decode a successful response. An empty body (typical for 204) becomes `{}`.
pub(super) fn decode_success_body(body: &str) -> Result<Value, CoreError> {
    if body.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(body).map_err(|e| {
        ApiError::InvalidResponse(format!("decode JSON response: {e}; body={body}")).into()
    })
}

/// Build the error for a non-success response.
///
/// BlockCypher reports failures as `{"error": "..."}` or
/// `{"errors": [{"error": "..."}, ...]}`. Bodies that are not JSON keep their
/// raw text (truncated) as the message and an empty object as `body`.
pub(super) fn parse_error_body(status: StatusCode, body: &str) -> ApiError {
    let empty = || Value::Object(Default::default());

    if body.trim().is_empty() {
        return ApiError::Status {
            status: status.as_u16(),
            message: fallback_message(status),
            body: empty(),
        };
    }

    match serde_json::from_str::<Value>(body) {
        Ok(decoded) => ApiError::Status {
            status: status.as_u16(),
            message: error_message(&decoded).unwrap_or_else(|| fallback_message(status)),
            body: decoded,
        },
        Err(_) => ApiError::Status {
            status: status.as_u16(),
            message: body.trim().chars().take(RAW_ERROR_SNIPPET).collect(),
            body: empty(),
        },
    }
}

fn error_message(body: &Value) -> Option<String> {
    if let Some(err) = body.get("error") {
        return Some(value_text(err));
    }

    match body.get("errors")? {
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| item.get("error").map_or_else(|| value_text(item), value_text))
                .collect::<Vec<_>>()
                .join("; "),
        ),
        other => Some(value_text(other)),
    }
}

fn fallback_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_owned()
}

fn value_text(value: &Value) -> String {
    value
        .as_str()
        .map(str::to_owned)
        .unwrap_or_else(|| value.to_string())
}

/// Flatten a query object into string pairs for `reqwest`.
pub(super) fn query_pairs(query: &Query) -> Vec<(String, String)> {
    query
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.clone(), value_text(value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn success_status_rules_per_verb() {
        assert!(is_success_status(&Method::GET, StatusCode::OK));
        assert!(!is_success_status(&Method::GET, StatusCode::CREATED));
        assert!(is_success_status(&Method::POST, StatusCode::CREATED));
        assert!(is_success_status(&Method::POST, StatusCode::OK));
        assert!(is_success_status(&Method::DELETE, StatusCode::NO_CONTENT));
        assert!(is_success_status(&Method::DELETE, StatusCode::OK));
        assert!(!is_success_status(&Method::DELETE, StatusCode::BAD_REQUEST));
        assert!(is_success_status(&Method::PATCH, StatusCode::ACCEPTED));
    }

    #[test]
    fn empty_success_body_is_empty_object() {
        assert_eq!(decode_success_body("").expect("empty is fine"), json!({}));
    }

    #[test]
    fn malformed_success_body_is_invalid_response() {
        let err = decode_success_body("<html>").expect_err("must fail");
        assert!(matches!(err, CoreError::Api(ApiError::InvalidResponse(_))));
    }

    #[test]
    fn error_field_becomes_message() {
        let err = parse_error_body(StatusCode::BAD_REQUEST, r#"{"error":"Wallet not found"}"#);
        match err {
            ApiError::Status { status, message, body } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Wallet not found");
                assert_eq!(body, json!({"error": "Wallet not found"}));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn errors_array_is_joined() {
        let err = parse_error_body(
            StatusCode::BAD_REQUEST,
            r#"{"errors":[{"error":"bad input"},{"error":"bad output"}]}"#,
        );
        assert!(matches!(
            err,
            ApiError::Status { ref message, .. } if message == "bad input; bad output"
        ));
    }

    #[test]
    fn empty_error_body_uses_reason_and_empty_object() {
        let err = parse_error_body(StatusCode::NOT_FOUND, "");
        assert!(matches!(
            err,
            ApiError::Status { status: 404, ref message, ref body }
                if message == "Not Found" && *body == json!({})
        ));
    }

    #[test]
    fn non_json_error_body_keeps_raw_text() {
        let err = parse_error_body(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(
            err,
            ApiError::Status { status: 502, ref message, .. } if message == "upstream down"
        ));
    }

    #[test]
    fn query_pairs_render_scalars() {
        let mut query = Query::new();
        query.insert("limit".into(), json!(50));
        query.insert("token".into(), json!("abc"));
        query.insert("omit".into(), Value::Null);

        let pairs = query_pairs(&query);
        assert_eq!(
            pairs,
            vec![
                ("limit".to_owned(), "50".to_owned()),
                ("token".to_owned(), "abc".to_owned()),
            ]
        );
    }
}
