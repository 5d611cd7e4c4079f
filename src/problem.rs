//! Problem responses (RFC 9457 `application/problem+json`).

use http::StatusCode;
use serde_json::json;

use crate::response::{ContentType, Response};

/// Builds a problem response.
///
/// ```json
/// {"type": "about:blank", "title": "...", "detail": "...", "status": 500}
/// ```
pub fn problem(status: StatusCode, title: &str, detail: &str) -> Response {
    let body = json!({
        "type": "about:blank",
        "title": title,
        "detail": detail,
        "status": status.as_u16(),
    });

    Response::builder()
        .status(status)
        .bytes(ContentType::ProblemJson, body.to_string().into_bytes())
}
