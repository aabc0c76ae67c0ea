//! Request inputs shared by every operation

use axum::http::{HeaderMap, header::AUTHORIZATION};
use serde::Deserialize;

/// `?team=...&repos=a,b` query string
///
/// Both are optional here so that a missing value is reported by the
/// service with the usual error envelope rather than by the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct OperationParams {
    pub team: Option<String>,
    pub repos: Option<String>,
}

/// Raw `Authorization` header, if present and valid UTF-8
pub fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}
