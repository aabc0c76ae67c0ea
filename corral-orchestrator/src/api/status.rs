//! Status API Handler
//!
//! Readiness endpoint; never calls the platform.

use std::sync::Arc;

use axum::{Json, extract::State, http::HeaderMap};
use corral_client::Platform;
use corral_core::dto::envelope::SuccessEnvelope;

use crate::api::error::ApiResult;
use crate::api::params::authorization;
use crate::service::RunnerGroupOrchestrator;

/// GET /api/v1/status
pub async fn status<P: Platform>(
    State(orchestrator): State<Arc<RunnerGroupOrchestrator<P>>>,
    headers: HeaderMap,
) -> ApiResult<Json<SuccessEnvelope<&'static str>>> {
    let ready = orchestrator.status(authorization(&headers))?;
    Ok(Json(SuccessEnvelope::ok(ready)))
}
