//! Runner Token API Handlers
//!
//! Tokens are organization-wide; the team only decides who may ask.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
};
use corral_client::Platform;
use corral_core::domain::token::RunnerToken;
use corral_core::dto::envelope::SuccessEnvelope;

use crate::api::error::ApiResult;
use crate::api::params::{OperationParams, authorization};
use crate::service::RunnerGroupOrchestrator;

/// GET /api/v1/token-register?team=T
pub async fn register_token<P: Platform>(
    State(orchestrator): State<Arc<RunnerGroupOrchestrator<P>>>,
    headers: HeaderMap,
    Query(params): Query<OperationParams>,
) -> ApiResult<Json<SuccessEnvelope<RunnerToken>>> {
    let token = orchestrator
        .registration_token(authorization(&headers), params.team.as_deref())
        .await?;

    Ok(Json(SuccessEnvelope::ok(token)))
}

/// GET /api/v1/token-remove?team=T
pub async fn remove_token<P: Platform>(
    State(orchestrator): State<Arc<RunnerGroupOrchestrator<P>>>,
    headers: HeaderMap,
    Query(params): Query<OperationParams>,
) -> ApiResult<Json<SuccessEnvelope<RunnerToken>>> {
    let token = orchestrator
        .removal_token(authorization(&headers), params.team.as_deref())
        .await?;

    Ok(Json(SuccessEnvelope::ok(token)))
}
