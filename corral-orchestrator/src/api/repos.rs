//! Repository Access API Handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
};
use corral_client::Platform;
use corral_core::dto::envelope::SuccessEnvelope;

use crate::api::error::ApiResult;
use crate::api::params::{OperationParams, authorization};
use crate::service::RunnerGroupOrchestrator;

/// PATCH /api/v1/repos-add?team=T&repos=a,b
pub async fn add_repos<P: Platform>(
    State(orchestrator): State<Arc<RunnerGroupOrchestrator<P>>>,
    headers: HeaderMap,
    Query(params): Query<OperationParams>,
) -> ApiResult<Json<SuccessEnvelope<String>>> {
    let message = orchestrator
        .add_repositories(
            authorization(&headers),
            params.team.as_deref(),
            params.repos.as_deref(),
        )
        .await?;

    Ok(Json(SuccessEnvelope::ok(message)))
}

/// PATCH /api/v1/repos-remove?team=T&repos=a,b
pub async fn remove_repos<P: Platform>(
    State(orchestrator): State<Arc<RunnerGroupOrchestrator<P>>>,
    headers: HeaderMap,
    Query(params): Query<OperationParams>,
) -> ApiResult<Json<SuccessEnvelope<String>>> {
    let message = orchestrator
        .remove_repositories(
            authorization(&headers),
            params.team.as_deref(),
            params.repos.as_deref(),
        )
        .await?;

    Ok(Json(SuccessEnvelope::ok(message)))
}

/// PATCH /api/v1/repos-set?team=T&repos=a,b
pub async fn set_repos<P: Platform>(
    State(orchestrator): State<Arc<RunnerGroupOrchestrator<P>>>,
    headers: HeaderMap,
    Query(params): Query<OperationParams>,
) -> ApiResult<Json<SuccessEnvelope<String>>> {
    let message = orchestrator
        .set_repositories(
            authorization(&headers),
            params.team.as_deref(),
            params.repos.as_deref(),
        )
        .await?;

    Ok(Json(SuccessEnvelope::ok(message)))
}
