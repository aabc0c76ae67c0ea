//! Runner Group API Handlers
//!
//! HTTP endpoints for creating, deleting and inspecting a team's group.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
};
use corral_client::Platform;
use corral_core::dto::envelope::SuccessEnvelope;
use corral_core::dto::group::GroupListing;

use crate::api::error::ApiResult;
use crate::api::params::{OperationParams, authorization};
use crate::service::RunnerGroupOrchestrator;

/// POST /api/v1/group-create?team=T
pub async fn create_group<P: Platform>(
    State(orchestrator): State<Arc<RunnerGroupOrchestrator<P>>>,
    headers: HeaderMap,
    Query(params): Query<OperationParams>,
) -> ApiResult<Json<SuccessEnvelope<String>>> {
    let message = orchestrator
        .create_group(authorization(&headers), params.team.as_deref())
        .await?;

    Ok(Json(SuccessEnvelope::ok(message)))
}

/// DELETE /api/v1/group-delete?team=T
pub async fn delete_group<P: Platform>(
    State(orchestrator): State<Arc<RunnerGroupOrchestrator<P>>>,
    headers: HeaderMap,
    Query(params): Query<OperationParams>,
) -> ApiResult<Json<SuccessEnvelope<String>>> {
    let message = orchestrator
        .delete_group(authorization(&headers), params.team.as_deref())
        .await?;

    Ok(Json(SuccessEnvelope::ok(message)))
}

/// GET /api/v1/group-list?team=T
pub async fn list_group<P: Platform>(
    State(orchestrator): State<Arc<RunnerGroupOrchestrator<P>>>,
    headers: HeaderMap,
    Query(params): Query<OperationParams>,
) -> ApiResult<Json<SuccessEnvelope<GroupListing>>> {
    let listing = orchestrator
        .list_group(authorization(&headers), params.team.as_deref())
        .await?;

    Ok(Json(SuccessEnvelope::ok(listing)))
}
