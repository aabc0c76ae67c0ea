//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific resource.

pub mod error;
pub mod group;
pub mod params;
pub mod repos;
pub mod status;
pub mod token;

use std::sync::Arc;

use axum::{
    Router,
    extract::Request,
    http::HeaderName,
    routing::{delete, get, patch, post},
};
use corral_client::Platform;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::service::RunnerGroupOrchestrator;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Create the main API router with all endpoints
pub fn create_router<P: Platform + 'static>(
    orchestrator: Arc<RunnerGroupOrchestrator<P>>,
) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let v1 = Router::new()
        // Runner groups
        .route("/group-create", post(group::create_group::<P>))
        .route("/group-delete", delete(group::delete_group::<P>))
        .route("/group-list", get(group::list_group::<P>))
        // Repository access
        .route("/repos-add", patch(repos::add_repos::<P>))
        .route("/repos-remove", patch(repos::remove_repos::<P>))
        .route("/repos-set", patch(repos::set_repos::<P>))
        // Runner tokens
        .route("/token-register", get(token::register_token::<P>))
        .route("/token-remove", get(token::remove_token::<P>))
        // Readiness
        .route("/status", get(status::status::<P>));

    Router::new()
        .nest("/api/v1", v1)
        .with_state(orchestrator)
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id,
            )
        }))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}
