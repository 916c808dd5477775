use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use domain::Channel;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Envelope for a single channel, matching what the pages expect: `{ "data": ... }`
#[derive(Debug, Serialize)]
pub struct ChannelResponse {
    pub data: Channel,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

fn not_found(error: String) -> axum::response::Response {
    let body = ErrorResponse {
        success: false,
        error,
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

/// Handler picking one channel at random
async fn random_channel(State(repo): State<Arc<dyn datastore::Repository>>) -> impl IntoResponse {
    match repo.random_channel() {
        Some(channel) => {
            debug!(channel_id = %channel.id, "Picked random channel");
            (StatusCode::OK, Json(ChannelResponse { data: channel })).into_response()
        }
        None => {
            warn!("Random channel requested but no channels are stored");
            not_found("No channels available".to_string())
        }
    }
}

/// Handler for a single channel by ID
async fn channel_by_id(
    State(repo): State<Arc<dyn datastore::Repository>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match repo.get_channel(&id) {
        Some(channel) => (StatusCode::OK, Json(ChannelResponse { data: channel })).into_response(),
        None => not_found(format!("Channel '{}' not found", id)),
    }
}

// Create the router for the channel API
pub fn create_router(repo: Arc<dyn datastore::Repository>) -> Router {
    Router::new()
        .route("/api/channels/random", get(random_channel))
        .route("/api/channels/{id}", get(channel_by_id))
        .with_state(repo)
}
