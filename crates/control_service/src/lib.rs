use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Request body for creating a new channel
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChannelRequest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub high_thumbnails: String,
}

/// Request body for creating a new video
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVideoRequest {
    pub id: String,
    pub channel_id: String,
    pub channel_title: String,
    pub title: String,
    pub description: String,
    pub high_thumbnails: String,
    pub published_at: String,
    #[serde(default)]
    pub view_count: u64,
    /// Drawn at random when omitted
    pub random_number: Option<f64>,
}

/// Response for successful creation
#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub success: bool,
    pub message: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Handler for creating a new channel
async fn create_channel(
    State(repo): State<Arc<dyn datastore::Repository>>,
    Json(request): Json<CreateChannelRequest>,
) -> impl IntoResponse {
    let channel = domain::Channel {
        id: request.id.clone(),
        title: request.title,
        description: request.description,
        high_thumbnails: request.high_thumbnails,
    };

    repo.add_channel(channel);
    info!(channel_id = %request.id, "Channel created");

    let response = CreateResponse {
        success: true,
        message: format!("Channel '{}' created successfully", request.id),
    };

    (StatusCode::CREATED, Json(response)).into_response()
}

/// Handler for creating a new video
async fn create_video(
    State(repo): State<Arc<dyn datastore::Repository>>,
    Json(request): Json<CreateVideoRequest>,
) -> impl IntoResponse {
    let published_at: DateTime<Utc> = match domain::time_format::parse(&request.published_at) {
        Ok(time) => time,
        Err(e) => {
            let error = ErrorResponse {
                success: false,
                error: format!("Invalid publishedAt '{}': {}", request.published_at, e),
            };
            return (StatusCode::BAD_REQUEST, Json(error)).into_response();
        }
    };

    let video = domain::Video {
        id: request.id.clone(),
        channel_id: request.channel_id,
        channel_title: request.channel_title,
        title: request.title,
        description: request.description,
        high_thumbnails: request.high_thumbnails,
        published_at,
        view_count: request.view_count,
        random_number: request.random_number.unwrap_or_else(rand::random),
    };

    repo.add_video(video);
    info!(video_id = %request.id, "Video created");

    let response = CreateResponse {
        success: true,
        message: format!("Video '{}' created successfully", request.id),
    };

    (StatusCode::CREATED, Json(response)).into_response()
}

/// Create the router for the control API
pub fn create_router(repo: Arc<dyn datastore::Repository>) -> Router {
    Router::new()
        .route("/control/channels", post(create_channel))
        .route("/control/videos", post(create_video))
        .with_state(repo)
}
