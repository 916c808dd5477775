use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use domain::{VideoPage, VideoQuery};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Largest page a single request may ask for
pub const MAX_PAGE_SIZE: u32 = 100;

/// Bring client supplied paging into range: pages start at 1, counts at 1..=MAX_PAGE_SIZE
fn normalize(mut query: VideoQuery) -> VideoQuery {
    query.page = query.page.max(1);
    query.count = query.count.clamp(1, MAX_PAGE_SIZE);
    query
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

fn bad_request(rejection: QueryRejection) -> Response {
    warn!(error = %rejection.body_text(), "Rejected video query");
    let body = ErrorResponse {
        success: false,
        error: rejection.body_text(),
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

async fn videos_list(
    State(repo): State<Arc<dyn datastore::Repository>>,
    query: Result<Query<VideoQuery>, QueryRejection>,
) -> Response {
    let query = match query {
        Ok(Query(query)) => normalize(query),
        Err(rejection) => return bad_request(rejection),
    };
    let (datas, total_count) = repo.list_videos(&query);

    debug!(
        sort = %query.sort,
        page = query.page,
        count = query.count,
        returned = datas.len(),
        total_count,
        "Listed videos"
    );

    let response = VideoPage {
        datas,
        total_count,
        token: uuid::Uuid::new_v4().to_string(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

// Create the router for the video API
pub fn create_router(repo: Arc<dyn datastore::Repository>) -> Router {
    Router::new()
        .route("/api/videos", get(videos_list))
        .with_state(repo)
}
