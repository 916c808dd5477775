use api_client::{ApiError, ChannelApi, HttpApiClient, VideoApi};
use chrono::Utc;
use datastore::{InMemoryRepository, Repository};
use domain::{SortField, VideoQuery};
use std::sync::Arc;
use tokio::net::TcpListener;

async fn spawn_backend(repo: Arc<dyn Repository>) -> String {
    let app = channel_service::create_router(repo.clone()).merge(video_service::create_router(repo));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/", addr)
}

#[tokio::test]
async fn fetches_random_channel() {
    let base = spawn_backend(Arc::new(InMemoryRepository::new())).await;
    let client = HttpApiClient::new(base);

    let channel = client.random_channel().await.unwrap();
    assert_eq!(channel.id, "channel-1");
    assert_eq!(channel.title, "Mock Channel");
}

#[tokio::test]
async fn empty_backend_surfaces_status_error() {
    let base = spawn_backend(Arc::new(InMemoryRepository::empty())).await;
    let client = HttpApiClient::new(base);

    match client.random_channel().await {
        Err(ApiError::Status { status, .. }) => assert_eq!(status, 404),
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn sends_query_parameters() {
    let base = spawn_backend(Arc::new(InMemoryRepository::new())).await;
    let client = HttpApiClient::new(base);

    let mut query = VideoQuery::initial(Utc::now());
    query.start_time = None;
    query.sort = SortField::ViewCount;
    query.count = 2;

    let page = client.all_videos(&query).await.unwrap();
    assert_eq!(page.total_count, 3);
    let views: Vec<u64> = page.datas.iter().map(|v| v.view_count).collect();
    assert_eq!(views, vec![300, 200]);

    query.page = 2;
    let page = client.all_videos(&query).await.unwrap();
    assert_eq!(page.datas.len(), 1);
}

#[tokio::test]
async fn default_window_excludes_old_videos() {
    let base = spawn_backend(Arc::new(InMemoryRepository::new())).await;
    let client = HttpApiClient::new(base);

    let page = client.all_videos(&VideoQuery::initial(Utc::now())).await.unwrap();
    assert_eq!(page.total_count, 0);
    assert!(page.datas.is_empty());
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let client = HttpApiClient::new("http://127.0.0.1:1");
    assert!(matches!(
        client.random_channel().await,
        Err(ApiError::Transport { .. })
    ));
}
