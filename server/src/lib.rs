use std::sync::Arc;

use api_client::{ChannelApi, HttpApiClient, VideoApi};
use axum::{Router, routing::get};
use chrono::Utc;
use datastore::{InMemoryRepository, Repository};
use pages::SiteMeta;
use tokio::{net::TcpListener, signal::ctrl_c};
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use config::Config;
use routes::{pick_youtuber_handler, videos_handler};
use state::AppState;

/// Pages plus the content and control APIs they are served next to
pub fn create_app<A>(repo: Arc<dyn Repository>, state: Arc<AppState<A>>) -> Router
where
    A: ChannelApi + VideoApi + 'static,
{
    let pages = Router::new()
        .route(pages::pick_youtuber::PATH, get(pick_youtuber_handler::<A>))
        .route(pages::videos::PATH, get(videos_handler::<A>))
        .with_state(state);

    pages
        .merge(channel_service::create_router(repo.clone()))
        .merge(video_service::create_router(repo.clone()))
        .merge(control_service::create_router(repo))
}

pub async fn start_server() -> Result<(), Box<dyn std::error::Error>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::load()?;

    info!("Seeding repository...");
    let repo: Arc<dyn Repository> = Arc::new(InMemoryRepository::with_fake_data(
        config.seed_channels,
        config.seed_videos,
        Utc::now(),
    ));

    let api = HttpApiClient::new(config.api_base_url.clone());
    info!("Pages fetch from {}", api.base_url());
    let site = SiteMeta {
        site_url: config.site_url.clone(),
        fb_app_id: config.fb_app_id.clone(),
    };
    let app = create_app(repo, Arc::new(AppState::new(api, site)));

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            return std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
