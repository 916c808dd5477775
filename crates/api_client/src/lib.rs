//! Client side of the content API consumed by the pages.
//!
//! The pages only see the [`ChannelApi`] and [`VideoApi`] traits, so tests can
//! substitute an in-process fake for [`HttpApiClient`].

use domain::{Channel, VideoPage, VideoQuery};
use serde::Deserialize;
use std::future::Future;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Channel lookup collaborator
pub trait ChannelApi: Send + Sync {
    /// Ask the backend for one randomly selected channel
    fn random_channel(&self) -> impl Future<Output = Result<Channel, ApiError>> + Send;
}

/// Video listing collaborator
pub trait VideoApi: Send + Sync {
    /// Fetch one page of videos for the given query
    fn all_videos(
        &self,
        query: &VideoQuery,
    ) -> impl Future<Output = Result<VideoPage, ApiError>> + Send;
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// reqwest backed implementation of both collaborators
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T, Q>(&self, path: &str, query: Option<&Q>) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.get(&url);
        if let Some(query) = query {
            request = request.query(query);
        }

        let response = request.send().await.map_err(|source| ApiError::Transport {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "API request failed");
            return Err(ApiError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| ApiError::Decode { url, source })
    }
}

impl ChannelApi for HttpApiClient {
    async fn random_channel(&self) -> Result<Channel, ApiError> {
        let envelope: DataEnvelope<Channel> = self
            .get_json::<_, ()>("/api/channels/random", None)
            .await?;
        debug!(channel_id = %envelope.data.id, "Fetched random channel");
        Ok(envelope.data)
    }
}

impl VideoApi for HttpApiClient {
    async fn all_videos(&self, query: &VideoQuery) -> Result<VideoPage, ApiError> {
        let page: VideoPage = self.get_json("/api/videos", Some(query)).await?;
        debug!(
            page = query.page,
            returned = page.datas.len(),
            total_count = page.total_count,
            "Fetched videos"
        );
        Ok(page)
    }
}
