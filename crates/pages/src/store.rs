//! Shared video list state and the actions that replace it.

use api_client::{ApiError, VideoApi};
use domain::{Video, VideoQuery};
use tracing::debug;

/// Video list held by the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoListState {
    pub videos: Vec<Video>,
    pub total_count: u64,
    /// Marker of the last completed fetch, `None` before the first one
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VideoAction {
    /// Replace the whole list
    GetVideos {
        videos: Vec<Video>,
        total_count: u64,
        token: String,
    },
}

pub fn get_videos(videos: Vec<Video>, total_count: u64, token: String) -> VideoAction {
    VideoAction::GetVideos {
        videos,
        total_count,
        token,
    }
}

/// Fetch the page described by `query` and build the action that stores
/// `existing` followed by the fetched videos.
///
/// Pass an empty `existing` to replace the list, or the currently held videos
/// to append to it.
pub async fn get_videos_async<A>(
    api: &A,
    mut existing: Vec<Video>,
    query: &VideoQuery,
) -> Result<VideoAction, ApiError>
where
    A: VideoApi,
{
    let page = api.all_videos(query).await?;
    debug!(
        held = existing.len(),
        fetched = page.datas.len(),
        "Merging fetched videos"
    );
    existing.extend(page.datas);
    Ok(get_videos(existing, page.total_count, page.token))
}

impl VideoListState {
    pub fn apply(&mut self, action: VideoAction) {
        match action {
            VideoAction::GetVideos {
                videos,
                total_count,
                token,
            } => {
                self.videos = videos;
                self.total_count = total_count;
                self.token = Some(token);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use domain::VideoPage;
    use std::sync::Mutex;

    pub fn video(id: &str) -> Video {
        Video {
            id: id.to_string(),
            channel_id: "channel-1".to_string(),
            channel_title: "Mock Channel".to_string(),
            title: format!("Video {}", id),
            description: String::new(),
            high_thumbnails: format!("https://img.example/{}.jpg", id),
            published_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).single().unwrap(),
            view_count: 1,
            random_number: 0.5,
        }
    }

    /// Records every query and answers with `page_size` generated videos
    pub struct FakeVideoApi {
        pub total_count: u64,
        pub page_size: usize,
        pub fail: bool,
        /// Number of leading calls that fail before answers start coming back
        pub failing_calls: usize,
        pub calls: Mutex<Vec<VideoQuery>>,
    }

    impl FakeVideoApi {
        pub fn new(total_count: u64, page_size: usize) -> Self {
            Self {
                total_count,
                page_size,
                fail: false,
                failing_calls: 0,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<VideoQuery> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl VideoApi for FakeVideoApi {
        async fn all_videos(&self, query: &VideoQuery) -> Result<VideoPage, ApiError> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(query.clone());
                calls.len()
            };
            if self.fail || call <= self.failing_calls {
                return Err(ApiError::Status {
                    url: "/api/videos".to_string(),
                    status: 500,
                });
            }
            Ok(VideoPage {
                datas: (0..self.page_size)
                    .map(|i| video(&format!("p{}-{}", query.page, i)))
                    .collect(),
                total_count: self.total_count,
                token: format!("token-{}", call),
            })
        }
    }

    #[tokio::test]
    async fn async_action_appends_to_existing() {
        let api = FakeVideoApi::new(10, 2);
        let query = VideoQuery::initial(Utc::now());

        let action = get_videos_async(&api, vec![video("held")], &query)
            .await
            .unwrap();

        let mut state = VideoListState::default();
        state.apply(action);
        let ids: Vec<&str> = state.videos.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["held", "p1-0", "p1-1"]);
        assert_eq!(state.total_count, 10);
        assert_eq!(state.token.as_deref(), Some("token-1"));
    }

    #[tokio::test]
    async fn async_action_with_empty_list_replaces() {
        let api = FakeVideoApi::new(10, 1);
        let query = VideoQuery::initial(Utc::now());
        let mut state = VideoListState {
            videos: vec![video("old-a"), video("old-b")],
            total_count: 2,
            token: Some("before".to_string()),
        };

        state.apply(get_videos_async(&api, Vec::new(), &query).await.unwrap());
        assert_eq!(state.videos.len(), 1);
        assert_eq!(state.videos[0].id, "p1-0");
    }

    #[tokio::test]
    async fn failed_fetch_surfaces_error() {
        let mut api = FakeVideoApi::new(10, 1);
        api.fail = true;
        let query = VideoQuery::initial(Utc::now());
        assert!(get_videos_async(&api, Vec::new(), &query).await.is_err());
    }
}
