use chrono::{DateTime, Duration, TimeZone, Utc};
use domain::{Channel, SortField, SortOrder, Video, VideoQuery};
use fake::Fake;
use fake::faker::company::en::CompanyName;
use fake::faker::lorem::en::{Paragraph, Sentence};
use rand::Rng;
use rand::seq::SliceRandom;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Storage behind the channel, video and control routers
pub trait Repository: Send + Sync {
    /// Get a channel by ID
    fn get_channel(&self, id: &str) -> Option<Channel>;

    /// Pick one channel uniformly at random
    fn random_channel(&self) -> Option<Channel>;

    /// Get one page of videos matching the query, together with the total match count
    fn list_videos(&self, query: &VideoQuery) -> (Vec<Video>, u64);

    /// Add a channel to the repository
    fn add_channel(&self, channel: Channel);

    /// Add a video to the repository
    fn add_video(&self, video: Video);
}

/// In-memory implementation of the Repository trait
pub struct InMemoryRepository {
    channels: Arc<RwLock<HashMap<String, Channel>>>,
    videos: Arc<RwLock<HashMap<String, Video>>>,
}

impl InMemoryRepository {
    /// Create a new in-memory repository with a small fixed data set
    pub fn new() -> Self {
        let repo = Self::empty();
        repo.populate_dummy_data();
        repo
    }

    /// Create a repository with no data at all
    pub fn empty() -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            videos: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// The fixed data set plus generated channels and videos published over the
    /// 60 days before `now`
    pub fn with_fake_data(channel_count: usize, video_count: usize, now: DateTime<Utc>) -> Self {
        let repo = Self::new();
        let mut rng = rand::thread_rng();

        let channels: Vec<Channel> = (0..channel_count)
            .map(|i| {
                let id = format!("fake-channel-{}", i);
                Channel {
                    title: CompanyName().fake(),
                    description: Paragraph(1..3).fake(),
                    high_thumbnails: format!("https://i.ytimg.example/{}/hqdefault.jpg", id),
                    id,
                }
            })
            .collect();
        for channel in &channels {
            repo.add_channel(channel.clone());
        }

        if channels.is_empty() {
            return repo;
        }

        for i in 0..video_count {
            let channel = &channels[rng.gen_range(0..channels.len())];
            let id = format!("fake-video-{}", i);
            repo.add_video(Video {
                channel_id: channel.id.clone(),
                channel_title: channel.title.clone(),
                title: Sentence(3..8).fake(),
                description: Paragraph(1..2).fake(),
                high_thumbnails: format!("https://i.ytimg.example/vi/{}/hqdefault.jpg", id),
                published_at: now - Duration::minutes(rng.gen_range(0..60 * 24 * 60)),
                view_count: rng.gen_range(0..2_000_000),
                random_number: rng.r#gen(),
                id,
            });
        }

        debug!(channel_count, video_count, "Generated fake data");
        repo
    }

    /// Populate the repository with initial dummy data
    fn populate_dummy_data(&self) {
        // Fixed point in time for consistent dummy data
        let fixed_time = Utc
            .with_ymd_and_hms(2023, 1, 1, 0, 0, 0)
            .single()
            .expect("Fixed datetime should be valid");

        self.add_channel(Channel {
            id: "channel-1".to_string(),
            title: "Mock Channel".to_string(),
            description: "This is a mock channel for testing the recommendation page".to_string(),
            high_thumbnails: "https://i.ytimg.example/channel-1/hqdefault.jpg".to_string(),
        });

        for i in 0..3 {
            self.add_video(Video {
                id: format!("test-video-{}", i),
                channel_id: "channel-1".to_string(),
                channel_title: "Mock Channel".to_string(),
                title: format!("Mock Video {}", i),
                description: "This is a mock video for testing the listing page".to_string(),
                high_thumbnails: format!("https://i.ytimg.example/vi/test-video-{}/hqdefault.jpg", i),
                published_at: fixed_time + Duration::hours(i),
                view_count: 100 * (i as u64 + 1),
                random_number: 0.25 * (i as f64 + 1.0),
            });
        }
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn matches(video: &Video, query: &VideoQuery, keyword: &str) -> bool {
    if !keyword.is_empty()
        && !video.title.to_lowercase().contains(keyword)
        && !video.description.to_lowercase().contains(keyword)
    {
        return false;
    }
    if let Some(start) = query.start_time {
        if video.published_at < start {
            return false;
        }
    }
    if let Some(end) = query.end_time {
        if video.published_at > end {
            return false;
        }
    }
    true
}

fn compare(a: &Video, b: &Video, sort: SortField) -> Ordering {
    let ordering = match sort {
        SortField::ViewCount => a.view_count.cmp(&b.view_count),
        SortField::PublishedAt => a.published_at.cmp(&b.published_at),
        SortField::RandomNumber => a.random_number.total_cmp(&b.random_number),
    };
    // ties are broken by id so pages never overlap
    ordering.then_with(|| a.id.cmp(&b.id))
}

impl Repository for InMemoryRepository {
    fn get_channel(&self, id: &str) -> Option<Channel> {
        self.channels
            .read()
            .expect("Failed to acquire read lock on channels")
            .get(id)
            .cloned()
    }

    fn random_channel(&self) -> Option<Channel> {
        let channels = self
            .channels
            .read()
            .expect("Failed to acquire read lock on channels");
        let all: Vec<&Channel> = channels.values().collect();
        all.choose(&mut rand::thread_rng()).map(|c| (*c).clone())
    }

    fn list_videos(&self, query: &VideoQuery) -> (Vec<Video>, u64) {
        let keyword = query.keyword.trim().to_lowercase();
        let mut matched: Vec<Video> = self
            .videos
            .read()
            .expect("Failed to acquire read lock on videos")
            .values()
            .filter(|video| matches(video, query, &keyword))
            .cloned()
            .collect();

        matched.sort_by(|a, b| match query.order {
            SortOrder::Asc => compare(a, b, query.sort),
            SortOrder::Desc => compare(b, a, query.sort),
        });

        let total = matched.len() as u64;
        let page = matched
            .into_iter()
            .skip(query.offset())
            .take(query.count as usize)
            .collect();
        (page, total)
    }

    fn add_channel(&self, channel: Channel) {
        self.channels
            .write()
            .expect("Failed to acquire write lock on channels")
            .insert(channel.id.clone(), channel);
    }

    fn add_video(&self, video: Video) {
        self.videos
            .write()
            .expect("Failed to acquire write lock on videos")
            .insert(video.id.clone(), video);
    }
}
