use api_client::{ApiError, VideoApi};
use chrono::{DateTime, Utc};
use domain::{SortField, TimeWindow, VideoQuery};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, warn};

use super::debounce::Debouncer;
use super::query::{FetchMode, QueryEvent, on_bottom_reached, reduce};
use super::scroll::Viewport;
use super::{VideosPage, VideosView, render_videos};
use crate::SiteMeta;
use crate::store::{VideoAction, VideoListState, get_videos_async};

/// Quiet period after the last keystroke before the keyword is applied
pub const KEYWORD_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Messages delivered to the feed from its own background tasks
#[derive(Debug)]
pub enum FeedMessage {
    /// The keyword input has been quiet for [`KEYWORD_DEBOUNCE`]. Only the
    /// settle carrying the latest input generation is applied.
    KeywordSettled { generation: u64, keyword: String },
    /// A fetch tagged with `seq` finished
    FetchCompleted {
        seq: u64,
        result: Result<VideoAction, ApiError>,
    },
}

/// Interaction controller of the video listing.
///
/// Owns the query, the loading flag and the exhaustion latch. Fetches run as
/// spawned tasks and report back through [`FeedMessage`]s; only the response
/// to the most recently issued request is applied to the list. A failed
/// request rolls the query back to the one the held list was loaded with.
pub struct VideoFeed<A> {
    api: Arc<A>,
    list: VideoListState,
    query: VideoQuery,
    days_ago: TimeWindow,
    to_datas_limit: bool,
    committed: Committed,
    is_loading: bool,
    latest_seq: u64,
    attached: bool,
    keyword_generation: u64,
    keyword_debounce: Debouncer,
    tx: UnboundedSender<FeedMessage>,
    rx: UnboundedReceiver<FeedMessage>,
}

/// Query state matching the held list
#[derive(Debug, Clone)]
struct Committed {
    query: VideoQuery,
    days_ago: TimeWindow,
    to_datas_limit: bool,
}

impl<A> VideoFeed<A>
where
    A: VideoApi + 'static,
{
    /// Take over a list that was already fetched with `query`
    pub fn new(api: Arc<A>, list: VideoListState, query: VideoQuery) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            api,
            list,
            committed: Committed {
                query: query.clone(),
                days_ago: TimeWindow::Week,
                to_datas_limit: false,
            },
            query,
            days_ago: TimeWindow::Week,
            to_datas_limit: false,
            is_loading: false,
            latest_seq: 0,
            attached: true,
            keyword_generation: 0,
            keyword_debounce: Debouncer::new(KEYWORD_DEBOUNCE),
            tx,
            rx,
        }
    }

    /// Continue from a server rendered page, keeping its time window selection
    pub fn from_page(api: Arc<A>, page: VideosPage) -> Self {
        let mut feed = Self::new(api, page.list, page.query);
        feed.days_ago = page.window;
        feed.commit();
        feed
    }

    pub fn list(&self) -> &VideoListState {
        &self.list
    }

    pub fn query(&self) -> &VideoQuery {
        &self.query
    }

    pub fn days_ago(&self) -> TimeWindow {
        self.days_ago
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_exhausted(&self) -> bool {
        self.to_datas_limit
    }

    /// Scroll or resize event. Returns whether a fetch was issued.
    pub fn scroll(&mut self, viewport: Viewport) -> bool {
        if !self.attached || !viewport.at_bottom() || self.to_datas_limit || self.is_loading {
            return false;
        }

        let decision = on_bottom_reached(&self.query, self.list.videos.len(), self.list.total_count);
        if decision.latch {
            debug!(page = self.query.page, total_count = self.list.total_count, "Reached end of results");
            self.to_datas_limit = true;
        }
        if !decision.fetch {
            // nothing in flight here, so the latch belongs to the held list
            self.commit();
            return false;
        }

        self.transition(QueryEvent::PageAdvanced);
        true
    }

    /// Keystroke in the keyword box; applied once typing pauses
    pub fn keyword_input(&mut self, keyword: impl Into<String>) {
        if !self.attached {
            return;
        }
        let keyword = keyword.into();
        self.keyword_generation += 1;
        let generation = self.keyword_generation;
        let tx = self.tx.clone();
        self.keyword_debounce.schedule(async move {
            let _ = tx.send(FeedMessage::KeywordSettled { generation, keyword });
        });
    }

    pub fn sort_changed(&mut self, sort: SortField) {
        self.transition(QueryEvent::SortChanged(sort));
    }

    pub fn window_changed(&mut self, window: TimeWindow, now: DateTime<Utc>) {
        self.days_ago = window;
        self.transition(QueryEvent::WindowChanged { window, now });
    }

    /// Stop reacting to input and drop any keyword that has not settled yet
    pub fn teardown(&mut self) {
        self.attached = false;
        self.keyword_generation += 1;
        self.keyword_debounce.cancel();
    }

    /// Wait for the next background message and apply it.
    /// Returns `false` once no more messages can arrive.
    pub async fn process_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(message) => {
                self.handle(message);
                true
            }
            None => false,
        }
    }

    pub fn handle(&mut self, message: FeedMessage) {
        match message {
            FeedMessage::KeywordSettled {
                generation,
                keyword,
            } => {
                if generation != self.keyword_generation {
                    debug!(
                        generation,
                        latest = self.keyword_generation,
                        "Ignoring outdated keyword"
                    );
                    return;
                }
                self.transition(QueryEvent::KeywordChanged(keyword));
            }
            FeedMessage::FetchCompleted { seq, result } => self.complete(seq, result),
        }
    }

    pub fn render(&self, site: &SiteMeta) -> String {
        render_videos(
            &VideosView {
                list: &self.list,
                window: self.days_ago,
                sort: self.query.sort,
                keyword: &self.query.keyword,
                is_loading: self.is_loading,
                more_href: None,
            },
            site,
        )
    }

    fn transition(&mut self, event: QueryEvent) {
        if !self.attached {
            return;
        }
        let (query, mode) = reduce(&self.query, event);
        if mode.resets_paging() {
            self.to_datas_limit = false;
        }
        self.query = query;
        self.dispatch(mode);
    }

    fn dispatch(&mut self, mode: FetchMode) {
        self.latest_seq += 1;
        let seq = self.latest_seq;
        let existing = match mode {
            FetchMode::Append => self.list.videos.clone(),
            FetchMode::Replace => Vec::new(),
        };
        let api = self.api.clone();
        let query = self.query.clone();
        let tx = self.tx.clone();

        debug!(seq, ?mode, page = query.page, "Dispatching video fetch");
        tokio::spawn(async move {
            let result = get_videos_async(api.as_ref(), existing, &query).await;
            let _ = tx.send(FeedMessage::FetchCompleted { seq, result });
        });
        self.is_loading = true;
    }

    fn complete(&mut self, seq: u64, result: Result<VideoAction, ApiError>) {
        if seq != self.latest_seq {
            debug!(seq, latest = self.latest_seq, "Discarding stale video response");
            return;
        }
        self.is_loading = false;
        match result {
            Ok(action) => {
                self.list.apply(action);
                self.commit();
            }
            Err(e) => {
                warn!(seq, page = self.query.page, error = %e, "Video fetch failed");
                self.query = self.committed.query.clone();
                self.days_ago = self.committed.days_ago;
                self.to_datas_limit = self.committed.to_datas_limit;
            }
        }
    }

    fn commit(&mut self) {
        self.committed = Committed {
            query: self.query.clone(),
            days_ago: self.days_ago,
            to_datas_limit: self.to_datas_limit,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{FakeVideoApi, video};
    use chrono::TimeZone;

    fn bottom() -> Viewport {
        Viewport {
            scroll_top: 10_000.0,
            window_height: 800.0,
            inner_height: 800.0,
            body_height: 2000.0,
            document_height: 800.0,
        }
    }

    fn feed_with(api: FakeVideoApi, held: usize) -> (Arc<FakeVideoApi>, VideoFeed<FakeVideoApi>) {
        let api = Arc::new(api);
        let list = VideoListState {
            videos: (0..held).map(|i| video(&format!("seed-{}", i))).collect(),
            total_count: api.total_count,
            token: Some("seed".to_string()),
        };
        let feed = VideoFeed::new(api.clone(), list, VideoQuery::initial(Utc::now()));
        (api, feed)
    }

    #[tokio::test]
    async fn scroll_at_bottom_appends_next_page() {
        let (api, mut feed) = feed_with(FakeVideoApi::new(35, 5), 30);

        assert!(feed.scroll(bottom()));
        assert!(feed.is_loading());
        assert_eq!(feed.query().page, 2);

        assert!(feed.process_next().await);
        assert!(!feed.is_loading());
        assert_eq!(feed.list().videos.len(), 35);
        assert_eq!(feed.list().videos[0].id, "seed-0");
        assert_eq!(feed.list().videos[30].id, "p2-0");
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn scroll_above_bottom_does_nothing() {
        let (api, mut feed) = feed_with(FakeVideoApi::new(35, 5), 30);
        let viewport = Viewport {
            scroll_top: 0.0,
            ..bottom()
        };
        assert!(!feed.scroll(viewport));
        assert!(!feed.is_loading());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn scroll_while_loading_does_not_fetch_again() {
        let (api, mut feed) = feed_with(FakeVideoApi::new(500, 30), 30);
        assert!(feed.scroll(bottom()));
        assert!(!feed.scroll(bottom()));
        assert!(!feed.scroll(bottom()));
        feed.process_next().await;
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn exhaustion_latches_and_stops_fetching() {
        // totalCount=35, count=30: page 1 may advance, page 2 trips the latch
        let (api, mut feed) = feed_with(FakeVideoApi::new(35, 5), 30);
        assert!(feed.scroll(bottom()));
        feed.process_next().await;
        assert!(!feed.is_exhausted());

        // all 35 held: latch and skip the redundant request
        assert!(!feed.scroll(bottom()));
        assert!(feed.is_exhausted());
        assert!(!feed.scroll(bottom()));
        assert_eq!(api.calls().len(), 1);
        assert_eq!(feed.query().page, 2);
    }

    #[tokio::test]
    async fn exhaustion_with_missing_videos_fetches_once_more() {
        let (api, mut feed) = feed_with(FakeVideoApi::new(35, 0), 30);
        assert!(feed.scroll(bottom()));
        feed.process_next().await;

        // page 2 is exhausted but only 30 of 35 are held
        assert!(feed.scroll(bottom()));
        assert!(feed.is_exhausted());
        feed.process_next().await;
        assert!(!feed.scroll(bottom()));
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn filter_changes_reset_paging_and_latch() {
        let (_, mut feed) = feed_with(FakeVideoApi::new(35, 5), 30);
        feed.scroll(bottom());
        feed.process_next().await;
        feed.scroll(bottom());
        assert!(feed.is_exhausted());

        feed.sort_changed(SortField::ViewCount);
        assert_eq!(feed.query().page, 1);
        assert_eq!(feed.query().sort, SortField::ViewCount);
        assert!(!feed.is_exhausted());
        assert!(feed.is_loading());

        feed.process_next().await;
        // replaced, not appended
        assert_eq!(feed.list().videos.len(), 5);
        assert_eq!(feed.list().videos[0].id, "p1-0");
    }

    #[tokio::test]
    async fn window_change_sets_start_time_from_now() {
        let (api, mut feed) = feed_with(FakeVideoApi::new(35, 5), 30);
        let now = Utc.with_ymd_and_hms(2023, 5, 20, 10, 0, 0).single().unwrap();

        feed.window_changed(TimeWindow::Week, now);
        feed.process_next().await;

        let expected = Utc.with_ymd_and_hms(2023, 5, 13, 10, 0, 0).single().unwrap();
        assert_eq!(feed.query().start_time, Some(expected));
        assert_eq!(feed.days_ago(), TimeWindow::Week);
        assert_eq!(api.calls()[0].start_time, Some(expected));
        assert_eq!(api.calls()[0].page, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn keystrokes_within_quiet_period_coalesce() {
        let (api, mut feed) = feed_with(FakeVideoApi::new(35, 5), 30);

        for keyword in ["c", "ca", "cat", "cats", "catsu"] {
            feed.keyword_input(keyword);
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        assert!(api.calls().is_empty());
        assert!(!feed.is_loading());

        // settles, then the replacing fetch completes
        assert!(feed.process_next().await);
        assert!(feed.is_loading());
        assert!(feed.process_next().await);
        assert!(!feed.is_loading());

        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].keyword, "catsu");
        assert_eq!(calls[0].page, 1);
        assert_eq!(feed.list().videos.len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_cancels_pending_keyword() {
        let (api, mut feed) = feed_with(FakeVideoApi::new(35, 5), 30);
        feed.keyword_input("cat");
        feed.teardown();

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert!(api.calls().is_empty());
        assert!(!feed.scroll(bottom()));
        assert!(!feed.is_loading());
    }

    #[tokio::test]
    async fn stale_response_is_discarded() {
        let (_, mut feed) = feed_with(FakeVideoApi::new(100, 5), 30);
        feed.sort_changed(SortField::ViewCount);
        feed.sort_changed(SortField::PublishedAt);

        // a late answer for the first request must not touch the list
        feed.handle(FeedMessage::FetchCompleted {
            seq: 1,
            result: Ok(crate::store::get_videos(vec![video("stale")], 1, "old".to_string())),
        });
        assert!(feed.is_loading());
        assert_eq!(feed.list().videos.len(), 30);

        feed.handle(FeedMessage::FetchCompleted {
            seq: 2,
            result: Ok(crate::store::get_videos(vec![video("fresh")], 1, "new".to_string())),
        });
        assert!(!feed.is_loading());
        assert_eq!(feed.list().videos[0].id, "fresh");
    }

    #[tokio::test]
    async fn unchanged_token_still_completes_request() {
        let (_, mut feed) = feed_with(FakeVideoApi::new(100, 5), 30);
        feed.sort_changed(SortField::ViewCount);
        feed.handle(FeedMessage::FetchCompleted {
            seq: 1,
            result: Ok(crate::store::get_videos(Vec::new(), 0, "seed".to_string())),
        });
        assert!(!feed.is_loading());
    }

    #[tokio::test]
    async fn failed_fetch_clears_loading_and_keeps_list() {
        let mut api = FakeVideoApi::new(100, 5);
        api.fail = true;
        let (_, mut feed) = feed_with(api, 30);

        assert!(feed.scroll(bottom()));
        feed.process_next().await;
        assert!(!feed.is_loading());
        assert_eq!(feed.list().videos.len(), 30);
    }

    #[tokio::test]
    async fn failed_page_is_requested_again_on_next_scroll() {
        let mut api = FakeVideoApi::new(500, 30);
        api.failing_calls = 1;
        let (api, mut feed) = feed_with(api, 30);

        assert!(feed.scroll(bottom()));
        feed.process_next().await;
        assert_eq!(feed.query().page, 1);

        assert!(feed.scroll(bottom()));
        feed.process_next().await;

        let pages: Vec<u32> = api.calls().iter().map(|q| q.page).collect();
        assert_eq!(pages, vec![2, 2]);
        assert_eq!(feed.list().videos.len(), 60);
        assert_eq!(feed.list().videos[30].id, "p2-0");
        assert_eq!(feed.query().page, 2);
    }

    #[tokio::test]
    async fn failed_filter_change_keeps_paging_of_held_list() {
        let mut api = FakeVideoApi::new(500, 30);
        api.failing_calls = 1;
        let (api, mut feed) = feed_with(api, 30);
        let before = feed.query().clone();

        feed.handle(FeedMessage::KeywordSettled {
            generation: 0,
            keyword: "cat".to_string(),
        });
        feed.process_next().await;
        assert_eq!(feed.query(), &before);
        assert_eq!(feed.list().videos[0].id, "seed-0");

        // the next page continues the held list's query, not the failed one
        assert!(feed.scroll(bottom()));
        feed.process_next().await;
        let calls = api.calls();
        assert_eq!(calls[0].keyword, "cat");
        assert_eq!(calls[1].keyword, "");
        assert_eq!(calls[1].page, 2);
        assert_eq!(feed.list().videos.len(), 60);
    }

    #[tokio::test]
    async fn failed_window_change_restores_selection() {
        let mut api = FakeVideoApi::new(500, 30);
        api.failing_calls = 1;
        let (_, mut feed) = feed_with(api, 30);

        feed.window_changed(TimeWindow::Month, Utc::now());
        assert_eq!(feed.days_ago(), TimeWindow::Month);
        feed.process_next().await;
        assert_eq!(feed.days_ago(), TimeWindow::Week);
    }

    #[tokio::test]
    async fn window_change_clears_latch() {
        let (_, mut feed) = feed_with(FakeVideoApi::new(35, 5), 30);
        feed.scroll(bottom());
        feed.process_next().await;
        feed.scroll(bottom());
        assert!(feed.is_exhausted());

        feed.window_changed(TimeWindow::Month, Utc::now());
        assert!(!feed.is_exhausted());
        assert_eq!(feed.query().page, 1);
        feed.process_next().await;
        assert!(!feed.is_exhausted());
        assert_eq!(feed.list().videos.len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn settled_keyword_clears_latch() {
        let (api, mut feed) = feed_with(FakeVideoApi::new(35, 5), 30);
        feed.scroll(bottom());
        feed.process_next().await;
        feed.scroll(bottom());
        assert!(feed.is_exhausted());
        assert_eq!(feed.query().page, 2);

        feed.keyword_input("cat");
        assert!(feed.process_next().await);
        assert!(!feed.is_exhausted());
        assert_eq!(feed.query().page, 1);
        assert_eq!(feed.query().keyword, "cat");

        feed.process_next().await;
        assert_eq!(api.calls().last().map(|q| q.page), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn keystroke_after_timer_fired_supersedes_sent_keyword() {
        let (api, mut feed) = feed_with(FakeVideoApi::new(35, 5), 30);

        feed.keyword_input("cat");
        tokio::time::sleep(KEYWORD_DEBOUNCE + Duration::from_millis(100)).await;
        // "cat" already sits in the queue when the next key arrives
        feed.keyword_input("cats");

        assert!(feed.process_next().await);
        assert!(!feed.is_loading());
        assert!(api.calls().is_empty());

        assert!(feed.process_next().await);
        assert!(feed.is_loading());
        feed.process_next().await;

        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].keyword, "cats");
    }

    #[tokio::test]
    async fn from_page_keeps_window_selection() {
        let api = Arc::new(FakeVideoApi::new(3, 3));
        let page = VideosPage {
            list: VideoListState::default(),
            query: VideoQuery::initial(Utc::now()),
            window: TimeWindow::Day,
        };
        assert_eq!(VideoFeed::new(api.clone(), VideoListState::default(), page.query.clone()).days_ago(), TimeWindow::Week);
        assert_eq!(VideoFeed::from_page(api, page).days_ago(), TimeWindow::Day);
    }

    #[tokio::test]
    async fn render_shows_spinner_only_while_loading() {
        let (_, mut feed) = feed_with(FakeVideoApi::new(100, 5), 2);
        let site = SiteMeta::default();
        assert!(!feed.render(&site).contains("Spinner"));

        feed.sort_changed(SortField::ViewCount);
        assert!(feed.render(&site).contains("Spinner"));
    }
}
