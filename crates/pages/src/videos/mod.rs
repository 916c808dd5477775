//! Video listing page: filter bar, card grid and infinite scroll.

pub mod debounce;
pub mod feed;
pub mod query;
pub mod scroll;

use api_client::VideoApi;
use chrono::{DateTime, Utc};
use domain::{SortField, TimeWindow, VideoQuery};
use std::fmt::Write;
use tracing::info;
use url::form_urlencoded;

pub use feed::{FeedMessage, KEYWORD_DEBOUNCE, VideoFeed};
pub use query::{FetchMode, QueryEvent, on_bottom_reached};
pub use scroll::Viewport;

use crate::render::{Head, escape, main_layout, spinner, youtube_video_card};
use crate::store::{VideoListState, get_videos};
use crate::{PageError, SiteMeta};

pub const PATH: &str = "/videos";

/// Optional filters carried in the page URL, so a filtered listing can be linked
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideosParams {
    pub keyword: Option<String>,
    pub sort: Option<SortField>,
    pub days_ago: Option<u32>,
    /// 1-based page of the filtered listing
    pub page: Option<u32>,
}

impl VideosParams {
    /// The initial query with these filters applied through the same transitions
    /// the interactive controls use
    pub fn to_query(&self, now: DateTime<Utc>) -> Result<(VideoQuery, TimeWindow), PageError> {
        let mut query = VideoQuery::initial(now);
        let mut window = TimeWindow::Day;

        if let Some(days) = self.days_ago {
            window = TimeWindow::from_days(days)?;
            query = query::reduce(&query, QueryEvent::WindowChanged { window, now }).0;
        }
        if let Some(sort) = self.sort {
            query = query::reduce(&query, QueryEvent::SortChanged(sort)).0;
        }
        if let Some(keyword) = self.keyword.as_ref().filter(|k| !k.is_empty()) {
            query = query::reduce(&query, QueryEvent::KeywordChanged(keyword.clone())).0;
        }
        // filters always land on page 1, so paging is applied last
        if let Some(page) = self.page.filter(|page| *page > 1) {
            query.page = page;
        }
        Ok((query, window))
    }
}

/// First page of the listing as fetched before rendering
#[derive(Debug, Clone, PartialEq)]
pub struct VideosPage {
    pub list: VideoListState,
    pub query: VideoQuery,
    pub window: TimeWindow,
}

impl VideosPage {
    pub async fn load<A: VideoApi>(
        api: &A,
        params: &VideosParams,
        now: DateTime<Utc>,
    ) -> Result<Self, PageError> {
        let (query, window) = params.to_query(now)?;
        let page = api.all_videos(&query).await?;
        info!(
            returned = page.datas.len(),
            total_count = page.total_count,
            "Loaded video listing"
        );

        let mut list = VideoListState::default();
        list.apply(get_videos(page.datas, page.total_count, page.token));
        Ok(Self {
            list,
            query,
            window,
        })
    }

    /// Page the "more" link leads to, decided the same way as reaching the
    /// bottom of the list. `None` once every video has been shown.
    pub fn next_page(&self) -> Option<u32> {
        let held = self.query.offset() + self.list.videos.len();
        let decision = on_bottom_reached(&self.query, held, self.list.total_count);
        let more = decision.fetch
            && !self.list.videos.is_empty()
            && (held as u64) < self.list.total_count;
        more.then(|| self.query.page + 1)
    }

    /// Link to `page` of this listing with the current filters
    pub fn page_href(&self, page: u32) -> String {
        let mut params = form_urlencoded::Serializer::new(String::new());
        if !self.query.keyword.is_empty() {
            params.append_pair("keyword", &self.query.keyword);
        }
        params
            .append_pair("sort", self.query.sort.as_str())
            .append_pair("daysAgo", &self.window.days().to_string())
            .append_pair("page", &page.to_string());
        format!("{}?{}", PATH, params.finish())
    }

    pub fn render(&self, site: &SiteMeta) -> String {
        render_videos(
            &VideosView {
                list: &self.list,
                window: self.window,
                sort: self.query.sort,
                keyword: &self.query.keyword,
                is_loading: false,
                more_href: self.next_page().map(|page| self.page_href(page)),
            },
            site,
        )
    }
}

/// Everything the listing markup depends on
pub(crate) struct VideosView<'a> {
    pub list: &'a VideoListState,
    pub window: TimeWindow,
    pub sort: SortField,
    pub keyword: &'a str,
    pub is_loading: bool,
    pub more_href: Option<String>,
}

pub(crate) fn render_videos(view: &VideosView<'_>, site: &SiteMeta) -> String {
    let loading = if view.is_loading { spinner() } else { "" };

    let mut sort_options = String::new();
    for field in SortField::ALL {
        let _ = write!(
            sort_options,
            "<option value=\"{}\"{}>{}</option>",
            field.as_str(),
            if field == view.sort { " selected" } else { "" },
            field.label()
        );
    }

    let mut window_options = String::new();
    for window in TimeWindow::ALL {
        let _ = write!(
            window_options,
            "<option value=\"{}\"{}>{}</option>",
            window.days(),
            if window == view.window { " selected" } else { "" },
            window.label()
        );
    }

    let cards: String = view.list.videos.iter().map(youtube_video_card).collect();
    let trailing = match (&view.more_href, view.is_loading) {
        (_, true) => format!("<div class=\"Videos-loadingButton\">{}</div>", spinner()),
        (Some(href), false) => format!(
            "<a class=\"Videos-more\" href=\"{}\">更多影片</a>",
            escape(href)
        ),
        (None, false) => String::new(),
    };

    let body = format!(
        "<div class=\"Videos-zone\"><form class=\"Videos-functionBar\" method=\"get\" action=\"{path}\">\
         <div>{loading}</div>\
         <div><span>關鍵字：</span><input name=\"keyword\" placeholder=\"輸入關鍵字\" value=\"{keyword}\"></div>\
         <div><span>排序：</span><select name=\"sort\">{sort_options}</select></div>\
         <div><span>時間：</span><select name=\"daysAgo\">{window_options}</select></div>\
         </form>\
         <div class=\"Videos-contentZone\" data-total-count=\"{total}\">{cards}{trailing}</div></div>",
        path = PATH,
        keyword = escape(view.keyword),
        total = view.list.total_count,
    );

    let head = Head::new()
        .meta_name("og:title", "youtuber spy")
        .meta_name("og:url", format!("{}{}", site.site_url, PATH));
    main_layout(&head, &body)
}
