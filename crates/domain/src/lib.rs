use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod time_format;

/// Number of videos requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// Represents a channel (a "Youtuber") as shown on the recommendation page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub high_thumbnails: String,
}

/// Represents a video resource rendered by the video card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub channel_id: String,
    pub channel_title: String,
    pub title: String,
    pub description: String,
    pub high_thumbnails: String,
    #[serde(with = "time_format")]
    pub published_at: DateTime<Utc>,
    pub view_count: u64,
    pub random_number: f64,
}

/// One page of videos as answered by the video listing API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPage {
    pub datas: Vec<Video>,
    pub total_count: u64,
    /// Opaque marker that changes with every completed fetch
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("unknown sort field '{0}'")]
    UnknownSort(String),
    #[error("unknown sort order '{0}'")]
    UnknownOrder(String),
    #[error("unsupported time window of {0} days")]
    UnknownWindow(u32),
}

/// Field the video list is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    ViewCount,
    PublishedAt,
    #[default]
    RandomNumber,
}

impl SortField {
    pub const ALL: [SortField; 3] = [
        SortField::ViewCount,
        SortField::PublishedAt,
        SortField::RandomNumber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::ViewCount => "viewCount",
            SortField::PublishedAt => "publishedAt",
            SortField::RandomNumber => "randomNumber",
        }
    }

    /// Label shown in the sort selector
    pub fn label(&self) -> &'static str {
        match self {
            SortField::ViewCount => "觀看",
            SortField::PublishedAt => "時間",
            SortField::RandomNumber => "亂數排序",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| QueryError::UnknownSort(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(QueryError::UnknownOrder(other.to_string())),
        }
    }
}

/// Publication window offered by the time selector, in days before now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Day,
    Week,
    Month,
    /// 9000 days, shown as "no limit"
    Unlimited,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 4] = [
        TimeWindow::Day,
        TimeWindow::Week,
        TimeWindow::Month,
        TimeWindow::Unlimited,
    ];

    pub fn days(&self) -> u32 {
        match self {
            TimeWindow::Day => 1,
            TimeWindow::Week => 7,
            TimeWindow::Month => 30,
            TimeWindow::Unlimited => 9000,
        }
    }

    pub fn from_days(days: u32) -> Result<Self, QueryError> {
        TimeWindow::ALL
            .into_iter()
            .find(|window| window.days() == days)
            .ok_or(QueryError::UnknownWindow(days))
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeWindow::Day => "本日新片",
            TimeWindow::Week => "本週新片",
            TimeWindow::Month => "本月新片",
            TimeWindow::Unlimited => "無限制",
        }
    }

    /// Earliest publication time included by this window, relative to `now`
    pub fn start_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.days()))
    }
}

/// Filter, sort and pagination parameters of the video listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoQuery {
    #[serde(default)]
    pub sort: SortField,
    #[serde(default)]
    pub order: SortOrder,
    #[serde(default)]
    pub keyword: String,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(
        default,
        with = "time_format::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "time_format::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<DateTime<Utc>>,
}

fn first_page() -> u32 {
    1
}

fn default_count() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl VideoQuery {
    /// The query the listing page opens with: random order, published within the last day
    pub fn initial(now: DateTime<Utc>) -> Self {
        Self {
            sort: SortField::RandomNumber,
            order: SortOrder::Desc,
            keyword: String::new(),
            page: 1,
            count: DEFAULT_PAGE_SIZE,
            start_time: Some(TimeWindow::Day.start_time(now)),
            end_time: None,
        }
    }

    /// True once every page under this query has been requested.
    ///
    /// The check multiplies by `count + 1` rather than `count`, so with large
    /// totals it can trip while a page is still unrequested. Callers compare the
    /// held count against the total before skipping the last fetch.
    pub fn is_exhausted(&self, total_count: u64) -> bool {
        u64::from(self.page) * (u64::from(self.count) + 1) > total_count
    }

    /// Zero-based index of the first item on the current page
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.count as usize
    }
}
