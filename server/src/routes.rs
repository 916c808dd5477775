use std::sync::Arc;

use api_client::{ChannelApi, VideoApi};
use axum::{
    extract::{Query, State, rejection::QueryRejection},
    response::Html,
};
use chrono::Utc;
use domain::SortField;
use pages::{
    pick_youtuber::PickYoutuberPage,
    videos::{VideosPage, VideosParams},
};
use serde::Deserialize;

use crate::{error::AppError, state::AppState};

/// Filters accepted in the `/videos` URL
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideosUrlParams {
    pub keyword: Option<String>,
    pub sort: Option<SortField>,
    pub days_ago: Option<u32>,
    pub page: Option<u32>,
}

pub async fn pick_youtuber_handler<A>(
    State(state): State<Arc<AppState<A>>>,
) -> Result<Html<String>, AppError>
where
    A: ChannelApi + VideoApi + 'static,
{
    let page = PickYoutuberPage::load(&state.api).await?;
    Ok(Html(page.render(&state.site)))
}

pub async fn videos_handler<A>(
    State(state): State<Arc<AppState<A>>>,
    params: Result<Query<VideosUrlParams>, QueryRejection>,
) -> Result<Html<String>, AppError>
where
    A: ChannelApi + VideoApi + 'static,
{
    let Query(params) = params?;
    let params = VideosParams {
        keyword: params.keyword,
        sort: params.sort,
        days_ago: params.days_ago,
        page: params.page,
    };
    let page = VideosPage::load(&state.api, &params, Utc::now()).await?;
    Ok(Html(page.render(&state.site)))
}
