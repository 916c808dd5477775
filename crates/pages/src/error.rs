use api_client::ApiError;
use domain::QueryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("failed to fetch page data: {0}")]
    Fetch(#[from] ApiError),

    #[error("invalid page parameters: {0}")]
    Params(#[from] QueryError),
}
