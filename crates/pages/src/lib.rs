//! Server rendered pages of the YoutuberSpy site.
//!
//! * [`pick_youtuber`]: the random channel recommendation page
//! * [`videos`]: the filterable video listing and its infinite scroll controller
//!
//! Both pages fetch through the collaborator traits in `api_client` and render
//! plain HTML strings through [`render`].

pub mod error;
pub mod pick_youtuber;
pub mod render;
pub mod store;
pub mod videos;

pub use error::PageError;

/// Site-wide values that end up in document metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteMeta {
    /// Absolute origin without a trailing slash, e.g. `https://www.youtuberspy.com`
    pub site_url: String,
    pub fb_app_id: String,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            site_url: "https://www.youtuberspy.com".to_string(),
            fb_app_id: "158925374651334".to_string(),
        }
    }
}
