//! "Youtuber許願池": recommends one random channel per visit.

use api_client::ChannelApi;
use domain::Channel;
use tracing::info;

use crate::render::{Head, escape, main_layout, title_section};
use crate::{PageError, SiteMeta};

pub const PATH: &str = "/campaigns/pickYoutuber";

const SITE_NAME: &str = "小頻道大世界 - 在這裡發掘您喜歡的Youtubers！";
const SECTION_TITLE: &str = "Youtuber許願池";
const SECTION_CONTENT: &str = "
    還不知道您喜歡的頻道類型嗎？
    或者有太多的選擇讓你無從挑選呢？
    來看看最適合您的Youtuber是誰吧！
";

#[derive(Debug, Clone, PartialEq)]
pub struct PickYoutuberPage {
    pub picked_youtuber: Channel,
}

impl PickYoutuberPage {
    /// Fetch a fresh random channel. Nothing is cached between visits.
    pub async fn load<A: ChannelApi>(api: &A) -> Result<Self, PageError> {
        let picked_youtuber = api.random_channel().await?;
        info!(channel_id = %picked_youtuber.id, "Picked youtuber");
        Ok(Self { picked_youtuber })
    }

    pub fn head(&self, site: &SiteMeta) -> Head {
        let channel = &self.picked_youtuber;
        Head::new()
            .title(channel.title.as_str())
            .meta_name("og:title", channel.title.as_str())
            .meta_name("og:description", channel.description.as_str())
            .meta_name("og:type", "website")
            .meta_name("og:image", channel.high_thumbnails.as_str())
            .meta_name("og:url", format!("{}{}", site.site_url, PATH))
            .meta_property("og:site_name", SITE_NAME)
            .meta_property("fb:app_id", site.fb_app_id.as_str())
    }

    pub fn render(&self, site: &SiteMeta) -> String {
        let channel = &self.picked_youtuber;
        let body = format!(
            "<div class=\"PickYoutuber-zone\">{section}\
             <section class=\"PickYoutuber-titleSection\">\
             <h1 class=\"PickYoutuber-title\">最適合您的Youtuber是</h1>\
             <a href=\"/channels/singleChannel?channelId={id}\">\
             <span class=\"PickYoutuber-channelTitle\">{title}</span></a>\
             <figure class=\"PickYoutuber-image\"><img src=\"{thumb}\"></figure>\
             <p class=\"PickYoutuber-description\">{description}</p>\
             </section></div>",
            section = title_section(SECTION_TITLE, SECTION_CONTENT),
            id = escape(&channel.id),
            title = escape(&channel.title),
            thumb = escape(&channel.high_thumbnails),
            description = escape(&channel.description),
        );
        main_layout(&self.head(site), &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_client::ApiError;

    struct FixedChannel(Option<Channel>);

    impl ChannelApi for FixedChannel {
        async fn random_channel(&self) -> Result<Channel, ApiError> {
            self.0.clone().ok_or(ApiError::Status {
                url: "/api/channels/random".to_string(),
                status: 404,
            })
        }
    }

    fn channel() -> Channel {
        Channel {
            id: "UC<1>".to_string(),
            title: "阿滴英文".to_string(),
            description: "Learn English & have fun".to_string(),
            high_thumbnails: "https://img.example/adi.jpg".to_string(),
        }
    }

    #[tokio::test]
    async fn renders_metadata_from_picked_channel() {
        let page = PickYoutuberPage::load(&FixedChannel(Some(channel())))
            .await
            .unwrap();
        let html = page.render(&SiteMeta::default());

        assert!(html.contains("<title>阿滴英文</title>"));
        assert!(html.contains("<meta name=\"og:title\" content=\"阿滴英文\">"));
        assert!(html.contains(
            "<meta name=\"og:description\" content=\"Learn English &amp; have fun\">"
        ));
        assert!(html.contains("<meta name=\"og:type\" content=\"website\">"));
        assert!(html.contains("<meta name=\"og:image\" content=\"https://img.example/adi.jpg\">"));
        assert!(html.contains(
            "<meta name=\"og:url\" content=\"https://www.youtuberspy.com/campaigns/pickYoutuber\">"
        ));
        assert!(html.contains("<meta property=\"og:site_name\" content=\"小頻道大世界"));
        assert!(html.contains("<meta property=\"fb:app_id\" content=\"158925374651334\">"));
    }

    #[tokio::test]
    async fn links_to_channel_detail_page() {
        let page = PickYoutuberPage {
            picked_youtuber: channel(),
        };
        let html = page.render(&SiteMeta::default());
        assert!(html.contains("href=\"/channels/singleChannel?channelId=UC&lt;1&gt;\""));
        assert!(html.contains("最適合您的Youtuber是"));
        assert!(html.contains("Youtuber許願池"));
    }

    #[tokio::test]
    async fn fetch_failure_is_returned() {
        let result = PickYoutuberPage::load(&FixedChannel(None)).await;
        assert!(matches!(result, Err(PageError::Fetch(_))));
    }
}
