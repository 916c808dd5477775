//! HTML building blocks shared by both pages.

use domain::Video;
use std::fmt::Write;

/// Escape text for use in element content and double quoted attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Contents of the document `<head>`
#[derive(Debug, Default, Clone)]
pub struct Head {
    title: Option<String>,
    metas: Vec<(&'static str, &'static str, String)>,
}

impl Head {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// `<meta name=... content=...>`
    pub fn meta_name(mut self, name: &'static str, content: impl Into<String>) -> Self {
        self.metas.push(("name", name, content.into()));
        self
    }

    /// `<meta property=... content=...>`
    pub fn meta_property(mut self, property: &'static str, content: impl Into<String>) -> Self {
        self.metas.push(("property", property, content.into()));
        self
    }

    fn render(&self) -> String {
        let mut out = String::from("<meta charset=\"utf-8\">");
        if let Some(title) = &self.title {
            let _ = write!(out, "<title>{}</title>", escape(title));
        }
        for (attr, key, content) in &self.metas {
            let _ = write!(
                out,
                "<meta {}=\"{}\" content=\"{}\">",
                attr,
                key,
                escape(content)
            );
        }
        out
    }
}

/// Full document around `body`, with the site header and footer
pub fn main_layout(head: &Head, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"zh-Hant\"><head>{}</head><body>\
         <header class=\"MainLayout-header\"><a href=\"/\">YoutuberSpy</a>\
         <nav><a href=\"/videos\">影片</a><a href=\"/campaigns/pickYoutuber\">Youtuber許願池</a></nav></header>\
         <main class=\"MainLayout-main\">{}</main>\
         <footer class=\"MainLayout-footer\">小頻道大世界</footer></body></html>",
        head.render(),
        body
    )
}

/// Heading block with a short introduction under it
pub fn title_section(title: &str, content: &str) -> String {
    format!(
        "<section class=\"TitleSection\"><h2 class=\"TitleSection-title\">{}</h2>\
         <p class=\"TitleSection-content\">{}</p></section>",
        escape(title),
        escape(content.trim())
    )
}

pub fn spinner() -> &'static str {
    "<span class=\"Spinner\" role=\"status\" aria-label=\"loading\"></span>"
}

pub fn youtube_video_card(video: &Video) -> String {
    format!(
        "<article class=\"YoutubeVideoCard\" data-id=\"{id}\">\
         <a href=\"https://www.youtube.com/watch?v={id}\" target=\"_blank\" rel=\"noopener\">\
         <img class=\"YoutubeVideoCard-image\" src=\"{thumb}\" alt=\"{title}\">\
         <h3 class=\"YoutubeVideoCard-title\">{title}</h3></a>\
         <a class=\"YoutubeVideoCard-channel\" href=\"/channels/singleChannel?channelId={channel_id}\">{channel}</a>\
         <p class=\"YoutubeVideoCard-meta\">{views} 次觀看 · {published}</p></article>",
        id = escape(&video.id),
        thumb = escape(&video.high_thumbnails),
        title = escape(&video.title),
        channel_id = escape(&video.channel_id),
        channel = escape(&video.channel_title),
        views = video.view_count,
        published = video.published_at.format("%Y-%m-%d"),
    )
}
