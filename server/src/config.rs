use std::{env, fmt::Display, str::FromStr};

use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
#[error("invalid value for {key}: {message}")]
pub struct ConfigError {
    pub key: &'static str,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Where the pages fetch channels and videos from
    pub api_base_url: String,
    pub site_url: String,
    pub fb_app_id: String,
    pub seed_channels: usize,
    pub seed_videos: usize,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let port: u16 = try_load("PORT", "8080")?;
        let api_base_url = var_or("API_BASE_URL", &format!("http://127.0.0.1:{port}"));

        Ok(Self {
            port,
            api_base_url,
            site_url: try_load::<String>("SITE_URL", "https://www.youtuberspy.com")?
                .trim_end_matches('/')
                .to_string(),
            fb_app_id: try_load("FB_APP_ID", "158925374651334")?,
            seed_channels: try_load("SEED_CHANNELS", "20")?,
            seed_videos: try_load("SEED_VIDEOS", "200")?,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    var_or(key, default)
        .parse()
        .map_err(|e: T::Err| ConfigError {
            key,
            message: e.to_string(),
        })
}
