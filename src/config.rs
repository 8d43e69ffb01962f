use std::{env, fmt::Display, net::SocketAddr, path::PathBuf, str::FromStr};

use anyhow::Context;
use tracing::{info, warn};

const DEFAULT_SESSION_SECRET: &str = "supersecret";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub video_dir: PathBuf,
    pub session_secret: String,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let session_secret = var("SESSION_SECRET").unwrap_or_else(|_| {
            warn!("SESSION_SECRET not set, sessions are signed with the development secret");
            DEFAULT_SESSION_SECRET.to_string()
        });
        Ok(Self {
            host: try_load("HOST", "127.0.0.1")?,
            port: try_load("PORT", "3001")?,
            database_url: try_load("DATABASE_URL", "sqlite://app.db")?,
            upload_dir: try_load("UPLOAD_DIR", "uploads")?,
            video_dir: try_load("VIDEO_DIR", "videos")?,
            session_secret,
            max_upload_bytes: try_load("MAX_UPLOAD_BYTES", "536870912")?,
        })
    }

    pub fn address(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .context("HOST and PORT do not form a socket address")
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| ())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid {key} value: {e}"))
}
