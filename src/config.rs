//! Runtime configuration, read from the environment once at startup.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub upload_root: PathBuf,
    pub data_root: PathBuf,
    pub gemini_api_key: String,
    pub gemini_model: String,
    /// How long a cached assessment stays valid. Unset means cache entries
    /// never expire, matching the write-once cache behavior.
    pub assessment_cache_ttl: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:8000"),
            upload_root: env_or("UPLOAD_ROOT", "uploads").into(),
            data_root: env_or("DATA_ROOT", "data").into(),
            gemini_api_key: env_or("GOOGLE_API_KEY", ""),
            gemini_model: env_or("GEMINI_MODEL", "gemini-2.0-flash"),
            assessment_cache_ttl: std::env::var("ASSESSMENT_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
