//! Client configuration resolved from the environment, with CLI overrides applied on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;

use crate::error::{AppError, AppResult};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const TOKEN_FILE: &str = "tokens.json";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin of the REST backend; endpoint paths (`/api/...`) are joined onto it.
    pub api_base: Url,
    /// Directory holding persisted state (the token file).
    pub state_dir: PathBuf,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_base: &str, state_dir: impl Into<PathBuf>) -> AppResult<Self> {
        Ok(Self {
            api_base: parse_base(api_base)?,
            state_dir: state_dir.into(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Read `RECIPEBOX_API_URL`, `RECIPEBOX_STATE_DIR` and `RECIPEBOX_TIMEOUT_SECS`.
    pub fn from_env() -> AppResult<Self> {
        let api = std::env::var("RECIPEBOX_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let state_dir = std::env::var("RECIPEBOX_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_state_dir());
        let timeout_secs = std::env::var("RECIPEBOX_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let mut cfg = Self::new(&api, state_dir)?;
        cfg.request_timeout = Duration::from_secs(timeout_secs);
        Ok(cfg)
    }

    pub fn with_api_base(mut self, api_base: &str) -> AppResult<Self> {
        self.api_base = parse_base(api_base)?;
        Ok(self)
    }

    pub fn with_state_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.state_dir = dir.as_ref().to_path_buf();
        self
    }

    #[inline]
    pub fn token_file(&self) -> PathBuf { self.state_dir.join(TOKEN_FILE) }
}

fn default_state_dir() -> PathBuf {
    let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")).ok();
    match home {
        Some(h) => PathBuf::from(h).join(".recipebox"),
        None => PathBuf::from(".recipebox"),
    }
}

fn parse_base(s: &str) -> AppResult<Url> {
    let url = Url::parse(s).map_err(|e| AppError::validation("invalid_api_url".to_string(), format!("invalid API URL '{}': {}", s, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::validation("invalid_api_url".to_string(), format!("unsupported URL scheme '{}'", other))),
    }
}
