// src/common/config.rs
//! Client configuration loaded from the environment (and `.env`)

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the MyList API, without a trailing slash
    pub api_url: String,
    /// File holding the session token between runs
    pub token_path: PathBuf,
    pub http_timeout: Duration,
}

impl Config {
    /// Reads `MYLIST_API_URL`, `MYLIST_TOKEN_PATH` and `MYLIST_HTTP_TIMEOUT_SECS`.
    ///
    /// An empty API URL is not rejected here so that a command-line override
    /// can still supply one; `ApiClient::new` refuses to start without it.
    pub fn from_env() -> Self {
        let api_url = env::var("MYLIST_API_URL").unwrap_or_default();

        let token_path = match env::var("MYLIST_TOKEN_PATH") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path.trim()),
            _ => default_token_path(),
        };

        let http_timeout = Duration::from_secs(parse_timeout_secs(
            env::var("MYLIST_HTTP_TIMEOUT_SECS").ok().as_deref(),
        ));

        let config = Self {
            api_url: normalize_api_url(&api_url),
            token_path,
            http_timeout,
        };
        info!(
            api_url = %config.api_url,
            token_path = %config.token_path.display(),
            timeout_secs = config.http_timeout.as_secs(),
            "Configuration loaded"
        );
        config
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = normalize_api_url(api_url);
        self
    }
}

/// `$HOME/.config/mylist/token`, or `./.mylist-token` when no home is known
pub fn default_token_path() -> PathBuf {
    match home::home_dir() {
        Some(home) => home.join(".config").join("mylist").join("token"),
        None => {
            warn!("Home directory not found, storing the session token in the working directory");
            PathBuf::from(".mylist-token")
        }
    }
}

pub fn normalize_api_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn parse_timeout_secs(raw: Option<&str>) -> u64 {
    match raw {
        None => DEFAULT_HTTP_TIMEOUT_SECS,
        Some(value) => match value.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => secs,
            _ => {
                warn!(
                    value = %value,
                    "Invalid MYLIST_HTTP_TIMEOUT_SECS, using default of {}s",
                    DEFAULT_HTTP_TIMEOUT_SECS
                );
                DEFAULT_HTTP_TIMEOUT_SECS
            }
        },
    }
}
