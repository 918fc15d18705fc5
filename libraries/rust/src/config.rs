use crate::error::Error;
use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.refinitiv.com/user-data/portfolio-management/v1/";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const BASE_URL_VARIABLE: &str = "PAM_BASE_URL";

const ACCESS_TOKEN_VARIABLE: &str = "PAM_ACCESS_TOKEN";

const TIMEOUT_VARIABLE: &str = "PAM_TIMEOUT_SECONDS";

/// Connection settings for the portfolio-management API.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    /// Sent as a bearer token when present.
    pub access_token: Option<String>,
    pub timeout: Duration,
}

impl Config {
    /// Settings for the public API base, [`DEFAULT_BASE_URL`].
    pub fn public(access_token: Option<String>) -> Result<Self, Error> {
        Config::new(DEFAULT_BASE_URL, access_token)
    }

    pub fn new(base_url: &str, access_token: Option<String>) -> Result<Self, Error> {
        Ok(Config {
            base_url: parse_base_url(base_url)?,
            access_token,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Build a configuration from `PAM_BASE_URL`, `PAM_ACCESS_TOKEN` and
    /// `PAM_TIMEOUT_SECONDS`, falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self, Error> {
        let base_url = env::var(BASE_URL_VARIABLE).unwrap_or(DEFAULT_BASE_URL.to_string());

        let access_token = env::var(ACCESS_TOKEN_VARIABLE)
            .ok()
            .filter(|token| !token.is_empty());

        let timeout = match env::var(TIMEOUT_VARIABLE) {
            Ok(value) => Duration::from_secs(value.parse::<u64>().map_err(|e| {
                Error::Other(format!("{TIMEOUT_VARIABLE} is not a number of seconds: {e}"))
            })?),
            Err(_) => DEFAULT_TIMEOUT,
        };

        Ok(Config {
            base_url: parse_base_url(&base_url)?,
            access_token,
            timeout,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// Url::join drops the last segment unless the base ends with a slash.
fn parse_base_url(base_url: &str) -> Result<Url, Error> {
    let mut normalized = base_url.to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }

    Ok(Url::parse(&normalized)?)
}
