use crate::{Error, Result};
use std::path::PathBuf;
use url::Url;

const REQUIRED_VARS: [&str; 4] = [
    "ROOST_CDP_URL",
    "ROOST_CDP_API_KEY",
    "ROOST_USERNAME",
    "ROOST_PASSWORD",
];

/// Credentials and paths loaded once at process start
#[derive(Debug, Clone)]
pub struct Config {
    pub cdp_url: String,
    pub cdp_api_key: String,
    pub username: String,
    pub password: String,
    pub cookie_file: PathBuf,
}

impl Config {
    /// Load configuration from the process environment, failing fast when
    /// any required variable is missing or empty
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through a lookup function. Every missing required
    /// variable is collected so the error names all of them at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = Vec::with_capacity(REQUIRED_VARS.len());
        let mut missing = Vec::new();

        for var in REQUIRED_VARS {
            match lookup(var) {
                Some(value) if !value.trim().is_empty() => values.push(value),
                _ => missing.push(var),
            }
        }

        if !missing.is_empty() {
            return Err(Error::MissingEnv(missing.join(", ")));
        }

        let mut values = values.into_iter();
        let config = Self {
            cdp_url: values.next().unwrap_or_default(),
            cdp_api_key: values.next().unwrap_or_default(),
            username: values.next().unwrap_or_default(),
            password: values.next().unwrap_or_default(),
            cookie_file: lookup("ROOST_COOKIE_FILE")
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(default_cookie_file),
        };

        tracing::debug!(
            cookie_file = %config.cookie_file.display(),
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Build the remote browser connection URL with the API key appended
    /// as a query parameter
    pub fn connect_url(&self) -> Result<String> {
        let mut url = Url::parse(&self.cdp_url)?;
        url.query_pairs_mut().append_pair("apiKey", &self.cdp_api_key);
        Ok(url.into())
    }
}

fn default_cookie_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".roost")
        .join("cookies.json")
}
