use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A single browser cookie. Only the identifying fields are typed; every
/// other attribute the browser reports (expiry, flags, partition keys) is
/// carried through `rest` so a save/load cycle is lossless.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CookieRecord {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

/// Reads and writes the JSON cookie file used to skip repeated logins
pub struct CookieStore {
    path: PathBuf,
}

impl CookieStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load stored cookies. A missing file is not an error; it just means
    /// no login has been persisted yet.
    pub fn load(&self) -> Result<Vec<CookieRecord>> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No cookie file found");
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        let cookies: Vec<CookieRecord> = serde_json::from_str(&contents)?;
        tracing::info!(
            count = cookies.len(),
            path = %self.path.display(),
            "Loaded cookies"
        );
        Ok(cookies)
    }

    /// Persist cookies, creating parent directories as needed
    pub fn save(&self, cookies: &[CookieRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(cookies)?;
        fs::write(&self.path, json)?;
        tracing::info!(
            count = cookies.len(),
            path = %self.path.display(),
            "Saved cookies"
        );
        Ok(())
    }
}
