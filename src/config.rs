use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{AskbotError, Result};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_ASK_PATH: &str = "/ask";

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_ask_path() -> String {
    DEFAULT_ASK_PATH.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_ask_path")]
    pub ask_path: String,
    /// `None` waits for the backend indefinitely.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::convention_defaults()
    }
}

impl ClientConfig {
    pub fn convention_defaults() -> Self {
        Self {
            server_url: default_server_url(),
            ask_path: default_ask_path(),
            timeout_seconds: None,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| AskbotError::Config(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| AskbotError::Config(format!("{}: {e}", path.display())))
    }

    /// An explicit path must exist. The fallback path is optional and
    /// silently skipped when absent.
    pub fn load(explicit: Option<&Path>, fallback: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if fallback.is_file() => Self::from_file(fallback),
            None => Ok(Self::convention_defaults()),
        }
    }

    pub fn with_overrides(
        mut self,
        server_url: Option<String>,
        ask_path: Option<String>,
        timeout_seconds: Option<u64>,
    ) -> Self {
        if let Some(server_url) = server_url {
            self.server_url = server_url;
        }
        if let Some(ask_path) = ask_path {
            self.ask_path = ask_path;
        }
        if timeout_seconds.is_some() {
            self.timeout_seconds = timeout_seconds;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        let server_url = self.server_url.trim();
        if server_url.is_empty() {
            return Err(AskbotError::Config("server_url must not be empty".to_string()));
        }
        if !server_url.starts_with("http://") && !server_url.starts_with("https://") {
            return Err(AskbotError::Config(format!(
                "server_url must start with http:// or https://, got '{server_url}'"
            )));
        }
        if self.ask_path.trim().is_empty() {
            return Err(AskbotError::Config("ask_path must not be empty".to_string()));
        }
        if self.timeout_seconds == Some(0) {
            return Err(AskbotError::Config(
                "timeout_seconds must be positive; omit it to wait indefinitely".to_string(),
            ));
        }
        Ok(())
    }

    pub fn ask_url(&self) -> String {
        let path = self.ask_path.trim();
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.server_url.trim().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}
