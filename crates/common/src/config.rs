//! CLI configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// File name searched for in the config directories
pub const CONFIG_FILE_NAME: &str = "virtuoso-config.yaml";

/// api-cli configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API connection details
    pub api: ApiConfig,

    /// Organization the token belongs to
    pub organization: OrganizationConfig,

    /// Client identification headers
    pub headers: HeadersConfig,

    /// Output defaults
    pub output: OutputConfig,

    /// HTTP client settings
    pub http: HttpConfig,

    /// Session behaviour
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub auth_token: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api-app2.virtuoso.qa/api".to_string(),
            auth_token: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationConfig {
    pub id: String,
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            id: "2242".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadersConfig {
    pub client_id: String,
    pub client_name: String,
}

impl Default for HeadersConfig {
    fn default() -> Self {
        Self {
            client_id: "api-cli-generator".to_string(),
            client_name: "api-cli-generator".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// One of human, json, yaml, ai
    pub default_format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_format: "human".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout: u64,

    /// Extra attempts for transient failures
    pub retries: u32,

    /// Seconds between attempts
    pub retry_wait: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            retries: 3,
            retry_wait: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Bump the stored position after each auto-positioned step
    pub auto_increment_position: bool,

    /// Session file location (defaults to ~/.api-cli/session.json)
    pub file: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_increment_position: true,
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults when it is absent
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            debug!(path = %path.display(), "loading configuration");
            let content = std::fs::read_to_string(path)?;
            if content.trim().is_empty() {
                return Ok(Self::default());
            }
            let config: Self = serde_yaml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Locate and load the configuration, then apply environment overrides.
    ///
    /// An explicit path wins. Otherwise `./config/virtuoso-config.yaml` and
    /// `~/.api-cli/virtuoso-config.yaml` are tried in order.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::InvalidConfig(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Some(path.to_path_buf())
            }
            None => Self::search_paths().into_iter().find(|p| p.exists()),
        };

        let mut config = match path {
            Some(path) => Self::load(&path)?,
            None => {
                warn!(
                    "no config file found, using defaults (create ./config/{})",
                    CONFIG_FILE_NAME
                );
                Self::default()
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Candidate config locations, most specific first
    pub fn search_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from("config").join(CONFIG_FILE_NAME),
            crate::default_store_path().join(CONFIG_FILE_NAME),
        ]
    }

    /// Apply `VIRTUOSO_*` overrides from the given lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(token) = non_empty("VIRTUOSO_API_TOKEN") {
            self.api.auth_token = token;
        }
        if let Some(url) = non_empty("VIRTUOSO_BASE_URL") {
            self.api.base_url = url;
        }
        if let Some(org) = non_empty("VIRTUOSO_ORG_ID") {
            self.organization.id = org;
        }
        if let Some(format) = non_empty("VIRTUOSO_OUTPUT") {
            self.output.default_format = format;
        }
    }

    /// Check the settings needed before any request is sent
    pub fn validate(&self) -> Result<()> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(Error::InvalidConfig("api.base_url is not set".to_string()));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::InvalidConfig(format!(
                "api.base_url must start with http:// or https://, got '{}'",
                base_url
            )));
        }
        if self.api.auth_token.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "API token not configured. Set api.auth_token or VIRTUOSO_API_TOKEN".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the session file path
    pub fn session_path(&self) -> PathBuf {
        self.session
            .file
            .clone()
            .unwrap_or_else(crate::default_session_path)
    }
}
