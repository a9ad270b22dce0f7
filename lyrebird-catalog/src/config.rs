//! Catalog client configuration with sensible defaults.

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};

/// Configuration for catalog search and download requests.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL of the catalog site. The search endpoint is
    /// `{base_url}/search?q=<query>`.
    pub base_url: String,
    /// HTTP request timeout in seconds, applied to both search and
    /// audio download requests.
    pub timeout_seconds: u64,
    /// Custom User-Agent string. If `None`, rotates through a built-in
    /// list of realistic browser User-Agents.
    pub user_agent: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://rus.hitmotop.com".to_owned(),
            timeout_seconds: 15,
            user_agent: None,
        }
    }
}

impl CatalogConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `base_url` must not be empty and must parse as a URL
    /// - `timeout_seconds` must be greater than 0
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.base_url.trim().is_empty() {
            return Err(CatalogError::Config("base_url must not be empty".into()));
        }
        if url::Url::parse(&self.base_url).is_err() {
            return Err(CatalogError::Config(format!(
                "base_url is not a valid URL: {}",
                self.base_url
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(CatalogError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
