//! # lyrebird-catalog
//!
//! Scraping client for the music catalog site backing Lyrebird.
//!
//! The catalog has no API; this crate issues a search request against its
//! HTML listing page, extracts structured tracks with CSS selectors, and
//! fetches audio payloads from the download links the listing carries.
//!
//! ## Design
//!
//! - One search request per query; no crawling, no pagination of the
//!   catalog side
//! - Listing order is preserved verbatim; no client-side sorting
//! - Broken listing entries are skipped silently, never failing a search
//! - User-Agent rotation on every request
//! - Search queries are logged only at trace level

pub mod config;
pub mod duration;
pub mod error;
pub mod http;
pub mod query;
pub mod types;

mod parse;

pub use config::CatalogConfig;
pub use error::{CatalogError, Result};
pub use types::Track;

use bytes::Bytes;

/// Search the catalog for tracks matching a free-text query.
///
/// Issues `GET {base_url}/search?q=<query>` and parses the resulting
/// listing. The query is sent as given; normalize it first with
/// [`query::normalize`] if it comes from raw chat input.
///
/// # Errors
///
/// Returns [`CatalogError::Unavailable`] when the request cannot be
/// completed or the catalog answers with a non-success status. An empty
/// result list is not an error.
pub async fn search(search_query: &str, config: &CatalogConfig) -> Result<Vec<Track>> {
    config.validate()?;
    tracing::trace!(query = search_query, "catalog search");

    let client = http::build_client(config)?;
    let endpoint = format!("{}/search", config.base_url.trim_end_matches('/'));

    let response = client
        .get(&endpoint)
        .query(&[("q", search_query)])
        .send()
        .await
        .map_err(|e| CatalogError::Unavailable(format!("search request failed: {e}")))?
        .error_for_status()
        .map_err(|e| CatalogError::Unavailable(format!("search returned error status: {e}")))?;

    let html = response
        .text()
        .await
        .map_err(|e| CatalogError::Unavailable(format!("search response read failed: {e}")))?;

    tracing::trace!(bytes = html.len(), "catalog response received");

    parse::parse_listing(&html, &config.base_url)
}

/// Fetch an audio payload in full from a track's download locator.
///
/// # Errors
///
/// Returns [`CatalogError::Unavailable`] when the payload cannot be
/// retrieved. The caller decides whether and when to retry.
pub async fn download(url: &str, config: &CatalogConfig) -> Result<Bytes> {
    config.validate()?;

    let client = http::build_client(config)?;
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| CatalogError::Unavailable(format!("download request failed: {e}")))?
        .error_for_status()
        .map_err(|e| CatalogError::Unavailable(format!("download returned error status: {e}")))?;

    let payload = response
        .bytes()
        .await
        .map_err(|e| CatalogError::Unavailable(format!("download read failed: {e}")))?;

    tracing::debug!(bytes = payload.len(), "audio payload downloaded");
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_validates_config_empty_base_url() {
        let config = CatalogConfig {
            base_url: String::new(),
            ..Default::default()
        };
        let result = search("test", &config).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("base_url"));
    }

    #[tokio::test]
    async fn search_validates_config_zero_timeout() {
        let config = CatalogConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        let result = search("test", &config).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout"));
    }

    #[tokio::test]
    async fn download_validates_config() {
        let config = CatalogConfig {
            base_url: String::new(),
            ..Default::default()
        };
        let result = download("https://cdn.example.com/get/1", &config).await;
        assert!(result.is_err());
    }
}
