//! Error types for the lyrebird-catalog crate.
//!
//! All errors use stable string messages suitable for logging and
//! programmatic handling. User-facing wording lives in the bot layer,
//! not here.

/// Errors that can occur while talking to the music catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog could not be reached, or responded with a
    /// non-success status.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),

    /// Failed to parse the catalog listing HTML.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid catalog configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for lyrebird-catalog results.
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unavailable() {
        let err = CatalogError::Unavailable("connection refused".into());
        assert_eq!(err.to_string(), "catalog unavailable: connection refused");
    }

    #[test]
    fn display_parse() {
        let err = CatalogError::Parse("invalid listing selector".into());
        assert_eq!(err.to_string(), "parse error: invalid listing selector");
    }

    #[test]
    fn display_config() {
        let err = CatalogError::Config("base_url must not be empty".into());
        assert_eq!(err.to_string(), "config error: base_url must not be empty");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CatalogError>();
    }
}
