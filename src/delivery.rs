//! Audio delivery: resolve a track to a named payload.
//!
//! The payload is staged entirely in memory as [`Bytes`], so its release
//! is plain ownership: dropped on every exit path, whether success,
//! failure, or cancellation. A delivery attempt is independent and retriable
//! by calling again with the same [`Track`]; no retry happens here.

use bytes::Bytes;
use lyrebird_catalog::{CatalogConfig, Track};

/// Errors that can occur while delivering a track.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The audio payload could not be retrieved from the track's
    /// download locator.
    #[error("audio fetch failed: {0}")]
    FetchFailed(String),
}

/// A fully staged audio payload ready for the chat transport.
#[derive(Debug, Clone)]
pub struct AudioPayload {
    /// Display file name, `"{artist} – {title}.mp3"`.
    pub filename: String,
    /// Caption shown alongside the audio, `"{artist} – {title}"`.
    pub caption: String,
    /// The raw audio bytes.
    pub bytes: Bytes,
}

/// Display name for a track: `"{artist} – {title}"` (en-dash separator).
pub fn display_name(track: &Track) -> String {
    format!("{} – {}", track.artist, track.title)
}

/// Fetch a track's audio in full and wrap it as a named payload.
///
/// # Errors
///
/// Returns [`DeliveryError::FetchFailed`] when the payload cannot be
/// retrieved. Failure leaves no transient state behind.
pub async fn fetch_audio(
    track: &Track,
    config: &CatalogConfig,
) -> Result<AudioPayload, DeliveryError> {
    let bytes = lyrebird_catalog::download(&track.download_url, config)
        .await
        .map_err(|e| DeliveryError::FetchFailed(e.to_string()))?;

    let caption = display_name(track);
    Ok(AudioPayload {
        filename: format!("{caption}.mp3"),
        caption,
        bytes,
    })
}
