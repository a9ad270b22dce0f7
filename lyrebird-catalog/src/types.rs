//! Core types for catalog search results.

use serde::{Deserialize, Serialize};

/// A single track parsed from a catalog listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Track title from the entry metadata. May be empty.
    pub title: String,
    /// Performing artist from the entry metadata. May be empty.
    pub artist: String,
    /// Opaque locator for fetching the audio bytes. Taken from the
    /// listing as-is and never re-validated here.
    pub download_url: String,
    /// Track length in seconds. `0` when the listing carried no
    /// duration label or the label was unparseable.
    pub duration_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_construction() {
        let track = Track {
            title: "Intro".into(),
            artist: "Some Band".into(),
            download_url: "https://catalog.example/get/42".into(),
            duration_secs: 125,
        };
        assert_eq!(track.title, "Intro");
        assert_eq!(track.duration_secs, 125);
    }

    #[test]
    fn track_serde_round_trip() {
        let track = Track {
            title: "Song".into(),
            artist: "Artist".into(),
            download_url: "https://catalog.example/get/1".into(),
            duration_secs: 0,
        };
        let json = serde_json::to_string(&track).expect("serialize");
        let decoded: Track = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded, track);
    }
}
