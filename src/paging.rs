//! Pagination over a session's result list.
//!
//! Index 0 of the result list is the primary track, delivered the moment
//! a search completes; it never appears as a button. Pages are fixed-size
//! windows over the remainder, and each entry carries its absolute index
//! into the list, since that index is the stable key used by selection
//! actions for the lifetime of the session.

use lyrebird_catalog::Track;

/// Number of track buttons per page.
pub const PAGE_SIZE: usize = 8;

/// One rendered page of track options.
#[derive(Debug)]
pub struct TrackPage<'a> {
    /// `(absolute index, track)` pairs, in result order.
    pub entries: Vec<(usize, &'a Track)>,
    /// Whether a further page exists after this one.
    pub has_more: bool,
}

/// Compute the entries of page `page_number` over `tracks`.
///
/// Page `p` covers indices `[1 + p*8, 1 + p*8 + 8)` intersected with the
/// valid range. An out-of-range page yields empty entries and
/// `has_more = false`; that is "nothing to render", not an error.
pub fn page(tracks: &[Track], page_number: usize) -> TrackPage<'_> {
    let start = page_number.saturating_mul(PAGE_SIZE).saturating_add(1);
    if start >= tracks.len() {
        return TrackPage {
            entries: Vec::new(),
            has_more: false,
        };
    }
    let end = start.saturating_add(PAGE_SIZE).min(tracks.len());
    let entries = tracks[start..end]
        .iter()
        .enumerate()
        .map(|(offset, track)| (start + offset, track))
        .collect();
    TrackPage {
        entries,
        has_more: end < tracks.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tracks(count: usize) -> Vec<Track> {
        (0..count)
            .map(|i| Track {
                title: format!("Track {i}"),
                artist: "Artist".into(),
                download_url: format!("https://cdn.example.com/get/{i}"),
                duration_secs: 200,
            })
            .collect()
    }

    #[test]
    fn twelve_tracks_page_zero() {
        let tracks = make_tracks(12);
        let page0 = page(&tracks, 0);
        let indices: Vec<usize> = page0.entries.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(page0.has_more);
    }

    #[test]
    fn twelve_tracks_page_one() {
        let tracks = make_tracks(12);
        let page1 = page(&tracks, 1);
        let indices: Vec<usize> = page1.entries.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![9, 10, 11]);
        assert!(!page1.has_more);
    }

    #[test]
    fn twelve_tracks_page_two_is_empty() {
        let tracks = make_tracks(12);
        let page2 = page(&tracks, 2);
        assert!(page2.entries.is_empty());
        assert!(!page2.has_more);
    }

    #[test]
    fn eight_tracks_fit_on_page_zero_without_more() {
        let tracks = make_tracks(8);
        let page0 = page(&tracks, 0);
        let indices: Vec<usize> = page0.entries.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5, 6, 7]);
        assert!(!page0.has_more);
    }

    #[test]
    fn ten_tracks_have_more_after_page_zero() {
        let tracks = make_tracks(10);
        let page0 = page(&tracks, 0);
        assert_eq!(page0.entries.len(), 8);
        assert!(page0.has_more);
    }

    #[test]
    fn single_track_has_nothing_to_page() {
        let tracks = make_tracks(1);
        let page0 = page(&tracks, 0);
        assert!(page0.entries.is_empty());
        assert!(!page0.has_more);
    }

    #[test]
    fn empty_list_has_nothing_to_page() {
        let page0 = page(&[], 0);
        assert!(page0.entries.is_empty());
        assert!(!page0.has_more);
    }

    #[test]
    fn absurd_page_number_does_not_overflow() {
        let tracks = make_tracks(12);
        let result = page(&tracks, usize::MAX);
        assert!(result.entries.is_empty());
        assert!(!result.has_more);
    }

    #[test]
    fn entries_reference_tracks_by_absolute_index() {
        let tracks = make_tracks(12);
        let page1 = page(&tracks, 1);
        for (index, track) in &page1.entries {
            assert_eq!(track.title, format!("Track {index}"));
        }
    }
}
