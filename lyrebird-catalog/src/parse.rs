//! Catalog listing parser.
//!
//! The catalog's search page is a plain HTML track listing. Each entry
//! carries a `data-musmeta` attribute with a small JSON object
//! (title/artist), a download anchor, and a duration label. Extracted as
//! standalone functions over `&str` for testability with mock HTML.

use crate::duration::parse_duration;
use crate::error::CatalogError;
use crate::types::Track;
use scraper::{Html, Selector};
use serde::Deserialize;
use url::Url;

/// Entry-embedded metadata object carried in `data-musmeta`.
#[derive(Debug, Deserialize)]
struct TrackMeta {
    #[serde(default)]
    title: String,
    #[serde(default)]
    artist: String,
}

/// Parse a catalog search response into tracks, in listing order.
///
/// Entries with missing or unparseable metadata, or without a download
/// anchor, are skipped silently; one broken entry must not fail the
/// whole search. A missing duration label yields `duration_secs = 0`.
pub(crate) fn parse_listing(html: &str, base_url: &str) -> Result<Vec<Track>, CatalogError> {
    let document = Html::parse_document(html);

    let item_sel = Selector::parse("ul.tracks__list li.tracks__item")
        .map_err(|e| CatalogError::Parse(format!("invalid item selector: {e:?}")))?;
    let download_sel = Selector::parse("a.track__download-btn")
        .map_err(|e| CatalogError::Parse(format!("invalid download selector: {e:?}")))?;
    let time_sel = Selector::parse(".track__fulltime")
        .map_err(|e| CatalogError::Parse(format!("invalid duration selector: {e:?}")))?;

    let base = Url::parse(base_url).ok();
    let mut tracks = Vec::new();

    for item in document.select(&item_sel) {
        let meta_attr = match item.value().attr("data-musmeta") {
            Some(raw) => raw,
            None => continue,
        };
        let meta: TrackMeta = match serde_json::from_str(meta_attr) {
            Ok(meta) => meta,
            Err(_) => continue,
        };

        let href = match item
            .select(&download_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
        {
            Some(href) => href.trim(),
            None => continue,
        };
        if href.is_empty() {
            continue;
        }

        let duration_secs = item
            .select(&time_sel)
            .next()
            .map(|el| {
                let label = el.text().collect::<String>();
                parse_duration(label.trim())
            })
            .unwrap_or(0);

        tracks.push(Track {
            title: meta.title,
            artist: meta.artist,
            download_url: resolve_href(base.as_ref(), href),
            duration_secs,
        });
    }

    tracing::debug!(count = tracks.len(), "catalog listing parsed");
    Ok(tracks)
}

/// Absolutize a download href against the catalog base URL.
///
/// Absolute hrefs pass through unchanged; a relative href (the catalog
/// emits both) is joined onto the base. An unjoinable href is kept
/// verbatim and left to fail at download time.
fn resolve_href(base: Option<&Url>, href: &str) -> String {
    if let Some(base) = base {
        if let Ok(joined) = base.join(href) {
            return joined.to_string();
        }
    }
    href.to_owned()
}
