//! End-to-end orchestration of search, selection, and paging.
//!
//! [`BotService`] owns the session store and all policy; the transport
//! and the usage log are injected collaborators. Every user-visible
//! failure is a terse message; internal identifiers and error chains
//! stay in the logs.

use crate::channels::traits::{ChatAction, ChatTransport, InboundEvent, SenderInfo};
use crate::config::BotConfig;
use crate::delivery::{self, display_name};
use crate::paging;
use crate::session::{ConversationId, SessionStore};
use crate::usage_log::{UsageLog, UsageRecord};
use bytes::Bytes;
use lyrebird_catalog::{CatalogConfig, Track};
use std::sync::Arc;
use std::time::Duration;

const MSG_SEARCH_FAILED: &str = "Search failed, please try again later.";
const MSG_NOTHING_FOUND: &str = "Nothing found.";
const MSG_DOWNLOAD_FAILED: &str = "Could not download that track.";
const MSG_SELECTION_GONE: &str = "That selection is no longer available.";
const MSG_NO_REPORT: &str = "No usage data recorded yet.";
const MSG_MORE_OPTIONS: &str = "More options:";
const LABEL_MORE: &str = "➡️ More";

/// Keep only tracks within the duration limit (inclusive),
/// order-preserving.
pub fn filter_tracks(tracks: Vec<Track>, max_secs: u64) -> Vec<Track> {
    tracks
        .into_iter()
        .filter(|track| track.duration_secs <= max_secs)
        .collect()
}

/// The bot's core service: one instance owns all shared state.
pub struct BotService {
    store: SessionStore,
    catalog: CatalogConfig,
    max_duration_secs: u64,
    transport: Arc<dyn ChatTransport>,
    usage_log: Arc<dyn UsageLog>,
}

impl BotService {
    pub fn new(
        config: &BotConfig,
        transport: Arc<dyn ChatTransport>,
        usage_log: Arc<dyn UsageLog>,
    ) -> Self {
        Self {
            store: SessionStore::new(
                config.sessions.max_entries,
                Duration::from_secs(config.sessions.ttl_secs),
            ),
            catalog: config.catalog.clone(),
            max_duration_secs: config.search.max_duration_secs,
            transport,
            usage_log,
        }
    }

    /// Handle one inbound event, logging any transport failure. Events
    /// are independent units of work; an error in one never affects
    /// another.
    pub async fn dispatch(&self, event: InboundEvent) {
        let outcome = match event {
            InboundEvent::Start { conversation } => self.transport.send_greeting(conversation).await,
            InboundEvent::Search {
                conversation,
                sender,
                text,
            } => self.handle_search(conversation, &sender, &text).await,
            InboundEvent::Action {
                conversation,
                action: ChatAction::Select(index),
            } => self.handle_select(conversation, index).await,
            InboundEvent::Action {
                conversation,
                action: ChatAction::ShowMore(page),
            } => self.handle_show_more(conversation, page).await,
            InboundEvent::Report { conversation } => self.handle_report(conversation).await,
        };
        if let Err(err) = outcome {
            tracing::error!(error = %err, "event handling failed");
        }
    }

    /// New text query: search, filter, replace the session, deliver the
    /// primary track, render page 0.
    pub async fn handle_search(
        &self,
        conversation: ConversationId,
        sender: &SenderInfo,
        text: &str,
    ) -> anyhow::Result<()> {
        // The usage log is advisory; its failures never reach this pipeline.
        self.usage_log.record(&UsageRecord {
            sender_id: sender.id,
            username: sender.username.as_deref(),
            language_code: sender.language_code.as_deref(),
            query: text,
        });

        let query = lyrebird_catalog::query::normalize(text);
        let unfiltered = match lyrebird_catalog::search(&query, &self.catalog).await {
            Ok(tracks) => tracks,
            Err(err) => {
                tracing::warn!(error = %err, "catalog search failed");
                return self.transport.send_text(conversation, MSG_SEARCH_FAILED).await;
            }
        };

        if unfiltered.is_empty() {
            return self.transport.send_text(conversation, MSG_NOTHING_FOUND).await;
        }

        let total = unfiltered.len();
        let tracks = filter_tracks(unfiltered, self.max_duration_secs);
        if tracks.is_empty() {
            let minutes = self.max_duration_secs / 60;
            let message =
                format!("Found {total} tracks, but all are longer than {minutes} minutes.");
            return self.transport.send_text(conversation, &message).await;
        }

        let view = self.store.put(conversation, tracks).await;
        self.transport
            .send_text(conversation, &format!("Found {} tracks.", view.tracks.len()))
            .await?;

        match delivery::fetch_audio(&view.tracks[0], &self.catalog).await {
            Ok(payload) => self.transport.send_audio(conversation, &payload).await?,
            Err(err) => {
                tracing::warn!(error = %err, "primary track delivery failed");
                return self
                    .transport
                    .send_text(conversation, MSG_DOWNLOAD_FAILED)
                    .await;
            }
        }

        self.render_page(conversation, &view.tracks, 0).await
    }

    /// Selection action: deliver the track at the given absolute index.
    pub async fn handle_select(
        &self,
        conversation: ConversationId,
        index: usize,
    ) -> anyhow::Result<()> {
        let Some(view) = self.store.get(conversation).await else {
            return self
                .transport
                .send_text(conversation, MSG_SELECTION_GONE)
                .await;
        };
        let Some(track) = view.tracks.get(index) else {
            return self
                .transport
                .send_text(conversation, MSG_SELECTION_GONE)
                .await;
        };

        match delivery::fetch_audio(track, &self.catalog).await {
            Ok(payload) => self.transport.send_audio(conversation, &payload).await,
            Err(err) => {
                tracing::warn!(error = %err, index, "selected track delivery failed");
                self.transport
                    .send_text(conversation, MSG_DOWNLOAD_FAILED)
                    .await
            }
        }
    }

    /// Paging action: remember the page and render it. No session, or a
    /// page past the end, renders nothing.
    pub async fn handle_show_more(
        &self,
        conversation: ConversationId,
        page_number: usize,
    ) -> anyhow::Result<()> {
        let Some(view) = self.store.get(conversation).await else {
            return Ok(());
        };
        self.store.set_page(conversation, page_number).await;
        self.render_page(conversation, &view.tracks, page_number).await
    }

    /// Operator report: hand over the usage CSV, if any.
    pub async fn handle_report(&self, conversation: ConversationId) -> anyhow::Result<()> {
        match self.usage_log.take_report() {
            Some(report) => {
                let sent = self
                    .transport
                    .send_document(
                        conversation,
                        "usage.csv",
                        Bytes::from(report.clone()),
                        "📊 Usage report",
                    )
                    .await;
                if sent.is_err() {
                    // A report that never arrived is not a report.
                    self.usage_log.restore_report(report);
                }
                sent
            }
            None => self.transport.send_text(conversation, MSG_NO_REPORT).await,
        }
    }

    async fn render_page(
        &self,
        conversation: ConversationId,
        tracks: &[Track],
        page_number: usize,
    ) -> anyhow::Result<()> {
        let page = paging::page(tracks, page_number);
        if page.entries.is_empty() {
            return Ok(());
        }

        let mut options: Vec<(String, ChatAction)> = page
            .entries
            .iter()
            .map(|(index, track)| (display_name(track), ChatAction::Select(*index)))
            .collect();
        if page.has_more {
            options.push((LABEL_MORE.to_owned(), ChatAction::ShowMore(page_number + 1)));
        }

        self.transport
            .send_options(conversation, MSG_MORE_OPTIONS, &options)
            .await
    }
}
