//! Chat transport contracts.
//!
//! The core never parses wire strings: inline-button tags are decoded
//! into [`ChatAction`] once, at the transport boundary, and encoded back
//! only when a keyboard is rendered.

use crate::delivery::AudioPayload;
use crate::session::ConversationId;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

/// A paging or selection action carried by an inline option tag.
///
/// Tag grammar: `track:<index>` and `more:<page>`, both decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatAction {
    /// Deliver the track at this absolute index into the session's
    /// result list.
    Select(usize),
    /// Render this pagination page.
    ShowMore(usize),
}

impl ChatAction {
    /// Encode as an opaque tag the transport echoes back verbatim.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Select(index) => format!("track:{index}"),
            Self::ShowMore(page) => format!("more:{page}"),
        }
    }

    /// Decode a tag; `None` for anything malformed or unknown.
    #[must_use]
    pub fn decode(tag: &str) -> Option<Self> {
        let (kind, value) = tag.split_once(':')?;
        let value = value.parse::<usize>().ok()?;
        match kind {
            "track" => Some(Self::Select(value)),
            "more" => Some(Self::ShowMore(value)),
            _ => None,
        }
    }
}

/// Who sent a search, for the usage log.
#[derive(Debug, Clone, Default)]
pub struct SenderInfo {
    pub id: i64,
    pub username: Option<String>,
    pub language_code: Option<String>,
}

/// Inbound event received from the chat transport, already decoded.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    /// The conversation was opened (e.g. a start command).
    Start { conversation: ConversationId },
    /// A free-text song query.
    Search {
        conversation: ConversationId,
        sender: SenderInfo,
        text: String,
    },
    /// An inline-button action.
    Action {
        conversation: ConversationId,
        action: ChatAction,
    },
    /// The operator asked for the usage report.
    Report { conversation: ConversationId },
}

/// Inbound side of a channel adapter.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Stable channel identifier (e.g. `telegram`).
    fn id(&self) -> &'static str;

    /// Start receiving events and forwarding them to the runtime.
    /// Returning (or failing) hands control back to the runtime's
    /// restart loop.
    async fn run(&self, inbound_tx: mpsc::Sender<InboundEvent>) -> anyhow::Result<()>;
}

/// Outbound chat capabilities the core consumes.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a plain text reply.
    async fn send_text(&self, conversation: ConversationId, text: &str) -> anyhow::Result<()>;

    /// Send the greeting shown when a conversation is opened.
    async fn send_greeting(&self, conversation: ConversationId) -> anyhow::Result<()>;

    /// Send a binary-audio message with filename and caption.
    async fn send_audio(
        &self,
        conversation: ConversationId,
        audio: &AudioPayload,
    ) -> anyhow::Result<()>;

    /// Send a named document attachment.
    async fn send_document(
        &self,
        conversation: ConversationId,
        filename: &str,
        bytes: Bytes,
        caption: &str,
    ) -> anyhow::Result<()>;

    /// Render a set of labeled actions beneath a text message. Each
    /// option's [`ChatAction`] comes back through an
    /// [`InboundEvent::Action`] when pressed.
    async fn send_options(
        &self,
        conversation: ConversationId,
        text: &str,
        options: &[(String, ChatAction)],
    ) -> anyhow::Result<()>;
}
