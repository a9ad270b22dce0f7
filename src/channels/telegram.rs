//! Telegram channel adapter using the Bot API over plain HTTP.
//!
//! Long-polls `getUpdates` for inbound messages and button presses,
//! decodes button tags at this boundary, and renders replies, audio
//! uploads, and inline keyboards through the corresponding Bot API
//! methods. The API surface needed here is small enough that no SDK
//! crate is involved.

use crate::channels::traits::{ChatAction, ChatTransport, EventSource, InboundEvent, SenderInfo};
use crate::config::TelegramConfig;
use crate::delivery::AudioPayload;
use crate::session::ConversationId;
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::mpsc;

const GREETING: &str =
    "🎧 Send me a song name and I will find and deliver it.";

/// Label of the optional web-app reply-keyboard button. Some clients
/// echo the label as a plain message when the button is pressed; it is
/// never a search query.
const RADIO_LABEL: &str = "📻 Radio";

/// Telegram adapter: inbound long-poll loop plus outbound sends.
pub struct TelegramAdapter {
    token: String,
    api_base: String,
    poll_timeout_secs: u64,
    webapp_url: Option<String>,
    report_command: Option<String>,
    client: reqwest::Client,
    // Next getUpdates offset. Lives on the adapter so a restart of the
    // poll loop never re-confirms an already-handled batch.
    offset: AtomicI64,
}

/// What one raw update decodes to.
#[derive(Debug, Default)]
struct ParsedUpdate {
    /// Callback query id to acknowledge, when the update was a button press.
    callback_id: Option<String>,
    event: Option<InboundEvent>,
}

impl TelegramAdapter {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            token: config.bot_token.clone(),
            api_base: config.api_base.clone(),
            poll_timeout_secs: config.poll_timeout_secs,
            webapp_url: config.webapp_url.clone(),
            report_command: config.report_command.clone(),
            client: reqwest::Client::new(),
            offset: AtomicI64::new(0),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_base.trim_end_matches('/'),
            self.token,
            method
        )
    }

    async fn call_json(&self, method: &str, body: Value) -> anyhow::Result<Value> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await?;
        Self::check_response(method, response).await
    }

    async fn call_multipart(
        &self,
        method: &str,
        form: reqwest::multipart::Form,
    ) -> anyhow::Result<Value> {
        let response = self
            .client
            .post(self.method_url(method))
            .multipart(form)
            .send()
            .await?;
        Self::check_response(method, response).await
    }

    async fn check_response(method: &str, response: reqwest::Response) -> anyhow::Result<Value> {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let payload: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        let ok = payload.get("ok").and_then(Value::as_bool).unwrap_or(false);
        if !status.is_success() || !ok {
            let description = payload
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("no description");
            anyhow::bail!("telegram {method} failed ({status}): {description}");
        }
        Ok(payload)
    }

    async fn answer_callback(&self, callback_id: &str) -> anyhow::Result<()> {
        self.call_json(
            "answerCallbackQuery",
            json!({ "callback_query_id": callback_id }),
        )
        .await?;
        Ok(())
    }

    async fn poll_once(&self, inbound_tx: &mpsc::Sender<InboundEvent>) -> anyhow::Result<()> {
        let body = json!({
            "timeout": self.poll_timeout_secs,
            "offset": self.offset.load(Ordering::Acquire),
            "allowed_updates": ["message", "callback_query"],
        });
        let payload = self.call_json("getUpdates", body).await?;
        let updates = payload
            .get("result")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        for update in &updates {
            if let Some(id) = update.get("update_id").and_then(Value::as_i64) {
                self.offset.fetch_max(id + 1, Ordering::AcqRel);
            }

            let ignore_label = self.webapp_url.is_some().then_some(RADIO_LABEL);
            let parsed = parse_update(update, self.report_command.as_deref(), ignore_label);
            if let Some(ref callback_id) = parsed.callback_id {
                if let Err(err) = self.answer_callback(callback_id).await {
                    tracing::debug!(error = %err, "answerCallbackQuery failed");
                }
            }
            if let Some(event) = parsed.event {
                if inbound_tx.send(event).await.is_err() {
                    anyhow::bail!("telegram inbound channel closed");
                }
            }
        }
        Ok(())
    }

}

#[async_trait]
impl EventSource for TelegramAdapter {
    fn id(&self) -> &'static str {
        "telegram"
    }

    /// Receive updates and forward decoded events until the channel
    /// closes or the poll loop fails.
    async fn run(&self, inbound_tx: mpsc::Sender<InboundEvent>) -> anyhow::Result<()> {
        if self.token.trim().is_empty() {
            anyhow::bail!("telegram bot token is empty");
        }

        loop {
            self.poll_once(&inbound_tx).await?;
        }
    }
}

/// Decode one raw Telegram update. Unknown or malformed updates decode
/// to nothing, as does a message matching `ignore_label` (a keyboard
/// button echo); a button press with an unknown tag still gets its
/// callback acknowledged.
fn parse_update(
    update: &Value,
    report_command: Option<&str>,
    ignore_label: Option<&str>,
) -> ParsedUpdate {
    if let Some(callback) = update.get("callback_query") {
        let callback_id = callback
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let conversation = callback
            .get("message")
            .and_then(|m| m.get("chat"))
            .and_then(|c| c.get("id"))
            .and_then(Value::as_i64);
        let action = callback
            .get("data")
            .and_then(Value::as_str)
            .and_then(ChatAction::decode);

        let event = match (conversation, action) {
            (Some(conversation), Some(action)) => Some(InboundEvent::Action {
                conversation,
                action,
            }),
            _ => None,
        };
        return ParsedUpdate { callback_id, event };
    }

    let Some(message) = update.get("message") else {
        return ParsedUpdate::default();
    };
    let Some(conversation) = message
        .get("chat")
        .and_then(|c| c.get("id"))
        .and_then(Value::as_i64)
    else {
        return ParsedUpdate::default();
    };
    let text = message
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim();
    if text.is_empty() || ignore_label.is_some_and(|label| label == text) {
        return ParsedUpdate::default();
    }

    let event = if text == "/start" {
        InboundEvent::Start { conversation }
    } else if report_command.is_some_and(|command| command == text) {
        InboundEvent::Report { conversation }
    } else {
        let from = message.get("from");
        let sender = SenderInfo {
            id: from
                .and_then(|f| f.get("id"))
                .and_then(Value::as_i64)
                .unwrap_or_default(),
            username: from
                .and_then(|f| f.get("username"))
                .and_then(Value::as_str)
                .map(str::to_owned),
            language_code: from
                .and_then(|f| f.get("language_code"))
                .and_then(Value::as_str)
                .map(str::to_owned),
        };
        InboundEvent::Search {
            conversation,
            sender,
            text: text.to_owned(),
        }
    };

    ParsedUpdate {
        callback_id: None,
        event: Some(event),
    }
}

#[async_trait]
impl ChatTransport for TelegramAdapter {
    async fn send_text(&self, conversation: ConversationId, text: &str) -> anyhow::Result<()> {
        self.call_json(
            "sendMessage",
            json!({ "chat_id": conversation, "text": text }),
        )
        .await?;
        Ok(())
    }

    async fn send_greeting(&self, conversation: ConversationId) -> anyhow::Result<()> {
        let mut body = json!({ "chat_id": conversation, "text": GREETING });
        if let Some(ref webapp_url) = self.webapp_url {
            body["reply_markup"] = json!({
                "keyboard": [[{ "text": RADIO_LABEL, "web_app": { "url": webapp_url } }]],
                "resize_keyboard": true,
                "input_field_placeholder": "Send a song name...",
            });
        }
        self.call_json("sendMessage", body).await?;
        Ok(())
    }

    async fn send_audio(
        &self,
        conversation: ConversationId,
        audio: &AudioPayload,
    ) -> anyhow::Result<()> {
        let part = reqwest::multipart::Part::bytes(audio.bytes.to_vec())
            .file_name(audio.filename.clone())
            .mime_str("audio/mpeg")?;
        let form = reqwest::multipart::Form::new()
            .text("chat_id", conversation.to_string())
            .text("caption", audio.caption.clone())
            .part("audio", part);
        self.call_multipart("sendAudio", form).await?;
        Ok(())
    }

    async fn send_document(
        &self,
        conversation: ConversationId,
        filename: &str,
        bytes: Bytes,
        caption: &str,
    ) -> anyhow::Result<()> {
        let part = reqwest::multipart::Part::bytes(bytes.to_vec())
            .file_name(filename.to_owned())
            .mime_str("application/octet-stream")?;
        let form = reqwest::multipart::Form::new()
            .text("chat_id", conversation.to_string())
            .text("caption", caption.to_owned())
            .part("document", part);
        self.call_multipart("sendDocument", form).await?;
        Ok(())
    }

    async fn send_options(
        &self,
        conversation: ConversationId,
        text: &str,
        options: &[(String, ChatAction)],
    ) -> anyhow::Result<()> {
        let rows: Vec<Value> = options
            .iter()
            .map(|(label, action)| json!([{ "text": label, "callback_data": action.encode() }]))
            .collect();
        self.call_json(
            "sendMessage",
            json!({
                "chat_id": conversation,
                "text": text,
                "reply_markup": { "inline_keyboard": rows },
            }),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn adapter_with(report_command: Option<&str>) -> TelegramAdapter {
        TelegramAdapter::new(&TelegramConfig {
            bot_token: "123:abc".into(),
            api_base: "https://api.telegram.org".into(),
            poll_timeout_secs: 25,
            webapp_url: None,
            report_command: report_command.map(str::to_owned),
        })
    }

    #[test]
    fn method_url_embeds_token() {
        let adapter = adapter_with(None);
        assert_eq!(
            adapter.method_url("getUpdates"),
            "https://api.telegram.org/bot123:abc/getUpdates"
        );
    }

    #[test]
    fn text_message_decodes_to_search() {
        let update = json!({
            "update_id": 1,
            "message": {
                "chat": { "id": 77 },
                "from": { "id": 5, "username": "listener", "language_code": "en" },
                "text": "  some song  "
            }
        });
        let parsed = parse_update(&update, None, None);
        assert!(parsed.callback_id.is_none());
        match parsed.event {
            Some(InboundEvent::Search {
                conversation,
                sender,
                text,
            }) => {
                assert_eq!(conversation, 77);
                assert_eq!(sender.id, 5);
                assert_eq!(sender.username.as_deref(), Some("listener"));
                assert_eq!(text, "some song");
            }
            other => panic!("expected Search, got {other:?}"),
        }
    }

    #[test]
    fn start_command_decodes_to_start() {
        let update = json!({
            "update_id": 2,
            "message": { "chat": { "id": 77 }, "text": "/start" }
        });
        match parse_update(&update, None, None).event {
            Some(InboundEvent::Start { conversation }) => assert_eq!(conversation, 77),
            other => panic!("expected Start, got {other:?}"),
        }
    }

    #[test]
    fn report_command_requires_configuration() {
        let update = json!({
            "update_id": 3,
            "message": { "chat": { "id": 77 }, "from": { "id": 5 }, "text": "/report" }
        });

        match parse_update(&update, Some("/report"), None).event {
            Some(InboundEvent::Report { conversation }) => assert_eq!(conversation, 77),
            other => panic!("expected Report, got {other:?}"),
        }
        // Without configuration the same text is an ordinary search.
        assert!(matches!(
            parse_update(&update, None, None).event,
            Some(InboundEvent::Search { .. })
        ));
    }

    #[test]
    fn callback_decodes_to_action_and_acknowledges() {
        let update = json!({
            "update_id": 4,
            "callback_query": {
                "id": "cb-9",
                "message": { "chat": { "id": 77 } },
                "data": "track:5"
            }
        });
        let parsed = parse_update(&update, None, None);
        assert_eq!(parsed.callback_id.as_deref(), Some("cb-9"));
        assert!(matches!(
            parsed.event,
            Some(InboundEvent::Action {
                conversation: 77,
                action: ChatAction::Select(5)
            })
        ));
    }

    #[test]
    fn callback_with_unknown_tag_still_acknowledged() {
        let update = json!({
            "update_id": 5,
            "callback_query": {
                "id": "cb-10",
                "message": { "chat": { "id": 77 } },
                "data": "bogus"
            }
        });
        let parsed = parse_update(&update, None, None);
        assert_eq!(parsed.callback_id.as_deref(), Some("cb-10"));
        assert!(parsed.event.is_none());
    }

    #[test]
    fn non_text_update_decodes_to_nothing() {
        let update = json!({
            "update_id": 6,
            "message": { "chat": { "id": 77 }, "sticker": {} }
        });
        let parsed = parse_update(&update, None, None);
        assert!(parsed.callback_id.is_none());
        assert!(parsed.event.is_none());
    }

    #[test]
    fn keyboard_button_echo_is_not_a_search() {
        let update = json!({
            "update_id": 7,
            "message": { "chat": { "id": 77 }, "from": { "id": 5 }, "text": RADIO_LABEL }
        });

        assert!(parse_update(&update, None, Some(RADIO_LABEL)).event.is_none());
        // Without the keyboard configured the same text is an ordinary search.
        assert!(matches!(
            parse_update(&update, None, None).event,
            Some(InboundEvent::Search { .. })
        ));
    }

    #[tokio::test]
    async fn run_rejects_empty_token() {
        let adapter = TelegramAdapter::new(&TelegramConfig {
            bot_token: String::new(),
            ..Default::default()
        });
        let (tx, _rx) = mpsc::channel(1);
        assert!(adapter.run(tx).await.is_err());
    }

    #[tokio::test]
    async fn poll_offset_survives_a_restart() {
        use wiremock::matchers::{body_partial_json, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        // First poll confirms one update; later polls fail.
        Mock::given(method("POST"))
            .and(path("/bot123:abc/getUpdates"))
            .and(body_partial_json(json!({ "offset": 0 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": [{ "update_id": 7, "message": { "chat": { "id": 77 }, "sticker": {} } }]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/getUpdates"))
            .and(body_partial_json(json!({ "offset": 8 })))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let adapter = TelegramAdapter::new(&TelegramConfig {
            bot_token: "123:abc".into(),
            api_base: server.uri(),
            poll_timeout_secs: 0,
            ..Default::default()
        });

        let (tx, _rx) = mpsc::channel(8);
        // Each run fails once the server answers 500; the second run
        // must resume at the already-confirmed offset rather than
        // re-fetch the first batch.
        assert!(adapter.run(tx.clone()).await.is_err());
        assert!(adapter.run(tx).await.is_err());
    }
}
