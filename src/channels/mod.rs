//! Chat transport runtime.
//!
//! One adapter feeds decoded [`InboundEvent`]s into an mpsc queue; the
//! runtime restarts the adapter with backoff when its poll loop fails,
//! and dispatches each event to the service as an independent task.
//! Ordering between events is whatever the session store's
//! per-conversation serialization provides.

pub mod telegram;
pub mod traits;

use crate::channels::traits::{EventSource, InboundEvent};
use crate::service::BotService;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const INBOUND_QUEUE_SIZE: usize = 64;

/// Run the chat runtime until the inbound queue closes.
pub async fn run(service: Arc<BotService>, source: Arc<dyn EventSource>) -> anyhow::Result<()> {
    let (inbound_tx, mut inbound_rx) = mpsc::channel::<InboundEvent>(INBOUND_QUEUE_SIZE);

    let worker_source = Arc::clone(&source);
    tokio::spawn(async move {
        let mut backoff_secs = 2u64;
        loop {
            match worker_source.run(inbound_tx.clone()).await {
                Ok(()) => {
                    tracing::warn!("channel {} stopped; restarting", worker_source.id());
                }
                Err(err) => {
                    tracing::warn!(
                        "channel {} failed: {err}; retrying in {backoff_secs}s",
                        worker_source.id()
                    );
                }
            }
            tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
            backoff_secs = backoff_secs.saturating_mul(2).min(60);
        }
    });

    tracing::info!(channel = source.id(), "chat runtime started");

    while let Some(event) = inbound_rx.recv().await {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service.dispatch(event).await;
        });
    }

    Ok(())
}
