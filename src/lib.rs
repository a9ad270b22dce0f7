//! Lyrebird is a chat bot that finds songs in a web music catalog and
//! delivers the audio, with inline paging through the result list.
//!
//! The crate splits into a channel layer ([`channels`]) that adapts a
//! chat platform into platform-neutral events, and a service layer
//! ([`service::BotService`]) that owns sessions, paging, and delivery.
//! Catalog access lives in the `lyrebird-catalog` member crate.

pub mod channels;
pub mod config;
pub mod delivery;
pub mod paging;
pub mod service;
pub mod session;
pub mod usage_log;

pub use config::BotConfig;
pub use service::BotService;
