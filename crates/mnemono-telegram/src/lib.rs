//! `mnemono-telegram` — Telegram Bot API transport for the mnemono assistant.
//!
//! # Architecture
//!
//! ```text
//! BotClient        ← getMe / getUpdates (long polling) / sendMessage over HTTPS
//!     │
//!     ▼
//! Poller           ← tracks the update offset, backs off on transport errors
//!     │
//!     ▼
//! Assistant        ← mnemono-core command layer; one load/compute/save per message
//! ```
//!
//! The poller owns no cycle state. Every message goes through the injected
//! store, so a liveness server or CLI running next to it sees the same file.

pub mod client;
pub mod error;
pub mod poller;
pub mod types;

pub use client::BotClient;
pub use error::TelegramError;
pub use poller::Poller;
pub use types::{Chat, Message, Update, User};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, TelegramError>;
