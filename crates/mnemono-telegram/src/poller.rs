use std::sync::Arc;
use std::time::Duration;

use mnemono_core::commands::{Assistant, Command};
use mnemono_core::store::CycleStore;

use crate::client::BotClient;
use crate::types::{Update, User};
use crate::Result;

const MAX_BACKOFF: Duration = Duration::from_secs(60);
const INTERNAL_ERROR_REPLY: &str = "⚠️ Что-то пошло не так, попробуй ещё раз.";

// ─── Poller ───────────────────────────────────────────────────────────────

/// Long-polling loop that feeds chat messages to an [`Assistant`].
pub struct Poller<S> {
    client: BotClient,
    assistant: Arc<Assistant<S>>,
    poll_timeout_secs: u64,
    offset: i64,
}

impl<S> Poller<S>
where
    S: CycleStore + Send + Sync + 'static,
{
    pub fn new(client: BotClient, assistant: Assistant<S>, poll_timeout_secs: u64) -> Self {
        Self {
            client,
            assistant: Arc::new(assistant),
            poll_timeout_secs,
            offset: 0,
        }
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn assistant(&self) -> &Assistant<S> {
        &self.assistant
    }

    /// Check the token with `getMe`. A rejected token is an error; any other
    /// failure is logged and yields `None`, leaving retries to [`Poller::run`].
    pub async fn identify(&self) -> Result<Option<User>> {
        match self.client.get_me().await {
            Ok(me) => Ok(Some(me)),
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "getMe failed, polling will retry");
                Ok(None)
            }
        }
    }

    /// Fetch one batch of updates and answer every text message in it.
    /// Returns the number of messages answered. Updates are acknowledged
    /// before the reply is sent, so a failed send is not retried.
    pub async fn poll_once(&mut self) -> Result<usize> {
        let updates = self
            .client
            .get_updates(self.offset, self.poll_timeout_secs)
            .await?;

        let mut answered = 0;
        for update in updates {
            self.offset = self.offset.max(update.update_id + 1);
            let Some((chat_id, text)) = incoming_text(&update) else {
                continue;
            };
            tracing::debug!(update_id = update.update_id, chat_id, "handling message");

            let reply = self.reply_to(text).await;
            match self.client.send_message(chat_id, &reply).await {
                Ok(_) => answered += 1,
                Err(e) => tracing::warn!(chat_id, error = %e, "failed to send reply"),
            }
        }
        Ok(answered)
    }

    /// Poll until the token is rejected. Transport errors back off
    /// exponentially up to a minute.
    pub async fn run(mut self) -> Result<()> {
        let mut backoff = Duration::from_secs(1);
        loop {
            match self.poll_once().await {
                Ok(_) => backoff = Duration::from_secs(1),
                Err(e) if e.is_unauthorized() => {
                    tracing::error!(error = %e, "bot token rejected, stopping polling");
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(error = %e, retry_in = ?backoff, "polling failed");
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
            }
        }
    }

    async fn reply_to(&self, text: String) -> String {
        let assistant = Arc::clone(&self.assistant);
        tokio::task::spawn_blocking(move || assistant.handle(&Command::parse(&text)))
            .await
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "command handler panicked");
                INTERNAL_ERROR_REPLY.to_string()
            })
    }
}

fn incoming_text(update: &Update) -> Option<(i64, String)> {
    let message = update.message.as_ref()?;
    let text = message.text.as_deref()?.trim();
    if text.is_empty() {
        return None;
    }
    Some((message.chat.id, text.to_string()))
}

// ─── Tests ────────────────────────────────────────────────────────────────
