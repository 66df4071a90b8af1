use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::types::{ApiResponse, GetUpdates, Message, SendMessage, Update, User};
use crate::{Result, TelegramError};

/// Slack added on top of the long-poll timeout before the HTTP request gives up.
const POLL_GRACE: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// ─── BotClient ────────────────────────────────────────────────────────────

/// Thin async client for the handful of Bot API methods the assistant needs.
///
/// Not `Debug`: the base URL embeds the bot token.
#[derive(Clone)]
pub struct BotClient {
    http: reqwest::Client,
    base: String,
}

impl BotClient {
    /// `api_base` is normally `https://api.telegram.org`; tests point it at a
    /// mock server.
    pub fn new(api_base: &str, token: &str) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base: format!("{}/bot{}", api_base.trim_end_matches('/'), token),
        })
    }

    /// Check the token and return the bot's own user record.
    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &serde_json::json!({}), REQUEST_TIMEOUT)
            .await
    }

    /// Long-poll for updates with `update_id >= offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        let body = GetUpdates {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message"],
        };
        self.call(
            "getUpdates",
            &body,
            Duration::from_secs(timeout_secs) + POLL_GRACE,
        )
        .await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message> {
        self.call(
            "sendMessage",
            &SendMessage { chat_id, text },
            REQUEST_TIMEOUT,
        )
        .await
    }

    async fn call<B, T>(&self, method: &'static str, body: &B, timeout: Duration) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{method}", self.base);
        let response = self
            .http
            .post(url)
            .json(body)
            .timeout(timeout)
            .send()
            .await?;
        let status = response.status();
        let envelope: ApiResponse<T> = response.json().await?;

        if !envelope.ok {
            return Err(TelegramError::Api {
                code: envelope
                    .error_code
                    .unwrap_or_else(|| i64::from(status.as_u16())),
                description: envelope
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }
        envelope.result.ok_or(TelegramError::MissingResult(method))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
