use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bot API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("Bot API response for {0} had no result")]
    MissingResult(&'static str),
}

impl TelegramError {
    /// 401/404 from the Bot API mean the token itself is bad; retrying won't help.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, TelegramError::Api { code: 401 | 404, .. })
    }
}
