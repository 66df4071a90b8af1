use thiserror::Error;

#[derive(Debug, Error)]
pub enum MnemonoError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid cycle: {0}")]
    InvalidCycle(String),

    #[error("bot token not configured: set BOT_TOKEN or telegram.token")]
    MissingToken,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MnemonoError>;
