use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("request to chat endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("chat endpoint answered with status {status}")]
    Status { status: u16 },

    #[error("unexpected payload from chat endpoint: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("invalid chat endpoint `{url}`: {reason}")]
    InvalidEndpoint { url: String, reason: String },
}

pub type ChatResult<T> = Result<T, ChatError>;
