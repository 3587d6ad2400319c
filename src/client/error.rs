use thiserror::Error;

/// Failures of the two calls the page makes against the translation API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// Input rejected before any request was sent
    #[error("{0}")]
    Validation(String),

    /// The request never produced a response
    #[error("{0}")]
    Transport(String),

    /// Non-2xx status; `message` is the body's error text or a generic one
    #[error("{message}")]
    Server { status: u16, message: String },

    /// 2xx response carrying an `error` field
    #[error("{0}")]
    Reported(String),

    /// Body could not be decoded
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl ClientError {
    pub fn server(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("Server error: {}", status));
        ClientError::Server { status, message }
    }
}
