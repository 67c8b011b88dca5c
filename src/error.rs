// src/error.rs
//! Fatal run outcomes. Everything else degrades and is only logged.

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("{0} is not set")]
    MissingDestination(&'static str),

    #[error("configuration error: {0}")]
    Config(String),

    /// The notifier rejected the batch; the ledger was left untouched.
    #[error("send failed: {0}")]
    Send(String),
}

impl RelayError {
    pub fn exit_code(&self) -> u8 {
        match self {
            RelayError::Send(_) => 1,
            RelayError::MissingDestination(_) | RelayError::Config(_) => 2,
        }
    }
}
