use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummarizerError {
    #[error("Failed to extract page content: {0}")]
    ExtractionError(String),

    #[error("Failed to reach summarization service: {0}")]
    RemoteError(String),

    #[error("Failed to access summary storage: {0}")]
    StorageError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Another action is still in progress")]
    Busy,
}

impl SummarizerError {
    /// The bare message shown to the user after the `Error: ` prefix.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SummarizerError::ExtractionError(msg)
            | SummarizerError::RemoteError(msg)
            | SummarizerError::StorageError(msg)
            | SummarizerError::ConfigError(msg) => msg.clone(),
            SummarizerError::Busy => self.to_string(),
        }
    }
}

impl From<reqwest::Error> for SummarizerError {
    fn from(error: reqwest::Error) -> Self {
        SummarizerError::RemoteError(error.to_string())
    }
}

impl From<serde_json::Error> for SummarizerError {
    fn from(error: serde_json::Error) -> Self {
        SummarizerError::StorageError(error.to_string())
    }
}

impl From<std::io::Error> for SummarizerError {
    fn from(error: std::io::Error) -> Self {
        SummarizerError::StorageError(error.to_string())
    }
}

impl From<anyhow::Error> for SummarizerError {
    fn from(error: anyhow::Error) -> Self {
        SummarizerError::ExtractionError(error.to_string())
    }
}
