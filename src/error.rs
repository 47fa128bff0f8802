use thiserror::Error;

/// Why a generation request produced no artifact.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service answered HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unreadable response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Copy / download failures. Reported, never fatal.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(#[from] arboard::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not save file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Session cancelled by user")]
    Cancelled,

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Prompt task aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}
