use std::path::PathBuf;

/// Failures while reading or writing a persisted JSON document.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to create data directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize {key}: {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },
}

/// Failures of a coach request. Never shown to the user; the caller logs
/// them and falls back to a canned tip.
#[derive(Debug, thiserror::Error)]
pub enum CoachError {
    #[error("coach is disabled")]
    Disabled,
    #[error("no API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("response contained no text")]
    EmptyResponse,
}
