use thiserror::Error;

/// Rejected round submission. Nothing is stored when one of these comes back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("course name is required")]
    MissingCourse,
    #[error("total score is required")]
    MissingTotalScore,
    #[error("invalid round date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("mistake counters are too large to add up")]
    CounterOverflow,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure talking to the analytics service. Recorded, never propagated past the mirror.
#[derive(Error, Debug, Clone)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(String),
    #[error("http {status}: {body}")]
    Status { status: u16, body: String },
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("a round submission is already being processed")]
    Busy,
}
