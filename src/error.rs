use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),
    #[error("unexpected response: {0}")]
    Unexpected(String),
}

impl ScoutError {
    /// 403 はレート制限として扱う
    pub fn is_forbidden(&self) -> bool {
        matches!(self, ScoutError::Status { status: 403, .. })
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;
