use thiserror::Error;

use crate::geometry::GeometryError;

#[derive(Debug, Error)]
pub enum MattaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend error on {endpoint}: {status}: {body}")]
    Backend {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Snapshot unavailable: {0}")]
    SnapshotUnavailable(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("{action} failed: {message}")]
    Action { action: String, message: String },

    #[error("No nozzle coordinate selected")]
    NoSelection,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Cancelled")]
    Cancelled,
}

pub type MattaResult<T> = Result<T, MattaError>;
