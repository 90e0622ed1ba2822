use std::path::PathBuf;

use thiserror::Error;

/// Error type shared by every jkit subsystem.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image '{path}': {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File extension does not map to a known data format.
    #[error("unsupported data format: {0}")]
    UnsupportedFormat(String),

    #[error("document version {found} is newer than supported version {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("unknown animation clip '{0}'")]
    UnknownClip(String),

    #[error("invalid animation clip: {0}")]
    InvalidClip(String),

    #[error("invalid tilemap: {0}")]
    InvalidTileMap(String),

    #[error("invalid sprite sheet: {0}")]
    InvalidSheet(String),

    #[error("audio error: {0}")]
    Audio(String),

    #[error("gpu error: {0}")]
    Gpu(String),

    #[error("window error: {0}")]
    Window(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
