use std::path::PathBuf;

use thiserror::Error;

use crate::types::TileKind;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("maze has no {0:?} tile")]
    TileNotFound(TileKind),
    #[error("invalid maze: {0}")]
    InvalidMaze(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
