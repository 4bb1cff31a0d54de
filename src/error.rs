use std::path::PathBuf;

use thiserror::Error;

use crate::node::NodeError;
use crate::sop::SopError;

/// Exit status for a temporary failure (sysexits `EX_TEMPFAIL`).
pub const EXIT_TEMPFAIL: i32 = 75;

#[derive(Debug, Error)]
pub enum PebbleError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown node class: {0}")]
    UnknownNode(String),

    #[error("failed to read {}: {source}", .path.display())]
    Input { path: PathBuf, source: std::io::Error },

    #[error("failed to write {}: {source}", .path.display())]
    Output { path: PathBuf, source: std::io::Error },

    #[error(transparent)]
    Sop(#[from] SopError),

    #[error(transparent)]
    Node(#[from] NodeError),
}

impl PebbleError {
    /// `75` when the remote service stayed unavailable, `1` otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            PebbleError::Node(err) if err.is_unavailable() => EXIT_TEMPFAIL,
            _ => 1,
        }
    }
}
