use thiserror::Error;

/// Error taxonomy for conflict resolution.
///
/// `Precondition` is raised before any mutation and is safe to retry after
/// correcting input. `Invariant` aborts the whole resolution; nothing is
/// partially applied. `External` covers collaborator failures that are
/// recovered locally and logged rather than surfaced to the player.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Precondition(String),

    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error("external collaborator failed: {0}")]
    External(String),

    #[error("unknown dominion: {0:?}")]
    UnknownDominion(crate::core::types::DominionId),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("config error: {0}")]
    ConfigError(#[from] toml::de::Error),
}

impl EngineError {
    pub fn precondition(reason: impl Into<String>) -> Self {
        EngineError::Precondition(reason.into())
    }

    pub fn invariant(detail: impl Into<String>) -> Self {
        EngineError::Invariant(detail.into())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
