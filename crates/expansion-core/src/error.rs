use thiserror::Error;

/// Every anomaly the core can observe. None of them is fatal: callers log the
/// error and carry on with the frame loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpansionError {
    #[error("invalid state \"{0}\" (allowed: intro, idle, charging, active, control)")]
    InvalidState(String),
    #[error("unknown domain \"{0}\"")]
    UnknownDomain(String),
    #[error("voice playback rejected: {0}")]
    PlaybackRejected(String),
}

pub type Result<T> = std::result::Result<T, ExpansionError>;
