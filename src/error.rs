//! Error types for the ovula library.

use std::io;

use crate::storage::StorageError;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("configuration error: {0}")]
    Config(String),

    /// Cycle length outside the plausible 21-45 day range.
    #[error("cycle length {0} is outside 21-45 days")]
    InvalidCycleLength(u32),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("tracker is locked")]
    Locked,

    /// Cycle queries need at least one logged period start.
    #[error("no period start logged yet")]
    NoAnchor,

    #[error("tracker is already set up")]
    AlreadySetup,

    #[error("tracker is not set up; run `ovula init` first")]
    NotSetup,

    #[error("passphrase required (--passphrase or OVULA_PASSPHRASE)")]
    PassphraseRequired,

    #[error("wrong passphrase")]
    WrongPassphrase,
}
