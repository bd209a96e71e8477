use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KasaError {
    #[error("Snapshot at {path} is corrupt: {reason}")]
    CorruptSnapshot { path: PathBuf, reason: String },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Bonus overflow for user {user_id}")]
    BonusOverflow { user_id: String },

    #[error("Unknown contract type: {0}")]
    UnknownContractType(String),

    #[error("Notification error: {0}")]
    Notification(String),
}

impl From<serde_json::Error> for KasaError {
    fn from(e: serde_json::Error) -> Self {
        KasaError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KasaError>;
