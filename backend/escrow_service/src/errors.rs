//! Application-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Registry error: {0}")]
    Registry(#[from] ops_escrow::Error),

    #[error("Command log replay failed at seq {seq}: {source}")]
    Replay {
        seq: i64,
        source: ops_escrow::Error,
    },

    #[error("Registry config does not match the command log: stored {stored}, configured {configured}")]
    ConfigMismatch { stored: String, configured: String },

    #[error("Bad request: {0}")]
    BadRequest(String),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
