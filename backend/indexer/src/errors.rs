//! Error type shared by the indexer, the database layer and the API.

use std::num::ParseIntError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("RPC transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The RPC answered with something we cannot use (hard JSON-RPC error,
    /// empty result).
    #[error("RPC error: {0}")]
    Rpc(String),

    /// A stored or received event does not have the expected shape.
    #[error("Event parse error: {0}")]
    EventParse(String),

    #[error("Invalid token amount: {0}")]
    Amount(#[from] ParseIntError),
}

pub type Result<T> = std::result::Result<T, IndexerError>;
