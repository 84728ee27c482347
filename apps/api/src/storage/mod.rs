//! Persistence for generation records and the usage counter.
//!
//! Handlers and the orchestrator only see [`GenerationStore`]; the Postgres
//! implementation backs production and the in-memory one backs tests and
//! database-less local runs.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::generation::{GenerationRow, GenerationStatus, NewGeneration};
use crate::models::usage::UsageRecord;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Fixed primary key of the usage singleton.
pub const USAGE_ROW_ID: i32 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Generation record {0} not found")]
    NotFound(Uuid),

    #[error("Generation record {id} is already {status}")]
    AlreadyFinalized { id: Uuid, status: GenerationStatus },
}

#[async_trait]
pub trait GenerationStore: Send + Sync {
    /// Inserts a new record in the `pending` state.
    async fn create_pending(&self, new: NewGeneration) -> Result<GenerationRow, StoreError>;

    /// Moves a pending record to `complete` with its output.
    async fn mark_complete(&self, id: Uuid, output_text: &str) -> Result<(), StoreError>;

    /// Moves a pending record to `failed` with an error description.
    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), StoreError>;

    async fn get_generation(&self, id: Uuid) -> Result<Option<GenerationRow>, StoreError>;

    /// Reads the usage singleton, `None` before the first successful generation.
    async fn usage(&self) -> Result<Option<UsageRecord>, StoreError>;

    /// Atomically creates-or-increments the usage singleton and returns the new value.
    async fn increment_usage(&self) -> Result<UsageRecord, StoreError>;
}
