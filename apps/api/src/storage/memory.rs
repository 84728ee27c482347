use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::generation::{GenerationRow, GenerationStatus, NewGeneration};
use crate::models::usage::UsageRecord;
use crate::storage::{GenerationStore, StoreError, USAGE_ROW_ID};

/// [`GenerationStore`] held in process memory. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    generations: HashMap<Uuid, GenerationRow>,
    usage: Option<UsageRecord>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record, oldest first.
    #[cfg(test)]
    pub async fn generations(&self) -> Vec<GenerationRow> {
        let mut rows: Vec<_> = self.inner.lock().await.generations.values().cloned().collect();
        rows.sort_by_key(|row| row.created_at);
        rows
    }

    async fn finalize(
        &self,
        id: Uuid,
        status: GenerationStatus,
        output_text: Option<&str>,
        error: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let row = inner
            .generations
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;

        let current = row.status().unwrap_or(GenerationStatus::Pending);
        if current.is_terminal() {
            return Err(StoreError::AlreadyFinalized {
                id,
                status: current,
            });
        }

        row.status = status.as_str().to_string();
        row.output_text = output_text.map(str::to_string);
        row.error = error.map(str::to_string);
        Ok(())
    }
}

#[async_trait]
impl GenerationStore for InMemoryStore {
    async fn create_pending(&self, new: NewGeneration) -> Result<GenerationRow, StoreError> {
        let row = GenerationRow {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            input_json: new.input,
            word_count: i32::try_from(new.word_count).unwrap_or(i32::MAX),
            tone: new.tone,
            title: new.title,
            language: new.language,
            output_text: None,
            status: GenerationStatus::Pending.as_str().to_string(),
            error: None,
        };
        self.inner
            .lock()
            .await
            .generations
            .insert(row.id, row.clone());
        Ok(row)
    }

    async fn mark_complete(&self, id: Uuid, output_text: &str) -> Result<(), StoreError> {
        self.finalize(id, GenerationStatus::Complete, Some(output_text), None)
            .await
    }

    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), StoreError> {
        self.finalize(id, GenerationStatus::Failed, None, Some(error))
            .await
    }

    async fn get_generation(&self, id: Uuid) -> Result<Option<GenerationRow>, StoreError> {
        Ok(self.inner.lock().await.generations.get(&id).cloned())
    }

    async fn usage(&self) -> Result<Option<UsageRecord>, StoreError> {
        Ok(self.inner.lock().await.usage.clone())
    }

    async fn increment_usage(&self) -> Result<UsageRecord, StoreError> {
        let mut inner = self.inner.lock().await;
        let usage = inner.usage.get_or_insert(UsageRecord {
            id: USAGE_ROW_ID,
            request_count: 0,
        });
        usage.request_count += 1;
        Ok(usage.clone())
    }
}
