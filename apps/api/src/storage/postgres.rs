use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::generation::{GenerationRow, GenerationStatus, NewGeneration};
use crate::models::usage::UsageRecord;
use crate::storage::{GenerationStore, StoreError, USAGE_ROW_ID};

/// [`GenerationStore`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finalizes a pending row. Zero affected rows means the record is missing
    /// or already terminal; the follow-up read tells which.
    async fn finalize(
        &self,
        id: Uuid,
        status: GenerationStatus,
        output_text: Option<&str>,
        error: Option<&str>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE jd_requests
            SET status = $2, output_text = $3, error = $4
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(output_text)
        .bind(error)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        match self.get_generation(id).await? {
            None => Err(StoreError::NotFound(id)),
            Some(row) => Err(StoreError::AlreadyFinalized {
                id,
                status: row.status().unwrap_or(status),
            }),
        }
    }
}

#[async_trait]
impl GenerationStore for PgStore {
    async fn create_pending(&self, new: NewGeneration) -> Result<GenerationRow, StoreError> {
        let row = sqlx::query_as::<_, GenerationRow>(
            r#"
            INSERT INTO jd_requests (id, input_json, word_count, tone, title, language, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending')
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.input)
        .bind(i32::try_from(new.word_count).unwrap_or(i32::MAX))
        .bind(&new.tone)
        .bind(&new.title)
        .bind(&new.language)
        .fetch_one(&self.pool)
        .await?;

        info!("Created generation record {}", row.id);
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
        Ok(
            sqlx::query_as::<_, GenerationRow>("SELECT * FROM jd_requests WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn usage(&self) -> Result<Option<UsageRecord>, StoreError> {
        Ok(sqlx::query_as::<_, UsageRecord>(
            "SELECT id, request_count FROM total_usage WHERE id = $1",
        )
        .bind(USAGE_ROW_ID)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn increment_usage(&self) -> Result<UsageRecord, StoreError> {
        // Single statement: concurrent successes serialize on the row lock.
        Ok(sqlx::query_as::<_, UsageRecord>(
            r#"
            INSERT INTO total_usage (id, request_count)
            VALUES ($1, 1)
            ON CONFLICT (id)
            DO UPDATE SET request_count = total_usage.request_count + 1
            RETURNING id, request_count
            "#,
        )
        .bind(USAGE_ROW_ID)
        .fetch_one(&self.pool)
        .await?)
    }
}
