use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Singleton row holding the number of successful generations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UsageRecord {
    pub id: i32,
    pub request_count: i64,
}
