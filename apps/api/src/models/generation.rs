use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of a generation record. `Pending` moves to exactly one terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Pending,
    Complete,
    Failed,
}

impl GenerationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GenerationStatus::Pending => "pending",
            GenerationStatus::Complete => "complete",
            GenerationStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, GenerationStatus::Pending)
    }
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(GenerationStatus::Pending),
            "complete" => Ok(GenerationStatus::Complete),
            "failed" => Ok(GenerationStatus::Failed),
            other => Err(format!("unknown generation status '{other}'")),
        }
    }
}

/// One row of `jd_requests`. `status` is kept as text to match the column.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GenerationRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub input_json: Value,
    pub word_count: i32,
    pub tone: String,
    pub title: String,
    pub language: String,
    pub output_text: Option<String>,
    pub status: String,
    pub error: Option<String>,
}

impl GenerationRow {
    pub fn status(&self) -> Result<GenerationStatus, String> {
        self.status.parse()
    }
}

/// Fields supplied when a new pending record is created.
#[derive(Debug, Clone)]
pub struct NewGeneration {
    pub input: Value,
    pub word_count: u32,
    pub tone: String,
    pub title: String,
    pub language: String,
}
