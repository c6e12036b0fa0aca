use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

pub const MAX_SUMMARY_CHARS: usize = 2500;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub summary: String,
    pub user_id: u64,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "modifiedAt")]
    pub updated_at: DateTime<Utc>,
}

/// A task that has not been persisted yet; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub summary: String,
    pub user_id: u64,
}

/// Request body for create and update.
///
/// `userId` is accepted for compatibility but never used for authorization;
/// ownership always comes from the credential.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct TaskPayload {
    pub summary: String,
    pub user_id: Option<u64>,
}

impl TaskPayload {
    /// Checks one rule at a time: presence first, then length.
    pub fn validate(&self) -> AppResult<()> {
        if self.summary.is_empty() {
            return Err(AppError::BadRequest(
                "the field summary is required can't be empty".into(),
            ));
        }
        if self.summary.chars().count() > MAX_SUMMARY_CHARS {
            return Err(AppError::BadRequest(format!(
                "the summary is too long need to be less or equal to {} characters",
                MAX_SUMMARY_CHARS
            )));
        }
        Ok(())
    }
}
