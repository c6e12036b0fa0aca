//! Storage capabilities consumed by the core. Implementations are injected
//! at construction time.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewTask, NewUser, Task, User};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// A uniqueness constraint rejected the write.
    #[error("{0}")]
    Conflict(String),

    #[error("redis: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("corrupt record: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(&self, task: NewTask) -> StoreResult<Task>;
    async fn get(&self, id: u64) -> StoreResult<Task>;
    /// Rewrites the summary only; owner and creation time are untouched.
    async fn update_summary(&self, id: u64, summary: &str) -> StoreResult<Task>;
    async fn delete(&self, id: u64) -> StoreResult<()>;
    async fn list_all(&self) -> StoreResult<Vec<Task>>;
    async fn list_by_owner(&self, owner_id: u64) -> StoreResult<Vec<Task>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with [`StoreError::Conflict`] when the email is already taken.
    async fn create(&self, user: NewUser) -> StoreResult<User>;
    async fn get_by_email(&self, email: &str) -> StoreResult<User>;
}
