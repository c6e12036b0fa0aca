//! Outbound task notifications.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{AsyncCommands, Client};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("publish failed: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("{0}")]
    Other(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, message: &str) -> Result<(), NotifyError>;
}

/// Human-readable line announcing that `user_id` created `task_id`.
pub fn task_created_message(user_id: u64, task_id: u64, created_at: DateTime<Utc>) -> String {
    format!(
        "The tech {} performed the task {} on date {}",
        user_id,
        task_id,
        created_at.format("%Y-%m-%d")
    )
}

/// Publishes on a Redis pub/sub channel.
pub struct RedisNotifier {
    client: Arc<Client>,
    channel: String,
}

impl RedisNotifier {
    pub fn new(client: Arc<Client>, channel: impl Into<String>) -> Self {
        Self {
            client,
            channel: channel.into(),
        }
    }
}

#[async_trait]
impl Notifier for RedisNotifier {
    async fn publish(&self, message: &str) -> Result<(), NotifyError> {
        let mut conn = self.client.get_async_connection().await?;
        let receivers: u64 = conn.publish(&self.channel, message).await?;
        tracing::debug!(channel = %self.channel, receivers, "notification published");
        Ok(())
    }
}

/// Used when notifications are switched off: the message only reaches the log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn publish(&self, message: &str) -> Result<(), NotifyError> {
        tracing::info!(%message, "notification");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn message_names_tech_task_and_date() {
        let at = Utc.with_ymd_and_hms(2023, 3, 7, 15, 4, 5).unwrap();
        assert_eq!(
            task_created_message(4, 12, at),
            "The tech 4 performed the task 12 on date 2023-03-07"
        );
    }

    #[tokio::test]
    async fn log_notifier_never_fails() {
        assert!(LogNotifier.publish("hello").await.is_ok());
    }
}
