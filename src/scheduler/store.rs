use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::notification::Notification;
use crate::reminder::Reminder;

/// Failures surfaced by the stores the scheduling loop reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("a notification already exists for this reminder")]
    UniqueViolation,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
    #[error("store error: {0}")]
    Other(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            return StoreError::UniqueViolation;
        }

        match &err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StoreError::Unavailable(err.to_string()),
            _ => StoreError::Other(err.to_string()),
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

/// Read side of the loop: reminders filtered by due time.
#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// All reminders with `reminder_date <= now`, in no particular order.
    async fn find_due_reminders(&self, now: DateTime<Utc>) -> Result<Vec<Reminder>, StoreError>;
}

/// Write side of the loop.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn find_notification_by_reminder_id(
        &self,
        reminder_id: Uuid,
    ) -> Result<Option<Notification>, StoreError>;

    /// Must fail with [`StoreError::UniqueViolation`] when a notification for
    /// `reminder_id` already exists.
    async fn create_notification(
        &self,
        user_id: Uuid,
        reminder_id: Uuid,
        title: &str,
    ) -> Result<Notification, StoreError>;
}

/// Runs a store call with an upper bound so a hung dependency cannot stall the loop.
pub(crate) async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| StoreError::Timeout(limit))?
}
