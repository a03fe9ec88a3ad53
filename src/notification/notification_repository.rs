use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::scheduler::{NotificationStore, StoreError};
use super::notification_models::Notification;

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_all_by_user(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    pub async fn mark_as_read(&self, id: Uuid, user_id: Uuid) -> Result<Option<Notification>> {
        let notification = sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = true WHERE id = $1 AND user_id = $2 RETURNING *"
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn find_notification_by_reminder_id(
        &self,
        reminder_id: Uuid,
    ) -> std::result::Result<Option<Notification>, StoreError> {
        let notification = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE reminder_id = $1"
        )
        .bind(reminder_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Plain insert: a concurrent writer for the same reminder surfaces as
    /// `StoreError::UniqueViolation` (SQLSTATE 23505).
    async fn create_notification(
        &self,
        user_id: Uuid,
        reminder_id: Uuid,
        title: &str,
    ) -> std::result::Result<Notification, StoreError> {
        let notification = sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (user_id, reminder_id, title)
             VALUES ($1, $2, $3)
             RETURNING *"
        )
        .bind(user_id)
        .bind(reminder_id)
        .bind(title)
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }
}
