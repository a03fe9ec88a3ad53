use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::scheduler::{ReminderStore, StoreError};
use super::reminder_models::Reminder;

#[derive(Clone)]
pub struct ReminderRepository {
    pool: PgPool,
}

impl ReminderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_all_by_user(&self, user_id: Uuid) -> Result<Vec<Reminder>> {
        let reminders = sqlx::query_as::<_, Reminder>(
            "SELECT * FROM reminders WHERE user_id = $1 ORDER BY reminder_date ASC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reminders)
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        application_id: Option<Uuid>,
        title: &str,
        reminder_date: DateTime<Utc>,
    ) -> Result<Reminder> {
        let reminder = sqlx::query_as::<_, Reminder>(
            "INSERT INTO reminders (user_id, application_id, title, reminder_date)
             VALUES ($1, $2, $3, $4)
             RETURNING *"
        )
        .bind(user_id)
        .bind(application_id)
        .bind(title)
        .bind(reminder_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(reminder)
    }

    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        title: Option<&str>,
        reminder_date: Option<DateTime<Utc>>,
    ) -> Result<Option<Reminder>> {
        let reminder = sqlx::query_as::<_, Reminder>(
            "UPDATE reminders SET
                title = COALESCE($1, title),
                reminder_date = COALESCE($2, reminder_date),
                updated_at = NOW()
             WHERE id = $3 AND user_id = $4
             RETURNING *"
        )
        .bind(title)
        .bind(reminder_date)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reminder)
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM reminders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ReminderStore for ReminderRepository {
    async fn find_due_reminders(
        &self,
        now: DateTime<Utc>,
    ) -> std::result::Result<Vec<Reminder>, StoreError> {
        let reminders = sqlx::query_as::<_, Reminder>(
            "SELECT * FROM reminders WHERE reminder_date <= $1"
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(reminders)
    }
}
