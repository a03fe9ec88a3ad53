use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One-time alert raised when a reminder becomes due. At most one exists per
/// `reminder_id`; the `notifications_reminder_id_key` constraint enforces it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reminder_id: Uuid,
    pub title: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
