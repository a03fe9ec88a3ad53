//! In-memory stores for exercising the scheduling loop without PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

use super::store::{NotificationStore, ReminderStore, StoreError};
use crate::notification::Notification;
use crate::reminder::Reminder;

pub fn reminder(user_id: Uuid, title: &str, reminder_date: DateTime<Utc>) -> Reminder {
    Reminder {
        id: Uuid::new_v4(),
        user_id,
        application_id: None,
        title: title.to_string(),
        reminder_date,
        created_at: reminder_date,
        updated_at: reminder_date,
    }
}

#[derive(Debug, Default)]
pub struct InMemoryReminderStore {
    reminders: DashMap<Uuid, Reminder>,
}

impl InMemoryReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, reminder: Reminder) -> Uuid {
        let id = reminder.id;
        self.reminders.insert(id, reminder);
        id
    }
}

#[async_trait]
impl ReminderStore for InMemoryReminderStore {
    async fn find_due_reminders(&self, now: DateTime<Utc>) -> Result<Vec<Reminder>, StoreError> {
        Ok(self
            .reminders
            .iter()
            .filter(|entry| entry.is_due(now))
            .map(|entry| entry.value().clone())
            .collect())
    }
}

/// Keyed by `reminder_id`, which gives the same uniqueness guarantee as the
/// database constraint.
#[derive(Debug, Default)]
pub struct InMemoryNotificationStore {
    by_reminder: DashMap<Uuid, Notification>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_reminder.len()
    }

    pub fn get(&self, reminder_id: Uuid) -> Option<Notification> {
        self.by_reminder.get(&reminder_id).map(|n| n.value().clone())
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn find_notification_by_reminder_id(
        &self,
        reminder_id: Uuid,
    ) -> Result<Option<Notification>, StoreError> {
        Ok(self.get(reminder_id))
    }

    async fn create_notification(
        &self,
        user_id: Uuid,
        reminder_id: Uuid,
        title: &str,
    ) -> Result<Notification, StoreError> {
        match self.by_reminder.entry(reminder_id) {
            Entry::Occupied(_) => Err(StoreError::UniqueViolation),
            Entry::Vacant(slot) => {
                let notification = Notification {
                    id: Uuid::new_v4(),
                    user_id,
                    reminder_id,
                    title: title.to_string(),
                    is_read: false,
                    created_at: Utc::now(),
                };
                slot.insert(notification.clone());
                Ok(notification)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_second_create_is_unique_violation() {
        let store = InMemoryNotificationStore::new();
        let user_id = Uuid::new_v4();
        let reminder_id = Uuid::new_v4();

        store.create_notification(user_id, reminder_id, "first").await.unwrap();
        let second = store.create_notification(user_id, reminder_id, "second").await;

        assert_eq!(second.unwrap_err(), StoreError::UniqueViolation);
        assert_eq!(store.get(reminder_id).unwrap().title, "first");
    }
}
