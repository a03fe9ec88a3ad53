use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::store::{bounded, ReminderStore, StoreError};
use crate::reminder::Reminder;

/// Finds reminders whose trigger time has passed.
///
/// There is no staleness cutoff: a reminder that came due during an outage is
/// still returned on the first cycle after recovery. Existing notifications
/// are not filtered here; the emitter checks per reminder.
pub struct DueReminderScanner {
    reminders: Arc<dyn ReminderStore>,
    timeout: Duration,
}

impl DueReminderScanner {
    pub fn new(reminders: Arc<dyn ReminderStore>, timeout: Duration) -> Self {
        Self { reminders, timeout }
    }

    /// Due reminders ordered by `reminder_date`, oldest first.
    pub async fn scan(&self, now: DateTime<Utc>) -> Result<Vec<Reminder>, StoreError> {
        let mut due = bounded(self.timeout, self.reminders.find_due_reminders(now)).await?;
        debug_assert!(due.iter().all(|reminder| reminder.is_due(now)));
        due.sort_by_key(|reminder| reminder.reminder_date);
        Ok(due)
    }
}
