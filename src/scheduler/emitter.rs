use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, error, info};

use super::store::{bounded, NotificationStore, StoreError};
use crate::notification::Notification;
use crate::reminder::Reminder;

pub const FALLBACK_TITLE: &str = "You have a reminder!";

/// Title shown for a reminder's notification.
pub fn notification_title(reminder_title: &str) -> &str {
    if reminder_title.is_empty() {
        FALLBACK_TITLE
    } else {
        reminder_title
    }
}

#[derive(Debug, Clone)]
pub enum EmitOutcome {
    Created(Notification),
    /// Another cycle, or an earlier one, already created the notification.
    AlreadyNotified,
}

/// Tally of one scan-and-emit cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub due: usize,
    pub created: usize,
    pub already_notified: usize,
    pub failed: usize,
}

/// Creates exactly one notification per due reminder.
///
/// `emit` is idempotent under concurrent retries: the store's uniqueness
/// constraint picks a single winner and every other attempt resolves to
/// [`EmitOutcome::AlreadyNotified`].
pub struct NotificationEmitter {
    notifications: Arc<dyn NotificationStore>,
    timeout: Duration,
    notification_tx: Option<broadcast::Sender<Notification>>,
}

impl NotificationEmitter {
    pub fn new(notifications: Arc<dyn NotificationStore>, timeout: Duration) -> Self {
        Self {
            notifications,
            timeout,
            notification_tx: None,
        }
    }

    /// Publish every created notification to live subscribers.
    pub fn with_broadcast(mut self, tx: broadcast::Sender<Notification>) -> Self {
        self.notification_tx = Some(tx);
        self
    }

    pub async fn emit(&self, reminder: &Reminder) -> Result<EmitOutcome, StoreError> {
        let existing = bounded(
            self.timeout,
            self.notifications.find_notification_by_reminder_id(reminder.id),
        )
        .await?;
        if existing.is_some() {
            return Ok(EmitOutcome::AlreadyNotified);
        }

        let created = bounded(
            self.timeout,
            self.notifications.create_notification(
                reminder.user_id,
                reminder.id,
                notification_title(&reminder.title),
            ),
        )
        .await;

        match created {
            Ok(notification) => {
                if let Some(tx) = &self.notification_tx {
                    // No subscribers is fine.
                    let _ = tx.send(notification.clone());
                }
                Ok(EmitOutcome::Created(notification))
            }
            Err(StoreError::UniqueViolation) => Ok(EmitOutcome::AlreadyNotified),
            Err(e) => Err(e),
        }
    }

    /// Processes reminders one at a time. A failure is logged with the
    /// reminder id and does not stop the rest of the batch.
    pub async fn emit_all(&self, reminders: &[Reminder]) -> CycleReport {
        let mut report = CycleReport {
            due: reminders.len(),
            ..CycleReport::default()
        };

        for reminder in reminders {
            match self.emit(reminder).await {
                Ok(EmitOutcome::Created(notification)) => {
                    report.created += 1;
                    info!(
                        reminder_id = %reminder.id,
                        notification_id = %notification.id,
                        "Notification created for reminder"
                    );
                }
                Ok(EmitOutcome::AlreadyNotified) => {
                    report.already_notified += 1;
                    debug!(reminder_id = %reminder.id, "Notification already exists for reminder");
                }
                Err(e) => {
                    report.failed += 1;
                    error!(reminder_id = %reminder.id, error = %e, "Error processing reminder");
                }
            }
        }

        report
    }
}
