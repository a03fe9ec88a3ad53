use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{debug, error, info, warn};

use super::clock::Clock;
use super::emitter::{CycleReport, NotificationEmitter};
use super::scanner::DueReminderScanner;
use super::store::{NotificationStore, ReminderStore, StoreError};
use crate::notification::Notification;
use crate::state::SchedulerConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Completed(CycleReport),
    /// The scan failed; the next tick starts over.
    Failed(StoreError),
    /// A previous cycle was still running.
    Skipped,
}

/// Drives the scan-and-emit cycle.
///
/// `run_cycle` performs exactly one cycle and is what tests call directly.
/// `start` hands `tick` to a cron job for the lifetime of the returned
/// [`SchedulerHandle`].
pub struct ReminderScheduler {
    scanner: DueReminderScanner,
    emitter: NotificationEmitter,
    clock: Arc<dyn Clock>,
    skip_overlapping_ticks: bool,
    running: AtomicBool,
}

impl ReminderScheduler {
    pub fn new(
        reminders: Arc<dyn ReminderStore>,
        notifications: Arc<dyn NotificationStore>,
        clock: Arc<dyn Clock>,
        config: &SchedulerConfig,
    ) -> Self {
        Self {
            scanner: DueReminderScanner::new(reminders, config.store_timeout),
            emitter: NotificationEmitter::new(notifications, config.store_timeout),
            clock,
            skip_overlapping_ticks: config.skip_overlapping_ticks,
            running: AtomicBool::new(false),
        }
    }

    pub fn with_broadcast(mut self, tx: broadcast::Sender<Notification>) -> Self {
        self.emitter = self.emitter.with_broadcast(tx);
        self
    }

    /// One scan-and-emit pass. Only a failed scan is returned as an error;
    /// per-reminder failures are counted in the report.
    pub async fn run_cycle(&self) -> Result<CycleReport, StoreError> {
        let now = self.clock.now();
        debug!(%now, "Running scheduled reminder check");

        let due = self.scanner.scan(now).await?;
        Ok(self.emitter.emit_all(&due).await)
    }

    /// Runs a cycle and swallows its errors after logging them.
    pub async fn tick(&self) -> TickOutcome {
        let _guard = if self.skip_overlapping_ticks {
            match CycleGuard::try_acquire(&self.running) {
                Some(guard) => Some(guard),
                None => {
                    warn!("Previous reminder cycle still running, skipping tick");
                    return TickOutcome::Skipped;
                }
            }
        } else {
            None
        };

        match self.run_cycle().await {
            Ok(report) => {
                if report.due > 0 {
                    info!(
                        due = report.due,
                        created = report.created,
                        already_notified = report.already_notified,
                        failed = report.failed,
                        "Reminder cycle finished"
                    );
                }
                TickOutcome::Completed(report)
            }
            Err(e) => {
                error!(error = %e, "Reminder scan failed, retrying on next tick");
                TickOutcome::Failed(e)
            }
        }
    }

    /// Registers `tick` on the given six-field cron schedule and starts it.
    pub async fn start(self: Arc<Self>, schedule: &str) -> Result<SchedulerHandle, JobSchedulerError> {
        let scheduler = JobScheduler::new().await?;

        let job = Job::new_async(schedule, move |_uuid, _l| {
            let this = self.clone();
            Box::pin(async move {
                this.tick().await;
            })
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;

        info!(schedule, "Reminder scheduler started");
        Ok(SchedulerHandle { scheduler })
    }
}

/// Keeps the cron job alive; `shutdown` stops it.
pub struct SchedulerHandle {
    scheduler: JobScheduler,
}

impl SchedulerHandle {
    pub async fn shutdown(mut self) -> Result<(), JobSchedulerError> {
        self.scheduler.shutdown().await?;
        info!("Reminder scheduler stopped");
        Ok(())
    }
}

/// Marks a cycle as in flight until dropped.
struct CycleGuard<'a>(&'a AtomicBool);

impl<'a> CycleGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CycleGuard(flag))
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::Reminder;
    use crate::scheduler::clock::ManualClock;
    use crate::scheduler::memory::{reminder, InMemoryNotificationStore, InMemoryReminderStore};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Barrier;
    use uuid::Uuid;

    fn config() -> SchedulerConfig {
        SchedulerConfig {
            store_timeout: std::time::Duration::from_millis(200),
            ..SchedulerConfig::default()
        }
    }

    fn scheduler(
        reminders: Arc<dyn ReminderStore>,
        notifications: Arc<dyn NotificationStore>,
        now: DateTime<Utc>,
    ) -> ReminderScheduler {
        ReminderScheduler::new(reminders, notifications, Arc::new(ManualClock::new(now)), &config())
    }

    /// Fails `create_notification` for one reminder.
    struct FailingFor {
        inner: InMemoryNotificationStore,
        reminder_id: Uuid,
    }

    #[async_trait]
    impl NotificationStore for FailingFor {
        async fn find_notification_by_reminder_id(
            &self,
            reminder_id: Uuid,
        ) -> Result<Option<Notification>, StoreError> {
            self.inner.find_notification_by_reminder_id(reminder_id).await
        }

        async fn create_notification(
            &self,
            user_id: Uuid,
            reminder_id: Uuid,
            title: &str,
        ) -> Result<Notification, StoreError> {
            if reminder_id == self.reminder_id {
                return Err(StoreError::Unavailable("connection reset".into()));
            }
            self.inner.create_notification(user_id, reminder_id, title).await
        }
    }

    /// Holds every lookup until both racers have passed the "no notification
    /// yet" check, forcing both to attempt the insert.
    struct RacingLookups {
        inner: InMemoryNotificationStore,
        barrier: Barrier,
    }

    #[async_trait]
    impl NotificationStore for RacingLookups {
        async fn find_notification_by_reminder_id(
            &self,
            reminder_id: Uuid,
        ) -> Result<Option<Notification>, StoreError> {
            let found = self.inner.find_notification_by_reminder_id(reminder_id).await;
            self.barrier.wait().await;
            found
        }

        async fn create_notification(
            &self,
            user_id: Uuid,
            reminder_id: Uuid,
            title: &str,
        ) -> Result<Notification, StoreError> {
            self.inner.create_notification(user_id, reminder_id, title).await
        }
    }

    /// Fails the first `failures` scans, then delegates.
    struct FlakyReminders {
        inner: InMemoryReminderStore,
        failures: AtomicUsize,
    }

    #[async_trait]
    impl ReminderStore for FlakyReminders {
        async fn find_due_reminders(&self, now: DateTime<Utc>) -> Result<Vec<Reminder>, StoreError> {
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(StoreError::Unavailable("database is down".into()));
            }
            self.inner.find_due_reminders(now).await
        }
    }

    struct HungReminders;

    #[async_trait]
    impl ReminderStore for HungReminders {
        async fn find_due_reminders(&self, _now: DateTime<Utc>) -> Result<Vec<Reminder>, StoreError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_sequential_cycles_emit_once() {
        let now = Utc::now();
        let reminders = Arc::new(InMemoryReminderStore::new());
        let notifications = Arc::new(InMemoryNotificationStore::new());
        let id = reminders.insert(reminder(Uuid::new_v4(), "Call recruiter", now - Duration::minutes(5)));
        let scheduler = scheduler(reminders, notifications.clone(), now);

        let first = scheduler.run_cycle().await.unwrap();
        let second = scheduler.run_cycle().await.unwrap();

        assert_eq!(first.created, 1);
        assert_eq!(second.created, 0);
        assert_eq!(second.already_notified, 1);
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications.get(id).unwrap().title, "Call recruiter");
    }

    #[tokio::test]
    async fn test_five_cycles_one_notification() {
        let now = Utc::now();
        let reminders = Arc::new(InMemoryReminderStore::new());
        let notifications = Arc::new(InMemoryNotificationStore::new());
        let id = reminders.insert(reminder(Uuid::new_v4(), "", now - Duration::seconds(1)));
        let clock = Arc::new(ManualClock::new(now));
        let scheduler =
            ReminderScheduler::new(reminders, notifications.clone(), clock.clone(), &config());

        for _ in 0..5 {
            assert!(matches!(scheduler.tick().await, TickOutcome::Completed(_)));
            clock.advance(Duration::minutes(1));
        }

        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications.get(id).unwrap().title, "You have a reminder!");
    }

    #[tokio::test]
    async fn test_reminder_fires_once_clock_reaches_it() {
        let now = Utc::now();
        let reminders = Arc::new(InMemoryReminderStore::new());
        let notifications = Arc::new(InMemoryNotificationStore::new());
        let id = reminders.insert(reminder(Uuid::new_v4(), "Send portfolio", now + Duration::seconds(30)));
        let clock = Arc::new(ManualClock::new(now));
        let scheduler =
            ReminderScheduler::new(reminders, notifications.clone(), clock.clone(), &config());

        assert_eq!(scheduler.run_cycle().await.unwrap().due, 0);
        assert!(notifications.get(id).is_none());

        clock.advance(Duration::minutes(1));
        assert_eq!(scheduler.run_cycle().await.unwrap().created, 1);
        assert!(notifications.get(id).is_some());
    }

    #[tokio::test]
    async fn test_concurrent_cycles_race_to_one_notification() {
        let now = Utc::now();
        let reminders = Arc::new(InMemoryReminderStore::new());
        let id = reminders.insert(reminder(Uuid::new_v4(), "Negotiate offer", now));
        let notifications = Arc::new(RacingLookups {
            inner: InMemoryNotificationStore::new(),
            barrier: Barrier::new(2),
        });
        let a = scheduler(reminders.clone(), notifications.clone(), now);
        let b = scheduler(reminders, notifications.clone(), now);

        let (ra, rb) = tokio::join!(a.run_cycle(), b.run_cycle());
        let (ra, rb) = (ra.unwrap(), rb.unwrap());

        assert_eq!(ra.created + rb.created, 1);
        assert_eq!(ra.already_notified + rb.already_notified, 1);
        assert_eq!(ra.failed + rb.failed, 0);
        assert_eq!(notifications.inner.len(), 1);
        assert!(notifications.inner.get(id).is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_overlapping_cycles() {
        let now = Utc::now();
        let reminders = Arc::new(InMemoryReminderStore::new());
        let notifications = Arc::new(InMemoryNotificationStore::new());
        let user_id = Uuid::new_v4();
        for i in 0..25 {
            reminders.insert(reminder(user_id, &format!("reminder {i}"), now - Duration::seconds(i)));
        }
        let scheduler = Arc::new(scheduler(reminders, notifications.clone(), now));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let scheduler = scheduler.clone();
                tokio::spawn(async move { scheduler.run_cycle().await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            let report = handle.await.unwrap().unwrap();
            assert_eq!(report.failed, 0);
            created += report.created;
        }

        assert_eq!(created, 25);
        assert_eq!(notifications.len(), 25);
    }

    #[tokio::test]
    async fn test_failure_is_isolated_to_one_reminder() {
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let reminders = Arc::new(InMemoryReminderStore::new());
        let first = reminders.insert(reminder(user_id, "first", now - Duration::minutes(3)));
        let second = reminders.insert(reminder(user_id, "second", now - Duration::minutes(2)));
        let third = reminders.insert(reminder(user_id, "third", now - Duration::minutes(1)));
        let notifications = Arc::new(FailingFor {
            inner: InMemoryNotificationStore::new(),
            reminder_id: second,
        });
        let scheduler = scheduler(reminders, notifications.clone(), now);

        let report = scheduler.run_cycle().await.unwrap();

        assert_eq!(
            report,
            CycleReport {
                due: 3,
                created: 2,
                already_notified: 0,
                failed: 1
            }
        );
        assert!(notifications.inner.get(first).is_some());
        assert!(notifications.inner.get(second).is_none());
        assert!(notifications.inner.get(third).is_some());
    }

    #[tokio::test]
    async fn test_scan_failure_recovers_next_tick() {
        let now = Utc::now();
        let inner = InMemoryReminderStore::new();
        let id = inner.insert(reminder(Uuid::new_v4(), "Thank interviewer", now));
        let reminders = Arc::new(FlakyReminders {
            inner,
            failures: AtomicUsize::new(1),
        });
        let notifications = Arc::new(InMemoryNotificationStore::new());
        let scheduler = scheduler(reminders, notifications.clone(), now);

        assert!(matches!(
            scheduler.tick().await,
            TickOutcome::Failed(StoreError::Unavailable(_))
        ));
        assert_eq!(notifications.len(), 0);

        assert!(matches!(scheduler.tick().await, TickOutcome::Completed(_)));
        assert!(notifications.get(id).is_some());
    }

    #[tokio::test]
    async fn test_hung_scan_times_out() {
        let scheduler = scheduler(
            Arc::new(HungReminders),
            Arc::new(InMemoryNotificationStore::new()),
            Utc::now(),
        );

        let outcome = scheduler.tick().await;

        assert_eq!(
            outcome,
            TickOutcome::Failed(StoreError::Timeout(config().store_timeout))
        );
        assert!(!scheduler.running.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn test_tick_skipped_while_cycle_in_flight() {
        let now = Utc::now();
        let reminders = Arc::new(InMemoryReminderStore::new());
        reminders.insert(reminder(Uuid::new_v4(), "", now));
        let notifications = Arc::new(InMemoryNotificationStore::new());
        let scheduler = scheduler(reminders, notifications.clone(), now);

        {
            let _in_flight = CycleGuard::try_acquire(&scheduler.running).unwrap();
            assert_eq!(scheduler.tick().await, TickOutcome::Skipped);
            assert_eq!(notifications.len(), 0);
        }

        assert!(matches!(scheduler.tick().await, TickOutcome::Completed(_)));
        assert_eq!(notifications.len(), 1);
    }

    #[tokio::test]
    async fn test_overlap_allowed_when_guard_disabled() {
        let now = Utc::now();
        let reminders = Arc::new(InMemoryReminderStore::new());
        reminders.insert(reminder(Uuid::new_v4(), "", now));
        let notifications = Arc::new(InMemoryNotificationStore::new());
        let scheduler = ReminderScheduler::new(
            reminders,
            notifications.clone(),
            Arc::new(ManualClock::new(now)),
            &SchedulerConfig {
                skip_overlapping_ticks: false,
                ..config()
            },
        );

        let _in_flight = CycleGuard::try_acquire(&scheduler.running).unwrap();
        assert!(matches!(scheduler.tick().await, TickOutcome::Completed(_)));
        assert_eq!(notifications.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_start_and_shutdown() {
        let scheduler = Arc::new(scheduler(
            Arc::new(InMemoryReminderStore::new()),
            Arc::new(InMemoryNotificationStore::new()),
            Utc::now(),
        ));

        let handle = scheduler.start("0 * * * * *").await.unwrap();
        handle.shutdown().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_start_rejects_bad_schedule() {
        let scheduler = Arc::new(scheduler(
            Arc::new(InMemoryReminderStore::new()),
            Arc::new(InMemoryNotificationStore::new()),
            Utc::now(),
        ));

        assert!(scheduler.start("every minute please").await.is_err());
    }
}
