//! Reminder-to-notification scheduling loop.
//!
//! A tick scans for due reminders and emits at most one notification per
//! reminder. Overlapping cycles are tolerated: the notification store's
//! uniqueness constraint on `reminder_id` decides every race, and the emitter
//! treats a lost race as "already notified". The driver's overlap guard only
//! saves work.

pub mod clock;
pub mod driver;
pub mod emitter;
pub mod scanner;
pub mod store;

#[cfg(test)]
pub(crate) mod memory;

pub use clock::SystemClock;
pub use driver::ReminderScheduler;
pub use store::{NotificationStore, ReminderStore, StoreError};
