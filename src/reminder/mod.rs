pub mod reminder_models;
pub mod reminder_dto;
pub mod reminder_repository;
pub mod reminder_service;
pub mod reminder_handlers;

pub use reminder_models::Reminder;
pub use reminder_dto::{CreateReminderRequest, UpdateReminderRequest};
pub use reminder_repository::ReminderRepository;
pub use reminder_service::ReminderService;
pub use reminder_handlers::{create_reminder, delete_reminder, get_reminders, update_reminder};
