pub mod notification_models;
pub mod notification_repository;
pub mod notification_handlers;

pub use notification_models::Notification;
pub use notification_repository::NotificationRepository;
