use uuid::Uuid;

use crate::application::ApplicationRepository;
use crate::error::{AppError, Result};
use super::reminder_dto::{CreateReminderRequest, UpdateReminderRequest};
use super::reminder_models::Reminder;
use super::reminder_repository::ReminderRepository;

/// Service layer for reminder-related business logic.
#[derive(Clone)]
pub struct ReminderService {
    repo: ReminderRepository,
    applications: ApplicationRepository,
}

impl ReminderService {
    pub fn new(repo: ReminderRepository, applications: ApplicationRepository) -> Self {
        Self { repo, applications }
    }

    pub async fn list_reminders(&self, user_id: Uuid) -> Result<Vec<Reminder>> {
        self.repo.find_all_by_user(user_id).await
    }

    pub async fn create_reminder(
        &self,
        user_id: Uuid,
        payload: CreateReminderRequest,
    ) -> Result<Reminder> {
        if let Some(application_id) = payload.application_id {
            self.applications
                .find_by_id(application_id, user_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Application not found".into()))?;
        }

        self.repo
            .create(
                user_id,
                payload.application_id,
                payload.title.as_deref().unwrap_or_default(),
                payload.reminder_date,
            )
            .await
    }

    pub async fn update_reminder(
        &self,
        user_id: Uuid,
        reminder_id: Uuid,
        payload: UpdateReminderRequest,
    ) -> Result<Reminder> {
        self.repo
            .update(reminder_id, user_id, payload.title.as_deref(), payload.reminder_date)
            .await?
            .ok_or_else(|| AppError::NotFound("Reminder not found".into()))
    }

    pub async fn delete_reminder(&self, user_id: Uuid, reminder_id: Uuid) -> Result<()> {
        if self.repo.delete(reminder_id, user_id).await? == 0 {
            return Err(AppError::NotFound("Reminder not found".into()));
        }
        Ok(())
    }
}
