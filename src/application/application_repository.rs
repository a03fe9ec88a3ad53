use crate::error::Result;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::application_dto::ApplicationRequest;
use super::application_models::{Application, ApplicationStatus};

#[derive(Clone)]
pub struct ApplicationRepository {
    pool: PgPool,
}

impl ApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_all_by_user(&self, user_id: Uuid) -> Result<Vec<Application>> {
        let applications = sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE user_id = $1 ORDER BY applied_date DESC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(applications)
    }

    pub async fn find_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<Application>> {
        let application = sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE id = $1 AND user_id = $2"
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(application)
    }

    pub async fn create(&self, user_id: Uuid, payload: &ApplicationRequest) -> Result<Application> {
        let application = sqlx::query_as::<_, Application>(
            "INSERT INTO applications (
                user_id, company, job_title, location, status, applied_date, salary,
                job_description, recruiter_name, recruiter_email, recruiter_phone, notes,
                interview_date, follow_up_date
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING *"
        )
        .bind(user_id)
        .bind(&payload.company)
        .bind(&payload.job_title)
        .bind(&payload.location)
        .bind(payload.status.to_string())
        .bind(payload.applied_date.unwrap_or_else(Utc::now))
        .bind(&payload.salary)
        .bind(&payload.job_description)
        .bind(&payload.recruiter_name)
        .bind(&payload.recruiter_email)
        .bind(&payload.recruiter_phone)
        .bind(&payload.notes)
        .bind(payload.interview_date)
        .bind(payload.follow_up_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(application)
    }

    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        payload: &ApplicationRequest,
    ) -> Result<Option<Application>> {
        let application = sqlx::query_as::<_, Application>(
            "UPDATE applications SET
                company = $1,
                job_title = $2,
                location = $3,
                status = $4,
                applied_date = COALESCE($5, applied_date),
                salary = $6,
                job_description = $7,
                recruiter_name = $8,
                recruiter_email = $9,
                recruiter_phone = $10,
                notes = $11,
                interview_date = $12,
                follow_up_date = $13,
                updated_at = NOW()
             WHERE id = $14 AND user_id = $15
             RETURNING *"
        )
        .bind(&payload.company)
        .bind(&payload.job_title)
        .bind(&payload.location)
        .bind(payload.status.to_string())
        .bind(payload.applied_date)
        .bind(&payload.salary)
        .bind(&payload.job_description)
        .bind(&payload.recruiter_name)
        .bind(&payload.recruiter_email)
        .bind(&payload.recruiter_phone)
        .bind(&payload.notes)
        .bind(payload.interview_date)
        .bind(payload.follow_up_date)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(application)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        user_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<Application>> {
        let application = sqlx::query_as::<_, Application>(
            "UPDATE applications SET status = $1, updated_at = NOW()
             WHERE id = $2 AND user_id = $3
             RETURNING *"
        )
        .bind(status.to_string())
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(application)
    }

    pub async fn set_pinned(&self, id: Uuid, user_id: Uuid, pinned: bool) -> Result<Option<Application>> {
        let application = sqlx::query_as::<_, Application>(
            "UPDATE applications SET pinned = $1, updated_at = NOW()
             WHERE id = $2 AND user_id = $3
             RETURNING *"
        )
        .bind(pinned)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(application)
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM applications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
