use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Kanban column an application sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Saved,
    Submitted,
    Interviewed,
    Offered,
    Rejected,
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationStatus::Saved => write!(f, "saved"),
            ApplicationStatus::Submitted => write!(f, "submitted"),
            ApplicationStatus::Interviewed => write!(f, "interviewed"),
            ApplicationStatus::Offered => write!(f, "offered"),
            ApplicationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Application {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company: String,
    pub job_title: String,
    pub location: Option<String>,
    pub status: String,
    pub applied_date: DateTime<Utc>,
    pub salary: Option<String>,
    pub job_description: Option<String>,
    pub recruiter_name: Option<String>,
    pub recruiter_email: Option<String>,
    pub recruiter_phone: Option<String>,
    pub notes: Option<String>,
    pub interview_date: Option<DateTime<Utc>>,
    pub follow_up_date: Option<DateTime<Utc>>,
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
