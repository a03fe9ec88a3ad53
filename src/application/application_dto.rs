use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::application_models::ApplicationStatus;

/// Body for creating or fully replacing an application.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ApplicationRequest {
    #[validate(length(min = 1, max = 200))]
    pub company: String,
    #[validate(length(min = 1, max = 200))]
    pub job_title: String,
    pub location: Option<String>,
    #[serde(default)]
    pub status: ApplicationStatus,
    pub applied_date: Option<DateTime<Utc>>,
    pub salary: Option<String>,
    pub job_description: Option<String>,
    pub recruiter_name: Option<String>,
    #[validate(email)]
    pub recruiter_email: Option<String>,
    pub recruiter_phone: Option<String>,
    pub notes: Option<String>,
    pub interview_date: Option<DateTime<Utc>>,
    pub follow_up_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateApplicationStatusRequest {
    pub status: ApplicationStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PinApplicationRequest {
    pub pinned: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_defaults_to_saved() {
        let req: ApplicationRequest =
            serde_json::from_value(json!({"company": "Acme", "job_title": "Engineer"})).unwrap();
        assert_eq!(req.status, ApplicationStatus::Saved);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_fields() {
        let req: ApplicationRequest = serde_json::from_value(json!({
            "company": "",
            "job_title": "Engineer",
            "recruiter_email": "not-an-email"
        }))
        .unwrap();

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("company"));
        assert!(fields.contains_key("recruiter_email"));
    }
}
