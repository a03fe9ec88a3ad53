use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReminderRequest {
    /// Blank strings are treated as "not linked to an application".
    #[serde(default, deserialize_with = "blank_as_none")]
    pub application_id: Option<Uuid>,
    #[validate(length(max = 500))]
    pub title: Option<String>,
    pub reminder_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateReminderRequest {
    #[validate(length(max = 500))]
    pub title: Option<String>,
    pub reminder_date: Option<DateTime<Utc>>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => Uuid::parse_str(raw.trim())
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}
