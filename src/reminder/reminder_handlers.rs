use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{error::Result, middleware::AuthUser, state::AppState};
use super::{
    reminder_dto::{CreateReminderRequest, UpdateReminderRequest},
    reminder_models::Reminder,
};

/// List the caller's reminders, soonest first
#[utoipa::path(
    get,
    path = "/api/reminders",
    responses(
        (status = 200, description = "List of reminders", body = Vec<Reminder>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "reminders",
    security(("bearer_auth" = []))
)]
pub async fn get_reminders(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Reminder>>> {
    let reminders = state.reminder_service.list_reminders(user_id).await?;
    Ok(Json(reminders))
}

/// Schedule a reminder
#[utoipa::path(
    post,
    path = "/api/reminders",
    request_body = CreateReminderRequest,
    responses(
        (status = 201, description = "Reminder created", body = Reminder),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Linked application not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "reminders",
    security(("bearer_auth" = []))
)]
pub async fn create_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateReminderRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let reminder = state.reminder_service.create_reminder(user_id, payload).await?;
    tracing::debug!(reminder_id = %reminder.id, due = %reminder.reminder_date, "reminder scheduled");

    Ok((StatusCode::CREATED, Json(reminder)))
}

#[utoipa::path(
    put,
    path = "/api/reminders/{id}",
    params(("id" = Uuid, Path, description = "Reminder ID")),
    request_body = UpdateReminderRequest,
    responses(
        (status = 200, description = "Reminder updated", body = Reminder),
        (status = 404, description = "Reminder not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "reminders",
    security(("bearer_auth" = []))
)]
pub async fn update_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(reminder_id): Path<Uuid>,
    Json(payload): Json<UpdateReminderRequest>,
) -> Result<Json<Reminder>> {
    payload.validate()?;

    let reminder = state
        .reminder_service
        .update_reminder(user_id, reminder_id, payload)
        .await?;

    Ok(Json(reminder))
}

#[utoipa::path(
    delete,
    path = "/api/reminders/{id}",
    params(("id" = Uuid, Path, description = "Reminder ID")),
    responses(
        (status = 204, description = "Reminder deleted"),
        (status = 404, description = "Reminder not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "reminders",
    security(("bearer_auth" = []))
)]
pub async fn delete_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(reminder_id): Path<Uuid>,
) -> Result<StatusCode> {
    state.reminder_service.delete_reminder(user_id, reminder_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
