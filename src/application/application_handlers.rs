use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, Result},
    middleware::AuthUser,
    state::AppState,
};
use super::{
    application_dto::{ApplicationRequest, PinApplicationRequest, UpdateApplicationStatusRequest},
    application_models::Application,
};

fn not_found() -> AppError {
    AppError::NotFound("Application not found".to_string())
}

/// List the caller's applications, most recently applied first
#[utoipa::path(
    get,
    path = "/api/applications",
    responses(
        (status = 200, description = "List of applications", body = Vec<Application>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "applications",
    security(("bearer_auth" = []))
)]
pub async fn get_applications(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Application>>> {
    let applications = state.application_repository.find_all_by_user(user_id).await?;
    Ok(Json(applications))
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application", body = Application),
        (status = 404, description = "Application not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "applications",
    security(("bearer_auth" = []))
)]
pub async fn get_application(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(application_id): Path<Uuid>,
) -> Result<Json<Application>> {
    let application = state
        .application_repository
        .find_by_id(application_id, user_id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(application))
}

/// Add a job application to the board
#[utoipa::path(
    post,
    path = "/api/applications",
    request_body = ApplicationRequest,
    responses(
        (status = 201, description = "Application created", body = Application),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "applications",
    security(("bearer_auth" = []))
)]
pub async fn create_application(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ApplicationRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let application = state.application_repository.create(user_id, &payload).await?;
    tracing::debug!(application_id = %application.id, "application created");

    Ok((StatusCode::CREATED, Json(application)))
}

#[utoipa::path(
    put,
    path = "/api/applications/{id}",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = ApplicationRequest,
    responses(
        (status = 200, description = "Application updated", body = Application),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Application not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "applications",
    security(("bearer_auth" = []))
)]
pub async fn update_application(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(application_id): Path<Uuid>,
    Json(payload): Json<ApplicationRequest>,
) -> Result<Json<Application>> {
    payload.validate()?;

    let application = state
        .application_repository
        .update(application_id, user_id, &payload)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(application))
}

/// Move an application to another board column
#[utoipa::path(
    patch,
    path = "/api/applications/{id}/status",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = UpdateApplicationStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = Application),
        (status = 404, description = "Application not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "applications",
    security(("bearer_auth" = []))
)]
pub async fn update_application_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(application_id): Path<Uuid>,
    Json(payload): Json<UpdateApplicationStatusRequest>,
) -> Result<Json<Application>> {
    let application = state
        .application_repository
        .update_status(application_id, user_id, payload.status)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(application))
}

#[utoipa::path(
    patch,
    path = "/api/applications/{id}/pin",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = PinApplicationRequest,
    responses(
        (status = 200, description = "Pin state updated", body = Application),
        (status = 404, description = "Application not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "applications",
    security(("bearer_auth" = []))
)]
pub async fn pin_application(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(application_id): Path<Uuid>,
    Json(payload): Json<PinApplicationRequest>,
) -> Result<Json<Application>> {
    let application = state
        .application_repository
        .set_pinned(application_id, user_id, payload.pinned)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(application))
}

#[utoipa::path(
    delete,
    path = "/api/applications/{id}",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 204, description = "Application deleted"),
        (status = 404, description = "Application not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "applications",
    security(("bearer_auth" = []))
)]
pub async fn delete_application(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(application_id): Path<Uuid>,
) -> Result<StatusCode> {
    let rows_affected = state.application_repository.delete(application_id, user_id).await?;

    if rows_affected == 0 {
        return Err(not_found());
    }

    Ok(StatusCode::NO_CONTENT)
}
