use crate::{
    error::{AppError, Result},
    middleware::AuthUser,
    state::AppState,
};
use super::notification_models::Notification;
use axum::{
    extract::{Path, State},
    response::{
        sse::{Event, KeepAlive},
        Sse,
    },
    Json,
};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use uuid::Uuid;

/// Get all notifications for the authenticated user, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    responses(
        (status = 200, description = "List of notifications", body = Vec<Notification>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn get_notifications(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Notification>>> {
    let notifications = state.notification_repository.find_all_by_user(user_id).await?;

    Ok(Json(notifications))
}

/// Subscribe to newly created notifications via Server-Sent Events
#[utoipa::path(
    get,
    path = "/api/notifications/stream",
    responses(
        (status = 200, description = "SSE stream of notifications"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn notification_stream(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let rx = state.notification_tx.subscribe();

    let stream = tokio_stream::wrappers::BroadcastStream::new(rx)
        .filter_map(move |msg| async move {
            match msg {
                Ok(notification) if notification.user_id == user_id => {
                    let event = Event::default()
                        .event("notification")
                        .json_data(&notification)
                        .ok()?;
                    Some(Ok(event))
                }
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!("Notification stream lagged: {}", e);
                    None
                }
            }
        });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Mark notification as read
#[utoipa::path(
    patch,
    path = "/api/notifications/{id}/read",
    params(
        ("id" = Uuid, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification marked as read", body = Notification),
        (status = 404, description = "Notification not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<Notification>> {
    let notification = state.notification_repository.mark_as_read(notification_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

    Ok(Json(notification))
}
