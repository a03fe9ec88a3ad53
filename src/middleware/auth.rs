use crate::{auth::verify_jwt, error::AppError, state::AppState};
use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Resolves the caller's session from the bearer token and stores the user id
/// in the request extensions. Requests without a valid session are rejected.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = session_user(req.headers().get(AUTHORIZATION), &state.config.jwt_secret)
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    req.extensions_mut().insert(user_id);

    Ok(next.run(req).await)
}

/// Current user's identity, or `None` when there is no usable session.
pub fn session_user(header: Option<&axum::http::HeaderValue>, secret: &str) -> Option<Uuid> {
    let token = header?.to_str().ok()?.strip_prefix("Bearer ")?;
    verify_jwt(token, secret).ok()?.user_id().ok()
}

// Extractor for getting user_id from request extensions
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Uuid>()
            .copied()
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))
    }
}
