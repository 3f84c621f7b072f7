//! Authentication Middleware
//! Mission: Protect API endpoints with JWT validation

use crate::auth::jwt::JwtHandler;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Auth middleware that validates JWT bearer tokens
pub async fn auth_middleware(
    State(jwt_handler): State<Arc<JwtHandler>>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;

    jwt_handler.validate_token(token).map_err(|e| {
        debug!("rejected token on {}: {:#}", req.uri().path(), e);
        AuthError::InvalidToken
    })?;

    Ok(next.run(req).await)
}

/// Auth error types
#[derive(Debug, PartialEq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Access token required"),
            AuthError::InvalidToken => (StatusCode::FORBIDDEN, "Invalid or expired token"),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
