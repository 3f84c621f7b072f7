//! Authentication API Endpoints
//! Mission: Exchange the shared site password for a session token

use crate::auth::{
    jwt::JwtHandler,
    models::{LoginRequest, LoginResponse},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub jwt_handler: Arc<JwtHandler>,
    pub site_password: Arc<str>,
}

impl AuthState {
    pub fn new(jwt_handler: Arc<JwtHandler>, site_password: impl Into<Arc<str>>) -> Self {
        Self {
            jwt_handler,
            site_password: site_password.into(),
        }
    }
}

/// POST /api/login
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthApiError> {
    if payload.password.is_empty() || payload.password != *state.site_password {
        warn!("❌ Failed login attempt");
        return Err(AuthApiError::InvalidCredentials);
    }

    let (token, expires_in) = state
        .jwt_handler
        .generate_token()
        .map_err(|_| AuthApiError::InternalError)?;

    info!("✅ Login successful");

    Ok(Json(LoginResponse {
        token,
        expires_in,
        message: "Login successful".to_string(),
    }))
}

#[derive(Debug)]
pub enum AuthApiError {
    InvalidCredentials,
    InternalError,
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid password"),
            AuthApiError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AuthState {
        AuthState::new(Arc::new(JwtHandler::new("s".to_string(), 24)), "club")
    }

    #[tokio::test]
    async fn test_login_with_site_password() {
        let state = state();
        let Json(resp) = login(
            State(state.clone()),
            Json(LoginRequest {
                password: "club".to_string(),
            }),
        )
        .await
        .unwrap();

        assert!(state.jwt_handler.validate_token(&resp.token).is_ok());
        assert_eq!(resp.expires_in, 24 * 3600);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        for password in ["", "Club", "club "] {
            let err = login(
                State(state()),
                Json(LoginRequest {
                    password: password.to_string(),
                }),
            )
            .await
            .unwrap_err();
            assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
        }
    }
}
