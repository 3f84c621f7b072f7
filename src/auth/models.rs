//! Authentication Models
//! Mission: Define the shared-password login and session token payloads

use serde::{Deserialize, Serialize};

/// Subject stored in every session token. There are no per-user accounts.
pub const SESSION_SUBJECT: &str = "admin";

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize, // expiration timestamp
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: usize, // seconds until expiration
    pub message: String,
}
