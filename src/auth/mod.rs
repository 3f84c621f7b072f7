//! Authentication Module
//! Mission: Gate the API behind one shared password and a JWT session

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;

pub use api::AuthState;
pub use jwt::JwtHandler;
pub use middleware::auth_middleware;
