use super::{backup, cash, drinks, games, members, AppState};
use crate::auth::{self, AuthState};
use crate::middleware::{rate_limit_middleware, request_logging, RateLimitLayer};
use axum::{
    middleware,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::cors::CorsLayer;

/// Create the API router
///
/// `/api/health` and `/api/login` are public; everything else needs a
/// bearer token. Rate limiting and request logging wrap all routes.
pub fn build_router(state: AppState, auth_state: AuthState, limiter: RateLimitLayer) -> Router {
    let protected_routes = Router::new()
        .route(
            "/api/members",
            get(members::list_members).post(members::create_member),
        )
        .route(
            "/api/members/:id",
            put(members::update_member).delete(members::delete_member),
        )
        .route("/api/games", get(games::list_games).post(games::create_game))
        .route(
            "/api/games/:id",
            put(games::update_game).delete(games::delete_game),
        )
        .route("/api/drinks", get(drinks::drinks_overview))
        .route("/api/drinks/prices", put(drinks::update_prices))
        .route("/api/drinks/add", post(drinks::add_drinks))
        .route("/api/drinks/pay", post(drinks::pay_debt))
        .route("/api/cash", get(cash::cash_register))
        .route("/api/cash/transaction", post(cash::add_transaction))
        .route("/api/cash/history", delete(cash::clear_history))
        .route("/api/backup/download", get(backup::download))
        .route("/api/backup/validate", post(backup::validate))
        .route("/api/backup/upload", post(backup::upload))
        .route_layer(middleware::from_fn_with_state(
            auth_state.jwt_handler.clone(),
            auth::auth_middleware,
        ))
        .with_state(state);

    let auth_router = Router::new()
        .route("/api/login", post(auth::api::login))
        .with_state(auth_state);

    let public_routes = Router::new().route("/api/health", get(health_check));

    Router::new()
        .merge(public_routes)
        .merge(auth_router)
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(limiter, rate_limit_middleware))
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now(),
    })
}
