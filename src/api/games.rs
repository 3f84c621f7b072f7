use super::{ack, ApiError, AppState};
use crate::ledger::{Game, GameInput};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::Value;
use tracing::info;

/// GET /api/games
pub async fn list_games(State(state): State<AppState>) -> Json<Vec<Game>> {
    Json(state.read(|doc| doc.games_sorted()))
}

/// POST /api/games
pub async fn create_game(
    State(state): State<AppState>,
    payload: Result<Json<GameInput>, JsonRejection>,
) -> Result<Json<Game>, ApiError> {
    let Json(input) = payload?;
    let game = state.mutate(|doc| doc.add_game(input))?;
    info!(game_id = game.id, opponent = %game.opponent, "📅 Game scheduled");
    Ok(Json(game))
}

/// PUT /api/games/:id
pub async fn update_game(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    payload: Result<Json<GameInput>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(input) = payload?;
    state.mutate(|doc| doc.update_game(id, input))?;
    info!(game_id = id, "Game updated");
    Ok(ack("Game updated"))
}

/// DELETE /api/games/:id
pub async fn delete_game(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    state.mutate(|doc| doc.delete_game(id))?;
    info!(game_id = id, "Game deleted");
    Ok(ack("Game deleted"))
}
