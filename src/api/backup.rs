use super::{ApiError, AppState};
use crate::backup::{self, Snapshot, ValidationReport};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupRequest {
    #[serde(default)]
    pub backup_data: Value,
}

/// GET /api/backup/download
pub async fn download(State(state): State<AppState>) -> Json<Snapshot> {
    let snapshot = state.read(backup::export_snapshot);
    info!(
        members = snapshot.members_count,
        games = snapshot.games_count,
        "📤 Backup exported"
    );
    Json(snapshot)
}

/// POST /api/backup/validate
pub async fn validate(
    payload: Result<Json<BackupRequest>, JsonRejection>,
) -> Result<Json<ValidationReport>, ApiError> {
    let Json(req) = payload?;
    Ok(Json(backup::validate_snapshot(&req.backup_data)))
}

/// POST /api/backup/upload
///
/// The live ledger is replaced before the save runs, so a failed save is
/// reported in the body rather than as an error status.
pub async fn upload(
    State(state): State<AppState>,
    payload: Result<Json<BackupRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload?;
    let (report, saved) =
        backup::import_snapshot(&req.backup_data, &state.ledger, &state.store).await?;

    if !saved.is_persisted() {
        warn!("Imported backup is live but was not persisted");
    }

    Ok(Json(json!({
        "message": "Backup restored",
        "info": report.info,
        "persisted": saved.is_persisted(),
        "savedTo": saved.accepted(),
    })))
}
