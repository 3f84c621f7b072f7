use super::{ack, ApiError, AppState};
use crate::ledger::{Member, MemberStats, MemberStatus};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct MembersResponse {
    pub members: Vec<Member>,
    pub stats: MemberStats,
}

#[derive(Debug, Deserialize)]
pub struct CreateMemberRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemberRequest {
    pub status: MemberStatus,
}

/// GET /api/members
pub async fn list_members(State(state): State<AppState>) -> Json<MembersResponse> {
    Json(state.read(|doc| MembersResponse {
        members: doc.members.clone(),
        stats: doc.member_stats(),
    }))
}

/// POST /api/members
pub async fn create_member(
    State(state): State<AppState>,
    payload: Result<Json<CreateMemberRequest>, JsonRejection>,
) -> Result<Json<Member>, ApiError> {
    let Json(req) = payload?;
    let member = state.mutate(|doc| doc.add_member(&req.name))?;
    info!(member_id = member.id, "👤 Member added");
    Ok(Json(member))
}

/// PUT /api/members/:id
pub async fn update_member(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    payload: Result<Json<UpdateMemberRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload?;
    state.mutate(|doc| doc.set_member_status(id, req.status))?;
    info!(member_id = id, status = req.status.as_str(), "Member status updated");
    Ok(ack("Status updated"))
}

/// DELETE /api/members/:id
pub async fn delete_member(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    let removed = state.mutate(|doc| doc.delete_member(id))?;
    info!(member_id = id, name = %removed.name, "🗑️ Member deleted");
    Ok(ack("Member deleted"))
}
