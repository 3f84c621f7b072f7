use super::{ack, ApiError, AppState};
use crate::ledger::money::deserialize_amount;
use crate::ledger::{Cash, CashEntryKind};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: CashEntryKind,
}

/// GET /api/cash
pub async fn cash_register(State(state): State<AppState>) -> Json<Cash> {
    Json(state.read(|doc| doc.cash.clone()))
}

/// POST /api/cash/transaction
pub async fn add_transaction(
    State(state): State<AppState>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload?;
    let receipt =
        state.mutate(|doc| doc.record_cash_transaction(req.amount, &req.description, req.kind))?;
    info!(
        kind = req.kind.as_str(),
        amount = req.amount,
        new_balance = receipt.new_balance,
        "💰 Cash transaction booked"
    );
    Ok(Json(json!({
        "message": "Transaction added",
        "newBalance": receipt.new_balance,
    })))
}

/// DELETE /api/cash/history
pub async fn clear_history(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let cleared = state.mutate(|doc| Ok(doc.clear_cash_history()))?;
    info!(entries = cleared, "Cash history cleared");
    Ok(ack("Cash history cleared"))
}
