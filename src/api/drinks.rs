use super::{ack, ApiError, AppState};
use crate::ledger::money::{deserialize_amount, deserialize_amount_map};
use crate::ledger::DrinksOverview;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct PricesRequest {
    #[serde(deserialize_with = "deserialize_amount_map")]
    pub prices: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub member_id: u64,
    #[serde(default)]
    pub drinks: BTreeMap<String, i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub member_id: u64,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: f64,
}

/// GET /api/drinks
pub async fn drinks_overview(State(state): State<AppState>) -> Json<DrinksOverview> {
    Json(state.read(|doc| doc.drinks_overview()))
}

/// PUT /api/drinks/prices
pub async fn update_prices(
    State(state): State<AppState>,
    payload: Result<Json<PricesRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload?;
    let count = req.prices.len();
    state.mutate(|doc| doc.set_drink_prices(req.prices))?;
    info!(drinks = count, "🍺 Drink prices updated");
    Ok(ack("Prices updated"))
}

/// POST /api/drinks/add
pub async fn add_drinks(
    State(state): State<AppState>,
    payload: Result<Json<PurchaseRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload?;
    let receipt = state.mutate(|doc| doc.record_drink_purchase(req.member_id, &req.drinks))?;
    info!(
        member_id = req.member_id,
        total_cost = receipt.total_cost,
        "🍺 Drinks recorded"
    );
    Ok(Json(json!({
        "message": "Drinks added",
        "totalCost": receipt.total_cost,
        "newDebts": receipt.new_debts,
    })))
}

/// POST /api/drinks/pay
pub async fn pay_debt(
    State(state): State<AppState>,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload?;
    let receipt = state.mutate(|doc| doc.pay_debt(req.member_id, req.amount))?;
    info!(
        member_id = req.member_id,
        amount = req.amount,
        new_balance = receipt.new_balance,
        "💶 Debt payment booked"
    );
    Ok(Json(json!({
        "message": "Payment processed",
        "newDebts": receipt.new_debts,
        "newBalance": receipt.new_balance,
    })))
}
