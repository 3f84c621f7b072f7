//! Backup Transfer
//! Mission: Portable snapshots of the whole ledger for disaster recovery
//!
//! A snapshot is the ledger document with metadata fields next to the four
//! sections, so a snapshot file is itself a readable ledger:
//!
//! ```json
//! { "version": "1.0", "createdAt": "...", "membersCount": 2, "gamesCount": 0,
//!   "members": [...], "games": [...], "drinks": {...}, "cash": {...} }
//! ```

use crate::error::{LedgerError, Result};
use crate::ledger::{LedgerDocument, SharedLedger};
use crate::store::{PersistenceStore, SaveReport};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

pub const SNAPSHOT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub members_count: usize,
    pub games_count: usize,
    #[serde(flatten)]
    pub document: LedgerDocument,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotInfo {
    pub version: Option<String>,
    pub created_at: Option<String>,
    pub members_count: usize,
    pub games_count: usize,
    pub has_drinks_prices: bool,
    pub has_cash_balance: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub info: SnapshotInfo,
}

pub fn export_snapshot(doc: &LedgerDocument) -> Snapshot {
    Snapshot {
        version: SNAPSHOT_VERSION.to_string(),
        created_at: Utc::now(),
        members_count: doc.members.len(),
        games_count: doc.games.len(),
        document: doc.clone(),
    }
}

/// Structural check of an untrusted snapshot. Never mutates anything.
pub fn validate_snapshot(candidate: &Value) -> ValidationReport {
    let mut errors = Vec::new();
    let mut info = SnapshotInfo::default();

    let Some(root) = candidate.as_object() else {
        return ValidationReport {
            is_valid: false,
            errors: vec!["snapshot must be a JSON object".to_string()],
            info,
        };
    };

    info.version = root.get("version").and_then(Value::as_str).map(str::to_string);
    info.created_at = root
        .get("createdAt")
        .and_then(Value::as_str)
        .map(str::to_string);

    match root.get("members") {
        None => errors.push("missing section: members".to_string()),
        Some(Value::Array(members)) => {
            info.members_count = members.len();
            for (i, m) in members.iter().enumerate() {
                check_member(i, m, &mut errors);
            }
        }
        Some(_) => errors.push("members must be an array".to_string()),
    }

    match root.get("games") {
        None => errors.push("missing section: games".to_string()),
        Some(Value::Array(games)) => {
            info.games_count = games.len();
            for (i, g) in games.iter().enumerate() {
                check_game(i, g, &mut errors);
            }
        }
        Some(_) => errors.push("games must be an array".to_string()),
    }

    match root.get("drinks") {
        None => errors.push("missing section: drinks".to_string()),
        Some(Value::Object(drinks)) => {
            match drinks.get("prices") {
                Some(Value::Object(prices)) => {
                    info.has_drinks_prices = true;
                    for (name, price) in prices {
                        if !price.as_f64().is_some_and(|p| p >= 0.0) {
                            errors.push(format!("drinks.prices.{name} must be a non-negative number"));
                        }
                    }
                }
                _ => errors.push("drinks.prices must be an object".to_string()),
            }
            match drinks.get("debts") {
                Some(Value::Object(debts)) => {
                    for (id, debt) in debts {
                        if id.parse::<u64>().is_err() {
                            errors.push(format!("drinks.debts key {id} is not a member id"));
                        }
                        if !debt.is_number() {
                            errors.push(format!("drinks.debts.{id} must be a number"));
                        }
                    }
                }
                _ => errors.push("drinks.debts must be an object".to_string()),
            }
        }
        Some(_) => errors.push("drinks must be an object".to_string()),
    }

    match root.get("cash") {
        None => errors.push("missing section: cash".to_string()),
        Some(Value::Object(cash)) => {
            if cash.get("balance").is_some_and(Value::is_number) {
                info.has_cash_balance = true;
            } else {
                errors.push("cash.balance must be a number".to_string());
            }
            if !cash.get("history").is_some_and(Value::is_array) {
                errors.push("cash.history must be an array".to_string());
            }
        }
        Some(_) => errors.push("cash must be an object".to_string()),
    }

    // Catch anything the structural pass let through (bad dates, enum values).
    if errors.is_empty() {
        if let Err(e) = serde_json::from_value::<LedgerDocument>(candidate.clone()) {
            errors.push(format!("snapshot does not match the ledger format: {e}"));
        }
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        info,
    }
}

fn check_member(i: usize, m: &Value, errors: &mut Vec<String>) {
    if !m.get("id").is_some_and(Value::is_u64) {
        errors.push(format!("members[{i}].id must be a non-negative integer"));
    }
    if !m.get("name").is_some_and(Value::is_string) {
        errors.push(format!("members[{i}].name must be a string"));
    }
    if !matches!(
        m.get("status").and_then(Value::as_str),
        Some("active" | "inactive")
    ) {
        errors.push(format!("members[{i}].status must be active or inactive"));
    }
}

fn check_game(i: usize, g: &Value, errors: &mut Vec<String>) {
    if !g.get("id").is_some_and(Value::is_u64) {
        errors.push(format!("games[{i}].id must be a non-negative integer"));
    }
    for field in ["date", "time", "opponent", "location"] {
        if !g.get(field).is_some_and(Value::is_string) {
            errors.push(format!("games[{i}].{field} must be a string"));
        }
    }
}

/// Replace the live ledger with a validated snapshot, then save immediately.
///
/// The local target backs up the file being replaced, so a bad import can be
/// rolled back by hand from the backup directory.
pub async fn import_snapshot(
    candidate: &Value,
    ledger: &SharedLedger,
    store: &PersistenceStore,
) -> Result<(ValidationReport, SaveReport)> {
    let report = validate_snapshot(candidate);
    if !report.is_valid {
        warn!(errors = ?report.errors, "rejected snapshot import");
        return Err(LedgerError::validation(format!(
            "invalid snapshot: {}",
            report.errors.join(", ")
        )));
    }

    let document: LedgerDocument = serde_json::from_value(candidate.clone())
        .map_err(|e| LedgerError::validation(format!("invalid snapshot: {e}")))?;

    let snapshot = {
        let mut live = ledger.write();
        *live = document;
        live.clone()
    };
    info!(
        members = snapshot.members.len(),
        games = snapshot.games.len(),
        "📥 snapshot imported"
    );

    let saved = store.save(&snapshot).await;
    Ok((report, saved))
}
