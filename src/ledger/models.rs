//! Ledger Models
//! Mission: One serializable document holding every piece of club state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Maximum number of cash entries retained (newest first).
pub const CASH_HISTORY_LIMIT: usize = 50;

/// Root aggregate. Serialized as-is to every storage target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerDocument {
    pub members: Vec<Member>,
    pub games: Vec<Game>,
    pub drinks: Drinks,
    pub cash: Cash,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: u64,
    pub name: String,
    pub status: MemberStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "inactive")]
    Inactive,
}

impl MemberStatus {
    pub fn as_str(&self) -> &str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: u64,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub time: String,
    pub opponent: String,
    /// `home`, `away` or a free-text venue.
    pub location: String,
    #[serde(default)]
    pub participants: BTreeSet<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Drinks {
    /// Unit price per drink name.
    pub prices: BTreeMap<String, f64>,
    /// Signed balance per member id; negative means credit.
    pub debts: BTreeMap<u64, f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cash {
    /// Authoritative balance. Not derivable from `history` once truncated.
    pub balance: f64,
    /// Newest first, capped at [`CASH_HISTORY_LIMIT`].
    pub history: Vec<CashEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashEntry {
    pub id: u64,
    pub date: DateTime<Utc>,
    pub amount: f64,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: CashEntryKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CashEntryKind {
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "expense")]
    Expense,
}

impl CashEntryKind {
    pub fn as_str(&self) -> &str {
        match self {
            CashEntryKind::Income => "income",
            CashEntryKind::Expense => "expense",
        }
    }

    /// Sign applied to the balance.
    pub fn signed(&self, amount: f64) -> f64 {
        match self {
            CashEntryKind::Income => amount,
            CashEntryKind::Expense => -amount,
        }
    }
}

impl Default for LedgerDocument {
    fn default() -> Self {
        Self::seeded()
    }
}

impl LedgerDocument {
    /// Document used on first start, before anything was ever persisted.
    pub fn seeded() -> Self {
        let prices = [
            ("bier", 1.50),
            ("mischung", 2.50),
            ("kurze", 0.50),
            ("softdrinks", 1.00),
            ("redbull", 2.00),
        ]
        .into_iter()
        .map(|(name, price)| (name.to_string(), price))
        .collect();

        Self {
            members: vec![
                Member {
                    id: 1,
                    name: "Max Mustermann".to_string(),
                    status: MemberStatus::Active,
                },
                Member {
                    id: 2,
                    name: "Anna Schmidt".to_string(),
                    status: MemberStatus::Active,
                },
            ],
            games: Vec::new(),
            drinks: Drinks {
                prices,
                debts: BTreeMap::new(),
            },
            cash: Cash::default(),
        }
    }

    /// Empty document with no members and no prices.
    pub fn empty() -> Self {
        Self {
            members: Vec::new(),
            games: Vec::new(),
            drinks: Drinks::default(),
            cash: Cash::default(),
        }
    }

    pub fn member(&self, id: u64) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }
}

/// `max(existing ids) + 1`, or 1 for an empty collection.
pub(crate) fn next_id(ids: impl Iterator<Item = u64>) -> u64 {
    ids.max().unwrap_or(0) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_document_shape() {
        let doc = LedgerDocument::seeded();
        assert_eq!(doc.members.len(), 2);
        assert!(doc.games.is_empty());
        assert_eq!(doc.drinks.prices.get("bier"), Some(&1.50));
        assert_eq!(doc.drinks.prices.len(), 5);
        assert!(doc.drinks.debts.is_empty());
        assert_eq!(doc.cash.balance, 0.0);
        assert!(doc.cash.history.is_empty());
    }

    #[test]
    fn test_next_id() {
        assert_eq!(next_id(std::iter::empty()), 1);
        assert_eq!(next_id([3, 1, 7].into_iter()), 8);
    }

    #[test]
    fn test_document_json_layout() {
        let mut doc = LedgerDocument::seeded();
        doc.drinks.debts.insert(2, 4.5);
        let json = serde_json::to_value(&doc).unwrap();

        assert!(json["members"].is_array());
        assert_eq!(json["members"][0]["status"], "active");
        assert_eq!(json["drinks"]["debts"]["2"], 4.5);
        assert_eq!(json["cash"]["balance"], 0.0);

        let back: LedgerDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_game_and_cash_entry_field_names() {
        let raw = r#"{
            "id": 4,
            "date": "2025-03-01",
            "time": "19:30",
            "opponent": "DC Nord",
            "location": "home",
            "participants": [2, 1],
            "createdAt": "2025-02-20T10:00:00Z"
        }"#;
        let game: Game = serde_json::from_str(raw).unwrap();
        assert_eq!(game.participants.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert!(game.result.is_none());

        let entry: CashEntry = serde_json::from_str(
            r#"{"id":1,"date":"2025-02-20T10:00:00Z","amount":3.0,"description":"x","type":"expense"}"#,
        )
        .unwrap();
        assert_eq!(entry.kind, CashEntryKind::Expense);
        assert_eq!(entry.kind.signed(entry.amount), -3.0);
    }
}
