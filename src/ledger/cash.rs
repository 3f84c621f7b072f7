use super::models::{next_id, CashEntry, CashEntryKind, LedgerDocument, CASH_HISTORY_LIMIT};
use super::money::ensure_positive;
use crate::error::{LedgerError, Result};
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashReceipt {
    pub entry_id: u64,
    pub new_balance: f64,
}

impl LedgerDocument {
    /// Apply a manual income/expense to the register.
    pub fn record_cash_transaction(
        &mut self,
        amount: f64,
        description: &str,
        kind: CashEntryKind,
    ) -> Result<CashReceipt> {
        let amount = ensure_positive(amount)?;
        let description = description.trim();
        if description.is_empty() {
            return Err(LedgerError::validation("description is required"));
        }

        Ok(self.push_cash_entry(amount, description.to_string(), kind))
    }

    /// Empties the history. The balance stays authoritative and is not touched.
    pub fn clear_cash_history(&mut self) -> usize {
        let cleared = self.cash.history.len();
        self.cash.history.clear();
        cleared
    }

    /// Adjust the balance, prepend the entry and enforce the history cap.
    /// `amount` must already be validated.
    pub(crate) fn push_cash_entry(
        &mut self,
        amount: f64,
        description: String,
        kind: CashEntryKind,
    ) -> CashReceipt {
        let entry = CashEntry {
            id: next_id(self.cash.history.iter().map(|e| e.id)),
            date: Utc::now(),
            amount,
            description,
            kind,
        };
        let entry_id = entry.id;

        self.cash.balance += kind.signed(amount);
        self.cash.history.insert(0, entry);
        self.cash.history.truncate(CASH_HISTORY_LIMIT);

        CashReceipt {
            entry_id,
            new_balance: self.cash.balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_income_and_expense_adjust_balance() {
        let mut doc = LedgerDocument::seeded();
        doc.record_cash_transaction(50.0, "Mitgliedsbeiträge", CashEntryKind::Income)
            .unwrap();
        let receipt = doc
            .record_cash_transaction(12.5, "Dartpfeile", CashEntryKind::Expense)
            .unwrap();

        assert!((receipt.new_balance - 37.5).abs() < 1e-9);
        assert_eq!(doc.cash.history.len(), 2);
        assert_eq!(doc.cash.history[0].kind, CashEntryKind::Expense);
        assert_eq!(doc.cash.history[0].id, 2);
        assert_eq!(doc.cash.history[1].id, 1);
    }

    #[test]
    fn test_transaction_validation() {
        let mut doc = LedgerDocument::seeded();
        assert!(doc
            .record_cash_transaction(-3.0, "x", CashEntryKind::Income)
            .is_err());
        assert!(doc
            .record_cash_transaction(3.0, "  ", CashEntryKind::Income)
            .is_err());
        assert!(doc.cash.history.is_empty());
        assert_eq!(doc.cash.balance, 0.0);
    }

    #[test]
    fn test_history_capped_and_balance_kept() {
        let mut doc = LedgerDocument::seeded();
        for i in 0..120 {
            doc.record_cash_transaction(1.0, &format!("entry {i}"), CashEntryKind::Income)
                .unwrap();
            assert!(doc.cash.history.len() <= CASH_HISTORY_LIMIT);
        }

        assert_eq!(doc.cash.history.len(), CASH_HISTORY_LIMIT);
        assert_eq!(doc.cash.history[0].description, "entry 119");
        assert!((doc.cash.balance - 120.0).abs() < 1e-9);
        // balance is not the sum of retained history once truncated
        let retained: f64 = doc.cash.history.iter().map(|e| e.amount).sum();
        assert!((retained - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_clear_history_keeps_balance() {
        let mut doc = LedgerDocument::seeded();
        doc.record_cash_transaction(9.0, "Spende", CashEntryKind::Income)
            .unwrap();

        assert_eq!(doc.clear_cash_history(), 1);
        assert!(doc.cash.history.is_empty());
        assert_eq!(doc.cash.balance, 9.0);

        // ids restart from the retained history
        let receipt = doc
            .record_cash_transaction(1.0, "again", CashEntryKind::Income)
            .unwrap();
        assert_eq!(receipt.entry_id, 1);
    }
}
