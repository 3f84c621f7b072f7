use super::cash::CashReceipt;
use super::models::{CashEntryKind, LedgerDocument, Member, MemberStatus};
use super::money::ensure_positive;
use crate::error::{LedgerError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    pub total_cost: f64,
    pub new_debts: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub new_debts: f64,
    pub new_balance: f64,
    pub entry_id: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberWithDebt {
    #[serde(flatten)]
    pub member: Member,
    pub debts: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DrinksOverview {
    pub prices: BTreeMap<String, f64>,
    pub members: Vec<MemberWithDebt>,
}

impl LedgerDocument {
    /// Replace the whole price table. Callers always send the full map.
    pub fn set_drink_prices(&mut self, prices: BTreeMap<String, f64>) -> Result<()> {
        let mut cleaned = BTreeMap::new();
        for (name, price) in prices {
            let name = name.trim();
            if name.is_empty() {
                return Err(LedgerError::validation("drink name must not be empty"));
            }
            if !(price.is_finite() && price >= 0.0) {
                return Err(LedgerError::validation(format!(
                    "invalid price for {name}: {price}"
                )));
            }
            cleaned.insert(name.to_string(), price);
        }

        self.drinks.prices = cleaned;
        Ok(())
    }

    /// Add `Σ price × count` to the member's debt.
    ///
    /// Drinks without a known price and non-positive counts are skipped.
    pub fn record_drink_purchase(
        &mut self,
        member_id: u64,
        counts: &BTreeMap<String, i64>,
    ) -> Result<PurchaseReceipt> {
        if self.member(member_id).is_none() {
            return Err(LedgerError::member_not_found(member_id));
        }

        let total_cost: f64 = counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .filter_map(|(drink, count)| {
                self.drinks
                    .prices
                    .get(drink)
                    .map(|price| price * *count as f64)
            })
            .sum();

        let debt = self.drinks.debts.entry(member_id).or_insert(0.0);
        *debt += total_cost;
        let new_debts = *debt;

        debug!(member_id, total_cost, new_debts, "drinks recorded");
        Ok(PurchaseReceipt {
            total_cost,
            new_debts,
        })
    }

    /// Settle part of a member's debt into the cash register.
    ///
    /// The debt decrement, the balance increment and the income entry are
    /// applied together; the debt may go negative (credit).
    pub fn pay_debt(&mut self, member_id: u64, amount: f64) -> Result<PaymentReceipt> {
        let amount = ensure_positive(amount)?;
        let name = self
            .member(member_id)
            .map(|m| m.name.clone())
            .ok_or(LedgerError::member_not_found(member_id))?;

        let description = format!("{name} paid {amount:.2} € towards drink debts");
        let CashReceipt {
            entry_id,
            new_balance,
        } = self.push_cash_entry(amount, description, CashEntryKind::Income);

        let debt = self.drinks.debts.entry(member_id).or_insert(0.0);
        *debt -= amount;

        Ok(PaymentReceipt {
            new_debts: *debt,
            new_balance,
            entry_id,
        })
    }

    pub fn debt_of(&self, member_id: u64) -> f64 {
        self.drinks.debts.get(&member_id).copied().unwrap_or(0.0)
    }

    /// Prices plus every active member with their current debt.
    pub fn drinks_overview(&self) -> DrinksOverview {
        let members = self
            .members
            .iter()
            .filter(|m| m.status == MemberStatus::Active)
            .map(|m| MemberWithDebt {
                member: m.clone(),
                debts: self.debt_of(m.id),
            })
            .collect();

        DrinksOverview {
            prices: self.drinks.prices.clone(),
            members,
        }
    }
}
