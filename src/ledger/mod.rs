//! Ledger Domain
//! Mission: Apply validated mutations to the club document and keep derived values in step
//!
//! All operations are `impl LedgerDocument` blocks split by entity. The one
//! cross-entity rule lives in [`LedgerDocument::pay_debt`]: a payment changes
//! the member's debt, the cash balance and the cash history in one call.

pub mod cash;
pub mod drinks;
pub mod games;
pub mod members;
pub mod models;
pub mod money;

pub use cash::CashReceipt;
pub use drinks::{DrinksOverview, MemberWithDebt, PaymentReceipt, PurchaseReceipt};
pub use games::GameInput;
pub use members::MemberStats;
pub use models::{
    Cash, CashEntry, CashEntryKind, Drinks, Game, LedgerDocument, Member, MemberStatus,
    CASH_HISTORY_LIMIT,
};

use parking_lot::RwLock;
use std::sync::Arc;

/// Live document shared by handlers, the autosave task and backup import.
pub type SharedLedger = Arc<RwLock<LedgerDocument>>;

pub fn shared(doc: LedgerDocument) -> SharedLedger {
    Arc::new(RwLock::new(doc))
}
