//! Ledger error taxonomy
//! Mission: Separate caller mistakes from missing records and storage outages

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    /// Missing or malformed required input.
    #[error("{0}")]
    Validation(String),

    /// Referenced member/game id does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    /// Every storage target refused the document.
    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(String),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        LedgerError::Validation(msg.into())
    }

    pub fn member_not_found(id: u64) -> Self {
        LedgerError::NotFound {
            entity: "member",
            id,
        }
    }

    pub fn game_not_found(id: u64) -> Self {
        LedgerError::NotFound { entity: "game", id }
    }
}
