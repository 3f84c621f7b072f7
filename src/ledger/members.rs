use super::models::{next_id, LedgerDocument, Member, MemberStatus};
use crate::error::{LedgerError, Result};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemberStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

impl LedgerDocument {
    /// Append a new active member. The name is trimmed and must not be empty.
    pub fn add_member(&mut self, name: &str) -> Result<Member> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::validation("name is required"));
        }

        let member = Member {
            id: next_id(self.members.iter().map(|m| m.id)),
            name: name.to_string(),
            status: MemberStatus::Active,
        };
        debug!(member_id = member.id, name = %member.name, "member added");

        self.members.push(member.clone());
        Ok(member)
    }

    pub fn set_member_status(&mut self, id: u64, status: MemberStatus) -> Result<()> {
        let member = self
            .members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(LedgerError::member_not_found(id))?;

        member.status = status;
        Ok(())
    }

    /// Remove a member and prune their debt entry. Game participation is left untouched.
    pub fn delete_member(&mut self, id: u64) -> Result<Member> {
        let idx = self
            .members
            .iter()
            .position(|m| m.id == id)
            .ok_or(LedgerError::member_not_found(id))?;

        let removed = self.members.remove(idx);
        if let Some(debt) = self.drinks.debts.remove(&id) {
            debug!(member_id = id, debt, "dropped debt of deleted member");
        }
        Ok(removed)
    }

    pub fn member_stats(&self) -> MemberStats {
        let active = self
            .members
            .iter()
            .filter(|m| m.status == MemberStatus::Active)
            .count();

        MemberStats {
            total: self.members.len(),
            active,
            inactive: self.members.len() - active,
        }
    }
}
