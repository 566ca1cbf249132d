//! Phases of applying a movement inside one transaction.

use shopdesk_core::{DomainError, DomainResult};

/// Progress of a movement through its transaction.
///
/// `Committed` and `RolledBack` are terminal. `RolledBack` is reachable from
/// every non-terminal phase; other transitions only move one step forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplyPhase {
    Requested,
    StockChecked,
    MovementRecorded,
    LevelsUpdated,
    Committed,
    RolledBack,
}

impl ApplyPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ApplyPhase::Committed | ApplyPhase::RolledBack)
    }

    /// The phase reached when the current step succeeds.
    pub fn next(&self) -> Option<ApplyPhase> {
        match self {
            ApplyPhase::Requested => Some(ApplyPhase::StockChecked),
            ApplyPhase::StockChecked => Some(ApplyPhase::MovementRecorded),
            ApplyPhase::MovementRecorded => Some(ApplyPhase::LevelsUpdated),
            ApplyPhase::LevelsUpdated => Some(ApplyPhase::Committed),
            ApplyPhase::Committed | ApplyPhase::RolledBack => None,
        }
    }

    pub fn can_transition_to(&self, to: ApplyPhase) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == ApplyPhase::RolledBack || self.next() == Some(to)
    }

    /// Move to `to`, refusing skipped or backward steps.
    pub fn advance(&mut self, to: ApplyPhase) -> DomainResult<()> {
        if !self.can_transition_to(to) {
            return Err(DomainError::invariant(format!(
                "illegal movement phase transition {} -> {}",
                self.as_str(),
                to.as_str()
            )));
        }
        *self = to;
        Ok(())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplyPhase::Requested => "REQUESTED",
            ApplyPhase::StockChecked => "STOCK_CHECKED",
            ApplyPhase::MovementRecorded => "MOVEMENT_RECORDED",
            ApplyPhase::LevelsUpdated => "LEVELS_UPDATED",
            ApplyPhase::Committed => "COMMITTED",
            ApplyPhase::RolledBack => "ROLLED_BACK",
        }
    }
}

impl core::fmt::Display for ApplyPhase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
