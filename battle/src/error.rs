//! Battle-scoped errors

use std::fmt;

use thiserror::Error;

/// Which invariant a [`BattleError::ProtocolInconsistency`] tripped over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Inconsistency {
    /// Identifier string that is not `<side><slot?>: <name>`
    BadIdentifier,
    /// Ending a side or field condition that is not active
    ConditionNotActive,
    /// Ending a condition whose name we cannot map
    UnknownCondition,
    /// A confirmed species contradicted outside a forme change
    SpeciesMismatch,
    /// Turn counter moving backwards
    TurnRegression,
    /// Request for a different player than the one we are playing
    PerspectiveMismatch,
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Inconsistency::BadIdentifier => "bad identifier",
            Inconsistency::ConditionNotActive => "condition not active",
            Inconsistency::UnknownCondition => "unknown condition",
            Inconsistency::SpeciesMismatch => "species mismatch",
            Inconsistency::TurnRegression => "turn regression",
            Inconsistency::PerspectiveMismatch => "perspective mismatch",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    /// A message implies a transition that violates a state invariant
    #[error("protocol inconsistency ({kind}): {detail}")]
    ProtocolInconsistency { kind: Inconsistency, detail: String },

    /// Team or active-slot overflow
    #[error("capacity violation: {detail}")]
    CapacityViolation { detail: String },

    /// Order not in the last derived legal set; the caller may retry
    #[error("illegal order {order:?}: {reason}")]
    IllegalOrder { order: String, reason: String },

    #[error("battle is finished")]
    BattleFinished,

    #[error("battle stopped after an earlier error: {0}")]
    BattleErrored(Box<BattleError>),
}

impl BattleError {
    pub(crate) fn inconsistent(kind: Inconsistency, detail: impl Into<String>) -> Self {
        BattleError::ProtocolInconsistency {
            kind,
            detail: detail.into(),
        }
    }

    pub(crate) fn capacity(detail: impl Into<String>) -> Self {
        BattleError::CapacityViolation {
            detail: detail.into(),
        }
    }

    pub(crate) fn illegal(order: impl fmt::Display, reason: impl Into<String>) -> Self {
        BattleError::IllegalOrder {
            order: order.to_string(),
            reason: reason.into(),
        }
    }

    /// Fatal errors end the battle they occurred in; other battles are unaffected
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BattleError::ProtocolInconsistency { .. }
                | BattleError::CapacityViolation { .. }
                | BattleError::BattleErrored(_)
        )
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, BattleError::IllegalOrder { .. })
    }
}

pub type Result<T, E = BattleError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let err = BattleError::inconsistent(Inconsistency::ConditionNotActive, "safeguard on p1");
        assert!(err.is_fatal());
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "protocol inconsistency (condition not active): safeguard on p1"
        );

        let illegal = BattleError::illegal("move 5", "not offered");
        assert!(illegal.is_retryable());
        assert!(!illegal.is_fatal());

        assert!(BattleError::capacity("7th creature").is_fatal());
        assert!(!BattleError::BattleFinished.is_fatal());
    }
}
