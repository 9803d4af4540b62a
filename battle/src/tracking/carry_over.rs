//! Rules for stat stages surviving a switch

use std::fmt::Debug;

use crate::types::Creature;

/// How the incoming creature entered the field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntranceCause {
    /// A chosen switch, including the one a pivoting move triggers
    Switch,
    /// Forced in by Roar, Whirlwind, Dragon Tail, ...
    Drag,
}

/// Decides whether the outgoing creature's stat stages pass to its replacement
pub trait BoostCarryOver: Send + Sync + Debug {
    fn carries_boosts(&self, outgoing: &Creature, cause: EntranceCause) -> bool;
}

/// Boosts pass on only when the outgoing creature's last move was Baton Pass
#[derive(Debug, Clone, Copy, Default)]
pub struct BatonPass;

impl BoostCarryOver for BatonPass {
    fn carries_boosts(&self, outgoing: &Creature, cause: EntranceCause) -> bool {
        cause == EntranceCause::Switch && outgoing.last_move.as_deref() == Some("batonpass")
    }
}

/// Every entrance starts from clear stages
#[derive(Debug, Clone, Copy, Default)]
pub struct ResetAlways;

impl BoostCarryOver for ResetAlways {
    fn carries_boosts(&self, _outgoing: &Creature, _cause: EntranceCause) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baton_pass_rule() {
        let mut outgoing = Creature::new("p1: mew", "Mew");
        assert!(!BatonPass.carries_boosts(&outgoing, EntranceCause::Switch));

        outgoing.last_move = Some("batonpass".to_string());
        assert!(BatonPass.carries_boosts(&outgoing, EntranceCause::Switch));
        assert!(!BatonPass.carries_boosts(&outgoing, EntranceCause::Drag));
        assert!(!ResetAlways.carries_boosts(&outgoing, EntranceCause::Switch));
    }
}
