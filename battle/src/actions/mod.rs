//! Legal orders derived from a request and the tracked state
//!
//! [`SingleActions`] and [`DoubleActions`] are recomputed from scratch for every
//! decision; they never remember what was chosen before.

mod doubles;
mod singles;

use std::fmt::{self, Display};

use pokestate_protocol::{ActiveSlot, BattleRequest};

use crate::types::{Mechanic, MechanicUsage};

pub use doubles::DoubleActions;
pub use singles::SingleActions;

/// One order for one active slot, or for the whole side
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Order {
    Move {
        /// One-based move slot
        index: usize,
        /// Doubles target position: foes are 1 and 2, our side is -1 and -2
        target: Option<i8>,
        mechanic: Option<Mechanic>,
    },
    Switch {
        /// One-based position in the request's team list
        position: usize,
    },
    Pass,
    /// Let the server pick
    Default,
    Forfeit,
    /// Team preview lead order, one-based positions
    Team(Vec<usize>),
}

impl Order {
    pub fn move_to(index: usize) -> Self {
        Order::Move {
            index,
            target: None,
            mechanic: None,
        }
    }

    pub fn mechanic(&self) -> Option<Mechanic> {
        match self {
            Order::Move { mechanic, .. } => *mechanic,
            _ => None,
        }
    }

    /// Orders that answer for the whole side rather than one slot
    pub fn is_side_wide(&self) -> bool {
        matches!(self, Order::Default | Order::Forfeit | Order::Team(_))
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::Move {
                index,
                target,
                mechanic,
            } => {
                write!(f, "move {index}")?;
                if let Some(target) = target {
                    write!(f, " {target}")?;
                }
                if let Some(mechanic) = mechanic {
                    write!(f, " {mechanic}")?;
                }
                Ok(())
            }
            Order::Switch { position } => write!(f, "switch {position}"),
            Order::Pass => f.write_str("pass"),
            Order::Default => f.write_str("default"),
            Order::Forfeit => f.write_str("forfeit"),
            Order::Team(positions) => {
                f.write_str("team ")?;
                for position in positions {
                    write!(f, "{position}")?;
                }
                Ok(())
            }
        }
    }
}

/// Orders for both active slots, rendered `first, second`.
///
/// A side-wide first order (team, default, forfeit) renders alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DoubleOrder(pub Order, pub Order);

impl DoubleOrder {
    pub fn side_wide(order: Order) -> Self {
        DoubleOrder(order, Order::Pass)
    }
}

impl Display for DoubleOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_side_wide() {
            return self.0.fmt(f);
        }
        write!(f, "{}, {}", self.0, self.1)
    }
}

/// Which team orders a preview request accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamRule {
    pub size: usize,
    /// Creatures brought to the battle, at most `size`
    pub chosen: usize,
}

impl TeamRule {
    pub fn from_request(request: &BattleRequest) -> Option<Self> {
        let size = request.pokemon().len();
        if size == 0 {
            return None;
        }
        let chosen = request.max_chosen_team_size.unwrap_or(size).clamp(1, size);
        Some(Self { size, chosen })
    }

    /// Identity order, offered as the representative team choice
    pub fn identity(&self) -> Order {
        Order::Team((1..=self.size).collect())
    }

    /// Distinct positions in `1..=size`, either the full team or exactly `chosen`
    pub fn accepts(&self, positions: &[usize]) -> bool {
        if positions.len() != self.size && positions.len() != self.chosen {
            return false;
        }
        let mut seen = vec![false; self.size];
        positions.iter().all(|&p| {
            (1..=self.size).contains(&p) && !std::mem::replace(&mut seen[p - 1], true)
        })
    }
}

/// Mechanics the request offers this slot that the side has not spent
pub(crate) fn offered_mechanics(slot: &ActiveSlot, usage: &MechanicUsage) -> Vec<Mechanic> {
    let offered = [
        (Mechanic::Mega, slot.can_mega_evo),
        (Mechanic::UltraBurst, slot.can_ultra_burst),
        (Mechanic::ZMove, slot.can_z_move.is_some()),
        (Mechanic::Dynamax, slot.can_dynamax),
        (Mechanic::Terastallize, slot.can_terastallize.is_some()),
    ];
    offered
        .into_iter()
        .filter(|&(mechanic, on)| on && !usage.is_used(mechanic))
        .map(|(mechanic, _)| mechanic)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_rendering() {
        let order = Order::Move {
            index: 2,
            target: None,
            mechanic: Some(Mechanic::Terastallize),
        };
        assert_eq!(order.to_string(), "move 2 terastallize");

        let order = Order::Move {
            index: 1,
            target: Some(-2),
            mechanic: None,
        };
        assert_eq!(order.to_string(), "move 1 -2");
        assert_eq!(Order::Switch { position: 4 }.to_string(), "switch 4");
        assert_eq!(Order::Team(vec![2, 1, 3, 4, 5, 6]).to_string(), "team 213456");

        let pair = DoubleOrder(Order::move_to(1), Order::Pass);
        assert_eq!(pair.to_string(), "move 1, pass");
        assert_eq!(DoubleOrder::side_wide(Order::Default).to_string(), "default");
    }

    #[test]
    fn test_team_rule() {
        let rule = TeamRule { size: 6, chosen: 6 };
        assert!(rule.accepts(&[2, 1, 3, 4, 5, 6]));
        assert!(!rule.accepts(&[1, 1, 3, 4, 5, 6]));
        assert!(!rule.accepts(&[1, 2, 3]));
        assert!(!rule.accepts(&[0, 1, 2, 3, 4, 5]));

        let vgc = TeamRule { size: 6, chosen: 4 };
        assert!(vgc.accepts(&[6, 5, 1, 2]));
        assert!(vgc.accepts(&[1, 2, 3, 4, 5, 6]));
        assert!(!vgc.accepts(&[1, 2]));
    }
}
