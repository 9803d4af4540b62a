use std::fmt::Write;

use crate::tracking::TrackedBattle;
use crate::types::SideState;

/// Where a battle is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Before the first turn or switch; only setup lines change state
    Preview,
    InProgress,
    Finished,
    /// Stopped by a fatal error
    Errored,
}

/// Immutable copy of the tracked state at one point in time
#[derive(Debug, Clone)]
pub struct BattleSnapshot {
    pub phase: Phase,
    pub battle: TrackedBattle,
}

impl BattleSnapshot {
    /// One-line status, e.g. `Turn 3 | [●●][ 60/120hp] charizard - pikachu [ 20%hp][●]`
    pub fn summary(&self) -> String {
        let ours = &self.battle.team;
        let theirs = &self.battle.opponent_team;
        let mut line = format!("Turn {} | [{}]", self.battle.turn, dots(ours));

        match ours.active_creature(0) {
            Some(active) => {
                let max = active.hp_max.unwrap_or(100);
                let _ = write!(line, "[{:>3}/{max}hp] {}", active.hp_current, active.species_id());
            }
            None => line.push_str("[  -hp] -"),
        }

        line.push_str(" - ");
        match theirs.active_creature(0) {
            Some(active) => {
                let percent = (active.hp_fraction() * 100.0).round() as u32;
                let _ = write!(line, "{} [{percent:>3}%hp]", active.species_id());
            }
            None => line.push_str("- [  -%hp]"),
        }
        let _ = write!(line, "[{}]", dots(theirs));
        line
    }
}

fn dots(side: &SideState) -> String {
    "●".repeat(side.remaining())
}

#[cfg(test)]
mod tests {
    use pokestate_protocol::{Player, parse_server_message};

    use super::*;

    #[test]
    fn test_summary_line() {
        let mut battle = TrackedBattle::new();
        battle.set_perspective(Player::P1).unwrap();
        for line in [
            "|teamsize|p1|2",
            "|teamsize|p2|1",
            "|switch|p1a: Charizard|Charizard, M|60/120",
            "|switch|p2a: Pikachu|Pikachu, F|20/100",
            "|turn|3",
        ] {
            battle.update(&parse_server_message(line).unwrap()).unwrap();
        }

        let snapshot = BattleSnapshot {
            phase: Phase::InProgress,
            battle,
        };
        assert_eq!(
            snapshot.summary(),
            "Turn 3 | [●●][ 60/120hp] charizard - pikachu [ 20%hp][●]"
        );
    }
}
