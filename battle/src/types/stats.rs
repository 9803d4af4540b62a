//! Stat stages

use pokestate_protocol::Stat;

pub const MAX_STAGE: i8 = 6;

fn index(stat: Stat) -> usize {
    match stat {
        Stat::Atk => 0,
        Stat::Def => 1,
        Stat::Spa => 2,
        Stat::Spd => 3,
        Stat::Spe => 4,
        Stat::Accuracy => 5,
        Stat::Evasion => 6,
    }
}

/// Boost stages for the seven boostable stats, each within -6..=+6
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatStages([i8; 7]);

impl StatStages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stat: Stat) -> i8 {
        self.0[index(stat)]
    }

    pub fn set(&mut self, stat: Stat, value: i8) {
        self.0[index(stat)] = value.clamp(-MAX_STAGE, MAX_STAGE);
    }

    /// Apply a signed change, returns the change that actually stuck
    pub fn boost(&mut self, stat: Stat, amount: i8) -> i8 {
        let before = self.get(stat);
        self.set(stat, before.saturating_add(amount));
        self.get(stat) - before
    }

    pub fn unboost(&mut self, stat: Stat, amount: i8) -> i8 {
        self.boost(stat, amount.saturating_neg())
    }

    pub fn clear(&mut self) {
        self.0 = [0; 7];
    }

    pub fn clear_positive(&mut self) {
        self.0.iter_mut().filter(|s| **s > 0).for_each(|s| *s = 0);
    }

    pub fn clear_negative(&mut self) {
        self.0.iter_mut().filter(|s| **s < 0).for_each(|s| *s = 0);
    }

    /// Topsy-Turvy
    pub fn invert(&mut self) {
        self.0.iter_mut().for_each(|s| *s = -*s);
    }

    /// Exchange the listed stats with another set of stages
    pub fn swap(&mut self, other: &mut StatStages, stats: &[Stat]) {
        for &stat in stats {
            let i = index(stat);
            std::mem::swap(&mut self.0[i], &mut other.0[i]);
        }
    }

    pub fn is_clear(&self) -> bool {
        self.0.iter().all(|s| *s == 0)
    }

    /// Non-zero stages in display order
    pub fn nonzero(&self) -> impl Iterator<Item = (Stat, i8)> + '_ {
        Stat::ALL
            .iter()
            .map(|&stat| (stat, self.get(stat)))
            .filter(|(_, stage)| *stage != 0)
    }
}
