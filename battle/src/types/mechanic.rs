//! One-shot battle mechanics

use std::collections::BTreeSet;

/// Mechanics a side may use once per battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mechanic {
    Mega,
    ZMove,
    Dynamax,
    Terastallize,
    UltraBurst,
}

impl Mechanic {
    pub const ALL: [Mechanic; 5] = [
        Mechanic::Mega,
        Mechanic::ZMove,
        Mechanic::Dynamax,
        Mechanic::Terastallize,
        Mechanic::UltraBurst,
    ];

    /// Suffix appended to a `move` choice
    pub fn choice_suffix(&self) -> &'static str {
        match self {
            Mechanic::Mega => "mega",
            Mechanic::ZMove => "zmove",
            Mechanic::Dynamax => "dynamax",
            Mechanic::Terastallize => "terastallize",
            Mechanic::UltraBurst => "ultra",
        }
    }
}

impl std::fmt::Display for Mechanic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.choice_suffix())
    }
}

/// Battle-scoped record of which mechanics a side has spent. Never shrinks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MechanicUsage {
    used: BTreeSet<Mechanic>,
}

impl MechanicUsage {
    /// Returns true the first time a mechanic is marked
    pub fn mark_used(&mut self, mechanic: Mechanic) -> bool {
        self.used.insert(mechanic)
    }

    pub fn is_used(&self, mechanic: Mechanic) -> bool {
        self.used.contains(&mechanic)
    }

    pub fn used(&self) -> impl Iterator<Item = Mechanic> + '_ {
        self.used.iter().copied()
    }
}

/// Per-turn allocation of side-wide mechanics across the active slots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MechanicAllocation {
    allocated: BTreeSet<Mechanic>,
}

impl MechanicAllocation {
    /// Claim a mechanic for one slot; false if another slot already holds it
    pub fn allocate(&mut self, mechanic: Mechanic) -> bool {
        self.allocated.insert(mechanic)
    }

    pub fn is_allocated(&self, mechanic: Mechanic) -> bool {
        self.allocated.contains(&mechanic)
    }

    pub fn clear(&mut self) {
        self.allocated.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_is_monotone() {
        let mut usage = MechanicUsage::default();
        assert!(usage.mark_used(Mechanic::Dynamax));
        assert!(!usage.mark_used(Mechanic::Dynamax));
        assert!(usage.is_used(Mechanic::Dynamax));
        assert!(!usage.is_used(Mechanic::Terastallize));
    }

    #[test]
    fn test_allocation() {
        let mut allocation = MechanicAllocation::default();
        assert!(allocation.allocate(Mechanic::Terastallize));
        assert!(!allocation.allocate(Mechanic::Terastallize));
        assert!(allocation.allocate(Mechanic::Mega));

        allocation.clear();
        assert!(!allocation.is_allocated(Mechanic::Terastallize));
    }

    #[test]
    fn test_choice_suffix() {
        assert_eq!(Mechanic::UltraBurst.choice_suffix(), "ultra");
        assert_eq!(Mechanic::ZMove.to_string(), "zmove");
    }
}
