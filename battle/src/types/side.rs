//! Side (player) state

use std::collections::{BTreeMap, BTreeSet};

use pokestate_protocol::{Details, Player};

use super::conditions::{SideCondition, condition_id};
use super::creature::Creature;
use super::mechanic::MechanicUsage;
use super::stats::StatStages;
use crate::error::{BattleError, Result};

/// Hard cap on distinct creatures per side
pub const MAX_TEAM_SIZE: usize = 6;

/// One player's side of the battle
#[derive(Debug, Clone)]
pub struct SideState {
    /// Unknown for our own side until the perspective is learned
    pub player: Option<Player>,
    pub username: Option<String>,
    /// Size announced by `|teamsize|`
    pub team_size: Option<usize>,

    /// Creatures in order of first appearance
    pub creatures: Vec<Creature>,

    /// Creature index per active slot
    pub active: Vec<Option<usize>>,

    /// Active side conditions and their layer counts
    pub conditions: BTreeMap<SideCondition, u8>,

    /// Conditions with no known kind, by id
    pub unknown_conditions: BTreeSet<String>,

    pub mechanics: MechanicUsage,

    /// Team preview roster, kept apart from the revealed creatures
    pub preview: Vec<Details>,
}

impl SideState {
    pub fn new(slots: usize) -> Self {
        Self {
            player: None,
            username: None,
            team_size: None,
            creatures: Vec::new(),
            active: vec![None; slots.max(1)],
            conditions: BTreeMap::new(),
            unknown_conditions: BTreeSet::new(),
            mechanics: MechanicUsage::default(),
            preview: Vec::new(),
        }
    }

    pub fn set_slot_count(&mut self, slots: usize) {
        self.active.resize(slots.max(1), None);
    }

    pub fn slot_count(&self) -> usize {
        self.active.len()
    }

    pub fn find(&self, key: &str) -> Option<usize> {
        self.creatures.iter().position(|c| c.key == key)
    }

    /// Add a new creature, refusing a seventh
    pub fn insert(&mut self, creature: Creature) -> Result<usize> {
        if self.creatures.len() >= MAX_TEAM_SIZE {
            return Err(BattleError::capacity(format!(
                "cannot add {} to a side that already has {MAX_TEAM_SIZE} creatures",
                creature.key
            )));
        }
        self.creatures.push(creature);
        Ok(self.creatures.len() - 1)
    }

    pub fn active_index(&self, slot: usize) -> Option<usize> {
        self.active.get(slot).copied().flatten()
    }

    pub fn active_creature(&self, slot: usize) -> Option<&Creature> {
        self.active_index(slot).and_then(|idx| self.creatures.get(idx))
    }

    pub fn active_creatures(&self) -> impl Iterator<Item = &Creature> {
        self.active
            .iter()
            .flatten()
            .filter_map(|&idx| self.creatures.get(idx))
    }

    pub fn slot_of(&self, index: usize) -> Option<usize> {
        self.active.iter().position(|a| *a == Some(index))
    }

    fn check_slot(&self, slot: usize) -> Result<()> {
        if slot >= self.active.len() {
            return Err(BattleError::capacity(format!(
                "active slot {slot} out of range for {} slots",
                self.active.len()
            )));
        }
        Ok(())
    }

    /// Put a creature into a slot with full switch effects.
    ///
    /// The outgoing occupant is switched out. With `carried` the incoming creature
    /// takes over those boosts, otherwise it enters with clear stages.
    pub fn switch_in(&mut self, slot: usize, index: usize, carried: Option<StatStages>) -> Result<()> {
        self.check_slot(slot)?;
        if self.active[slot] == Some(index) {
            return Ok(());
        }

        if let Some(outgoing) = self.active[slot].and_then(|o| self.creatures.get_mut(o)) {
            outgoing.on_switch_out();
        }
        if let Some(other) = self.slot_of(index) {
            self.active[other] = None;
        }

        if let Some(incoming) = self.creatures.get_mut(index) {
            incoming.boosts = carried.unwrap_or_default();
            incoming.on_switch_in();
        }
        self.active[slot] = Some(index);
        Ok(())
    }

    /// Re-point a slot without switch effects (Illusion breaking).
    ///
    /// The revealed creature inherits what the disguise had accumulated.
    pub fn replace(&mut self, slot: usize, index: usize) -> Result<()> {
        self.check_slot(slot)?;
        let previous = self.active[slot];
        if previous == Some(index) {
            return Ok(());
        }

        let inherited = previous
            .and_then(|p| self.creatures.get_mut(p))
            .map(|disguise| {
                disguise.active = false;
                (
                    std::mem::take(&mut disguise.boosts),
                    std::mem::take(&mut disguise.volatiles),
                )
            });

        if let Some(revealed) = self.creatures.get_mut(index) {
            if let Some((boosts, volatiles)) = inherited {
                revealed.boosts = boosts;
                revealed.volatiles = volatiles;
            }
            revealed.active = true;
        }
        self.active[slot] = Some(index);
        Ok(())
    }

    /// Exchange the occupants of two slots
    pub fn swap_slots(&mut self, a: usize, b: usize) -> Result<()> {
        self.check_slot(a)?;
        self.check_slot(b)?;
        self.active.swap(a, b);
        Ok(())
    }

    /// Place a creature without switch effects, used when a request tells us
    /// what is on the field before any switch line was seen
    pub fn place(&mut self, slot: usize, index: usize) -> Result<()> {
        self.check_slot(slot)?;
        if let Some(displaced) = self.active[slot].filter(|&p| p != index) {
            if let Some(creature) = self.creatures.get_mut(displaced) {
                creature.active = false;
            }
        }
        if let Some(other) = self.slot_of(index) {
            self.active[other] = None;
        }
        self.active[slot] = Some(index);
        if let Some(creature) = self.creatures.get_mut(index) {
            creature.active = true;
        }
        Ok(())
    }

    /// Empty whichever slot holds the creature
    pub fn vacate(&mut self, index: usize) {
        if let Some(slot) = self.slot_of(index) {
            self.active[slot] = None;
        }
    }

    /// Creatures that could be switched in: alive and not on the field
    pub fn bench(&self) -> impl Iterator<Item = (usize, &Creature)> {
        self.creatures
            .iter()
            .enumerate()
            .filter(|(idx, c)| c.is_alive() && !self.active.contains(&Some(*idx)))
    }

    pub fn alive_count(&self) -> usize {
        self.creatures.iter().filter(|c| c.is_alive()).count()
    }

    /// Creatures we expect to exist, counting unrevealed ones as alive
    pub fn remaining(&self) -> usize {
        let expected = self.team_size.unwrap_or(self.creatures.len());
        let unrevealed = expected.saturating_sub(self.creatures.len());
        self.alive_count() + unrevealed
    }

    pub fn condition_layers(&self, condition: SideCondition) -> u8 {
        self.conditions.get(&condition).copied().unwrap_or(0)
    }

    /// Add a layer up to the condition's maximum, returns the layer count
    pub fn start_condition(&mut self, condition: SideCondition) -> u8 {
        let layers = self.conditions.entry(condition).or_insert(0);
        *layers = (*layers + 1).min(condition.max_layers());
        *layers
    }

    /// Remove a condition, returns false if it was not active
    pub fn end_condition(&mut self, condition: SideCondition) -> bool {
        self.conditions.remove(&condition).is_some()
    }

    pub fn start_unknown_condition(&mut self, name: &str) {
        self.unknown_conditions.insert(condition_id(name));
    }

    /// Remove an unknown condition, returns false if it was never started
    pub fn end_unknown_condition(&mut self, name: &str) -> bool {
        self.unknown_conditions.remove(&condition_id(name))
    }
}
