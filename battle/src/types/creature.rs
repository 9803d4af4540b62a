//! Creature state

use std::collections::HashSet;

use pokestate_protocol::{Details, HpStatus, StatTable, to_id};

use super::stats::StatStages;
use super::status::{Status, Volatile};
use super::typing::Type;
use crate::data::{BaseStats, SpeciesData, StaticData};
use crate::error::{BattleError, Inconsistency, Result};

pub const MAX_KNOWN_MOVES: usize = 4;

const DEFAULT_LEVEL: u8 = 100;

/// Fields learned so far about a creature that has not been fully revealed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialDetails {
    /// Set from a wildcard preview entry (`Arceus-*` gives `Arceus`)
    pub species: Option<String>,
    pub level: Option<u8>,
    pub gender: Option<char>,
    pub shiny: Option<bool>,
}

/// Confirmed identity details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub species: String,
    pub level: u8,
    pub gender: Option<char>,
    pub shiny: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reveal {
    Incomplete(PartialDetails),
    Resolved(Profile),
}

/// One creature as seen from our side of the field
#[derive(Debug, Clone)]
pub struct Creature {
    /// Battle-long identity, e.g. `p2: tapukoko`
    pub key: String,
    /// Nickname as the server shows it
    pub name: String,
    pub reveal: Reveal,

    /// Exact for our side; out of 100 for the opponent
    pub hp_current: u32,
    pub hp_max: Option<u32>,
    pub status: Option<Status>,
    pub active: bool,

    pub boosts: StatStages,
    pub volatiles: HashSet<Volatile>,

    pub base_types: Vec<Type>,
    pub current_types: Vec<Type>,
    pub base_stats: Option<BaseStats>,
    /// Exact stats, only ever known for our own creatures
    pub stats: Option<StatTable>,

    pub tera_type: Option<Type>,
    pub terastallized: bool,
    pub mega_evolved: bool,
    /// Currently dynamaxed; cleared when it ends
    pub dynamaxed: bool,
    pub z_move_used: bool,

    /// Move ids in order of first use
    pub known_moves: Vec<String>,
    pub ability: Option<String>,
    pub item: Option<String>,
    pub item_consumed: bool,
    /// Species this creature transformed into
    pub transformed: Option<String>,
    /// Last move used since switching in
    pub last_move: Option<String>,
}

impl Creature {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            reveal: Reveal::Incomplete(PartialDetails::default()),
            hp_current: 100,
            hp_max: Some(100),
            status: None,
            active: false,
            boosts: StatStages::new(),
            volatiles: HashSet::new(),
            base_types: Vec::new(),
            current_types: Vec::new(),
            base_stats: None,
            stats: None,
            tera_type: None,
            terastallized: false,
            mega_evolved: false,
            dynamaxed: false,
            z_move_used: false,
            known_moves: Vec::new(),
            ability: None,
            item: None,
            item_consumed: false,
            transformed: None,
            last_move: None,
        }
    }

    /// Confirmed species, else the wildcard base, else a guess from the nickname
    pub fn species(&self) -> &str {
        match &self.reveal {
            Reveal::Resolved(profile) => &profile.species,
            Reveal::Incomplete(partial) => partial.species.as_deref().unwrap_or(&self.name),
        }
    }

    pub fn species_id(&self) -> String {
        to_id(self.species())
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.reveal, Reveal::Resolved(_))
    }

    pub fn level(&self) -> u8 {
        match &self.reveal {
            Reveal::Resolved(profile) => profile.level,
            Reveal::Incomplete(partial) => partial.level.unwrap_or(DEFAULT_LEVEL),
        }
    }

    /// Merge a details payload, filling only unset fields.
    ///
    /// Returns whether the species changed. A confirmed species may only move to
    /// another forme of the same base species, as `dex` knows them.
    pub fn merge_details(&mut self, details: &Details, dex: &dyn StaticData) -> Result<bool> {
        if let Some(tera) = details.tera_type.as_deref().and_then(Type::from_protocol) {
            self.tera_type.get_or_insert(tera);
        }

        match &mut self.reveal {
            Reveal::Incomplete(partial) => {
                partial.level = partial.level.or(details.level);
                partial.gender = partial.gender.or(details.gender);
                partial.shiny = partial.shiny.or(details.shiny.then_some(true));

                if details.species.is_empty() {
                    return Ok(false);
                }
                if details.is_wildcard() {
                    let base = details.base_species().to_string();
                    let changed = partial.species.as_deref() != Some(base.as_str());
                    partial.species.get_or_insert(base);
                    return Ok(changed);
                }

                self.reveal = Reveal::Resolved(Profile {
                    species: details.species.clone(),
                    level: partial.level.unwrap_or(DEFAULT_LEVEL),
                    gender: partial.gender,
                    shiny: partial.shiny.unwrap_or(false),
                });
                Ok(true)
            }
            Reveal::Resolved(profile) => {
                if details.species.is_empty()
                    || details.is_wildcard()
                    || to_id(&details.species) == to_id(&profile.species)
                {
                    return Ok(false);
                }
                if dex.base_species_id(&details.species) != dex.base_species_id(&profile.species) {
                    return Err(BattleError::inconsistent(
                        Inconsistency::SpeciesMismatch,
                        format!(
                            "{} is {} but was reported as {}",
                            self.key, profile.species, details.species
                        ),
                    ));
                }
                profile.species = details.species.clone();
                Ok(true)
            }
        }
    }

    /// Permanent forme change (`detailschange`, mega, primal, burst)
    pub fn change_forme(&mut self, species: &str) {
        match &mut self.reveal {
            Reveal::Resolved(profile) => profile.species = species.to_string(),
            Reveal::Incomplete(partial) => {
                self.reveal = Reveal::Resolved(Profile {
                    species: species.to_string(),
                    level: partial.level.unwrap_or(DEFAULT_LEVEL),
                    gender: partial.gender,
                    shiny: partial.shiny.unwrap_or(false),
                });
            }
        }
    }

    /// Fill typing and base stats after the species is (re)assigned
    pub fn apply_species_data(&mut self, data: &SpeciesData) {
        self.base_types = data.types.clone();
        self.base_stats = Some(data.base_stats.clone());
        if !self.terastallized {
            self.current_types = data.types.clone();
        }
    }

    pub fn apply_hp(&mut self, hp: &HpStatus) {
        self.hp_current = hp.current;
        if let Some(max) = hp.max {
            self.hp_max = Some(max);
        }

        match hp.status.as_deref().and_then(Status::from_protocol) {
            Some(status) => self.status = Some(status),
            None if self.is_fainted() && hp.current > 0 => self.status = None,
            None => {}
        }
    }

    pub fn faint(&mut self) {
        self.hp_current = 0;
        self.status = Some(Status::Fainted);
        self.active = false;
    }

    pub fn is_fainted(&self) -> bool {
        self.status == Some(Status::Fainted)
    }

    pub fn is_alive(&self) -> bool {
        !self.is_fainted() && self.hp_current > 0
    }

    pub fn hp_fraction(&self) -> f32 {
        match self.hp_max {
            Some(0) | None => 0.0,
            Some(max) => self.hp_current as f32 / max as f32,
        }
    }

    /// Record a revealed move, returns false when it would exceed the known move cap
    pub fn record_move(&mut self, move_id: &str) -> bool {
        if matches!(move_id, "struggle" | "recharge")
            || self.known_moves.iter().any(|m| m == move_id)
        {
            return true;
        }
        if self.known_moves.len() >= MAX_KNOWN_MOVES {
            return false;
        }
        self.known_moves.push(move_id.to_string());
        true
    }

    pub fn terastallize(&mut self, tera_type: Type) {
        self.tera_type = Some(tera_type);
        self.terastallized = true;
        if tera_type != Type::Stellar {
            self.current_types = vec![tera_type];
        }
    }

    pub fn on_switch_out(&mut self) {
        self.active = false;
        self.boosts.clear();
        self.volatiles.clear();
        self.dynamaxed = false;
        self.transformed = None;
        self.last_move = None;
        self.current_types = match self.tera_type {
            Some(tera) if self.terastallized && tera != Type::Stellar => vec![tera],
            _ => self.base_types.clone(),
        };
    }

    pub fn on_switch_in(&mut self) {
        self.active = true;
    }

    /// Drop effects that only last for the turn that just ended
    pub fn end_turn(&mut self) {
        self.volatiles.retain(|v| !v.is_single_turn());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dex;

    fn merge(creature: &mut Creature, details: &str) -> Result<bool> {
        creature.merge_details(&Details::parse(details), Dex::shared().as_ref())
    }

    fn species_data(types: Vec<Type>) -> SpeciesData {
        SpeciesData {
            name: "Test".to_string(),
            base_species: None,
            types,
            base_stats: BaseStats {
                hp: 70,
                atk: 130,
                def: 115,
                spa: 85,
                spd: 95,
                spe: 75,
            },
        }
    }

    #[test]
    fn test_new_creature_guesses_species_from_name() {
        let creature = Creature::new("p2: tapufini", "Tapu Fini");
        assert!(!creature.is_resolved());
        assert_eq!(creature.species_id(), "tapufini");
        assert_eq!(creature.level(), 100);
    }

    #[test]
    fn test_merge_fills_unset_fields() {
        let mut creature = Creature::new("p1: sparky", "Sparky");
        let changed = merge(&mut creature, "Pikachu, L50, F").unwrap();
        assert!(changed);
        assert_eq!(creature.species(), "Pikachu");
        assert_eq!(creature.level(), 50);

        // Confirmed fields are never overwritten
        merge(&mut creature, "Pikachu, L88, M").unwrap();
        assert_eq!(creature.level(), 50);
        match &creature.reveal {
            Reveal::Resolved(profile) => assert_eq!(profile.gender, Some('F')),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_hyphenated_species_are_distinct() {
        let mut creature = Creature::new("p2: porygon", "Porygon");
        merge(&mut creature, "Porygon").unwrap();
        let err = merge(&mut creature, "Porygon-Z").unwrap_err();
        assert!(matches!(
            err,
            BattleError::ProtocolInconsistency {
                kind: Inconsistency::SpeciesMismatch,
                ..
            }
        ));

        let mut creature = Creature::new("p2: hooh", "Ho-Oh");
        merge(&mut creature, "Ho-Oh, L80").unwrap();
        assert!(!merge(&mut creature, "Ho-Oh").unwrap());
        assert_eq!(creature.species(), "Ho-Oh");
        assert!(merge(&mut creature, "Hoopa").is_err());
    }

    #[test]
    fn test_wildcard_stays_incomplete() {
        let mut creature = Creature::new("p2: arceus", "Arceus");
        merge(&mut creature, "Arceus-*, L70").unwrap();
        assert!(!creature.is_resolved());
        assert_eq!(creature.level(), 70);

        merge(&mut creature, "Arceus-Fire").unwrap();
        assert!(creature.is_resolved());
        assert_eq!(creature.species(), "Arceus-Fire");
        assert_eq!(creature.level(), 70);
    }

    #[test]
    fn test_conflicting_species() {
        let mut creature = Creature::new("p2: charizard", "Charizard");
        merge(&mut creature, "Charizard").unwrap();

        assert!(merge(&mut creature, "Charizard-Mega-Y").unwrap());
        assert_eq!(creature.species(), "Charizard-Mega-Y");

        let err = merge(&mut creature, "Pikachu").unwrap_err();
        assert!(matches!(
            err,
            BattleError::ProtocolInconsistency {
                kind: Inconsistency::SpeciesMismatch,
                ..
            }
        ));
    }

    #[test]
    fn test_known_moves_are_capped() {
        let mut creature = Creature::new("p2: mew", "Mew");
        for id in ["psychic", "flamethrower", "icebeam", "thunderbolt"] {
            assert!(creature.record_move(id));
        }
        assert!(creature.record_move("struggle"));
        assert!(creature.record_move("psychic"));
        assert!(!creature.record_move("softboiled"));
        assert_eq!(creature.known_moves.len(), 4);
    }

    #[test]
    fn test_faint_and_revive() {
        let mut creature = Creature::new("p1: pikachu", "Pikachu");
        creature.apply_hp(&HpStatus::parse("40/100 par").unwrap());
        assert_eq!(creature.status, Some(Status::Paralysis));

        // Status survives a bare HP update
        creature.apply_hp(&HpStatus::parse("20/100").unwrap());
        assert_eq!(creature.status, Some(Status::Paralysis));

        creature.faint();
        assert!(creature.is_fainted());
        assert!(!creature.is_alive());

        creature.apply_hp(&HpStatus::parse("50/100").unwrap());
        assert!(creature.is_alive());
        assert_eq!(creature.status, None);
    }

    #[test]
    fn test_switch_out_resets_battle_state() {
        let mut creature = Creature::new("p2: tapubulu", "Tapu Bulu");
        creature.apply_species_data(&species_data(vec![Type::Grass, Type::Fairy]));
        creature.active = true;
        creature.dynamaxed = true;
        creature.boosts.boost(pokestate_protocol::Stat::Atk, 2);
        creature.volatiles.insert(Volatile::Confusion);
        creature.current_types = vec![Type::Water];

        creature.on_switch_out();
        assert!(!creature.active);
        assert!(!creature.dynamaxed);
        assert!(creature.boosts.is_clear());
        assert!(creature.volatiles.is_empty());
        assert_eq!(creature.current_types, vec![Type::Grass, Type::Fairy]);
    }

    #[test]
    fn test_terastallized_typing_survives_switch() {
        let mut creature = Creature::new("p1: tapukoko", "Tapu Koko");
        creature.apply_species_data(&species_data(vec![Type::Electric, Type::Fairy]));
        creature.terastallize(Type::Electric);
        creature.on_switch_out();
        assert_eq!(creature.current_types, vec![Type::Electric]);
    }
}
