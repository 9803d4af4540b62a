//! Read-only species and move lookup
//!
//! The engine never loads data files itself. It is handed an `Arc<dyn StaticData>`;
//! [`Dex::shared`] provides the embedded tables, parsed once per process.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use pokestate_protocol::to_id;
use serde::Deserialize;

use crate::types::Type;

const SPECIES_JSON: &str = include_str!("../../data/species.json");
const MOVES_JSON: &str = include_str!("../../data/moves.json");

static SHARED: LazyLock<Arc<Dex>> = LazyLock::new(|| Arc::new(Dex::builtin()));

/// Lookup service consumed by the engine
pub trait StaticData: Send + Sync + std::fmt::Debug {
    fn species(&self, name: &str) -> Option<&SpeciesData>;
    fn move_data(&self, name: &str) -> Option<&MoveData>;

    /// ID of the species a forme belongs to. Species missing from the data
    /// fall back to the name up to its first hyphen.
    fn base_species_id(&self, name: &str) -> String {
        match self.species(name) {
            Some(data) => to_id(data.base_species.as_deref().unwrap_or(&data.name)),
            None => to_id(name.split('-').next().unwrap_or(name)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BaseStats {
    pub hp: u16,
    pub atk: u16,
    pub def: u16,
    pub spa: u16,
    pub spd: u16,
    pub spe: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesData {
    pub name: String,
    /// Set on formes only
    #[serde(default)]
    pub base_species: Option<String>,
    pub types: Vec<Type>,
    pub base_stats: BaseStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

/// Who a move may be aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum MoveTarget {
    Normal,
    Any,
    AdjacentFoe,
    AdjacentAlly,
    AdjacentAllyOrSelf,
    User,
    AllAdjacent,
    AllAdjacentFoes,
    AllySide,
    FoeSide,
    All,
    AllyTeam,
    Allies,
    RandomNormal,
    Scripted,
    Unknown,
}

impl MoveTarget {
    /// Parse the target class used by requests and move data
    pub fn from_protocol(s: &str) -> Self {
        match s {
            "normal" => MoveTarget::Normal,
            "any" => MoveTarget::Any,
            "adjacentFoe" => MoveTarget::AdjacentFoe,
            "adjacentAlly" => MoveTarget::AdjacentAlly,
            "adjacentAllyOrSelf" => MoveTarget::AdjacentAllyOrSelf,
            "self" => MoveTarget::User,
            "allAdjacent" => MoveTarget::AllAdjacent,
            "allAdjacentFoes" => MoveTarget::AllAdjacentFoes,
            "allySide" => MoveTarget::AllySide,
            "foeSide" => MoveTarget::FoeSide,
            "all" => MoveTarget::All,
            "allyTeam" => MoveTarget::AllyTeam,
            "allies" => MoveTarget::Allies,
            "randomNormal" => MoveTarget::RandomNormal,
            "scripted" => MoveTarget::Scripted,
            _ => MoveTarget::Unknown,
        }
    }

    /// Whether a doubles choice must name a target position
    pub fn is_targeted(&self) -> bool {
        matches!(
            self,
            MoveTarget::Normal
                | MoveTarget::Any
                | MoveTarget::AdjacentFoe
                | MoveTarget::AdjacentAlly
                | MoveTarget::AdjacentAllyOrSelf
        )
    }
}

impl From<String> for MoveTarget {
    fn from(s: String) -> Self {
        MoveTarget::from_protocol(&s)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveData {
    pub name: String,
    #[serde(rename = "type")]
    pub move_type: Type,
    pub category: MoveCategory,
    #[serde(default)]
    pub base_power: u16,
    pub pp: u8,
    pub target: MoveTarget,
    #[serde(default)]
    pub priority: i8,
    #[serde(default)]
    pub is_z: bool,
    #[serde(default)]
    pub is_max: bool,
}

/// Species and move tables keyed by ID
#[derive(Debug, Clone, Default)]
pub struct Dex {
    species: HashMap<String, SpeciesData>,
    moves: HashMap<String, MoveData>,
}

impl Dex {
    pub fn from_json(species: &str, moves: &str) -> serde_json::Result<Self> {
        Ok(Self {
            species: serde_json::from_str(species)?,
            moves: serde_json::from_str(moves)?,
        })
    }

    fn builtin() -> Self {
        Self::from_json(SPECIES_JSON, MOVES_JSON).unwrap_or_else(|error| {
            tracing::error!(%error, "embedded static data failed to parse");
            Dex::default()
        })
    }

    /// The embedded tables, shared by every battle in the process
    pub fn shared() -> Arc<Dex> {
        Arc::clone(&SHARED)
    }

    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }
}

impl StaticData for Dex {
    fn species(&self, name: &str) -> Option<&SpeciesData> {
        self.species.get(&to_id(name))
    }

    fn move_data(&self, name: &str) -> Option<&MoveData> {
        self.moves.get(&to_id(name))
    }
}
