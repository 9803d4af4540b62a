//! Battle state tracking and decision points for Pokemon Showdown.
//!
//! # Overview
//!
//! `pokestate-battle` sits between `pokestate-protocol` (wire format) and the agent
//! runtime:
//!
//! ```text
//! pokestate-protocol (wire format)
//!        │
//!        ▼
//! pokestate-battle (tracking + legal orders + engine) ← THIS CRATE
//!        │
//!        ▼
//! pokestate-agent (sessions, handoff, registry)
//! ```
//!
//! # Main Types
//!
//! - [`TrackedBattle`] - both sides and the field, updated line by line
//! - [`SingleActions`], [`DoubleActions`] - legal orders for one request
//! - [`BattleEngine`] - owns a battle, arms decision points, validates orders
//! - [`BattleError`] - fatal inconsistencies versus retryable illegal orders
//!
//! # Example Usage
//!
//! ```ignore
//! use pokestate_battle::{EngineConfig, Order, SinglesEngine};
//!
//! let mut engine = SinglesEngine::new(&EngineConfig::default()).with_room("battle-gen9ou-1");
//! for line in frame.lines() {
//!     engine.ingest_line(line)?;
//! }
//! if let Some(point) = engine.take_decision_point() {
//!     println!("{}", point.snapshot.summary());
//!     let command = engine.submit(&Order::move_to(1))?;
//!     send(command.to_wire_format());
//! }
//! ```

pub mod actions;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod tracking;
pub mod types;

pub use actions::{DoubleActions, DoubleOrder, Order, SingleActions, TeamRule};
pub use config::{CarryOverRule, EngineConfig};
pub use data::{Dex, StaticData};
pub use engine::{
    BattleEngine, BattleSnapshot, DecisionPoint, Doubles, DoublesEngine, Phase, Singles,
    SinglesEngine, Variant,
};
pub use error::{BattleError, Inconsistency};
pub use tracking::{BatonPass, BoostCarryOver, CreatureRef, ResetAlways, TrackedBattle};
pub use types::{
    Creature, Field, FieldState, Mechanic, MechanicUsage, SideCondition, SideState, StatStages,
    Status, Type, Volatile, Weather,
};

pub use pokestate_protocol::{GameType, Player, Stat};
