use std::sync::Arc;

use pokestate_protocol::Player;
use serde::Deserialize;

use crate::tracking::{BatonPass, BoostCarryOver, ResetAlways};

/// Which [`BoostCarryOver`] rule a new battle uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarryOverRule {
    #[default]
    BatonPass,
    ResetAlways,
}

impl CarryOverRule {
    pub fn build(&self) -> Arc<dyn BoostCarryOver> {
        match self {
            CarryOverRule::BatonPass => Arc::new(BatonPass),
            CarryOverRule::ResetAlways => Arc::new(ResetAlways),
        }
    }
}

/// Settings for one [`BattleEngine`](crate::engine::BattleEngine)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Our account name, used to spot our `|player|` line
    pub username: Option<String>,
    /// Player slot to assume before any request arrives (`p1`, `p2`)
    pub perspective: Option<String>,
    /// Generation to assume until a `|gen|` line says otherwise
    pub generation: u8,
    /// Fail the battle when an unknown side or field condition starts
    pub strict_conditions: bool,
    pub carry_over: CarryOverRule,
}

impl EngineConfig {
    pub fn perspective(&self) -> Option<Player> {
        self.perspective.as_deref().and_then(Player::parse)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            username: None,
            perspective: None,
            generation: 9,
            strict_conditions: false,
            carry_over: CarryOverRule::default(),
        }
    }
}
