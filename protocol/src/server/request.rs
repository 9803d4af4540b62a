//! Battle request payloads
//!
//! These types mirror the JSON carried by `|request|` lines. The request is the only
//! authoritative description of our own team and of what we may do next.

use serde::{Deserialize, Deserializer};

use super::ident::{HpStatus, Player};

/// What a request is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    TeamPreview,
    ForceSwitch,
    Move,
    Wait,
}

/// A request asking the player to make a decision
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRequest {
    /// Request ID, echoed back with the choice
    pub rqid: Option<u64>,

    /// One entry per active slot on our side
    #[serde(default)]
    pub active: Vec<ActiveSlot>,

    pub side: Option<RequestSide>,

    /// Per slot: whether that slot must switch
    #[serde(default)]
    pub force_switch: Vec<bool>,

    #[serde(default)]
    pub team_preview: bool,

    /// Number of creatures to bring in formats that pick a subset at preview
    #[serde(default)]
    pub max_chosen_team_size: Option<usize>,

    #[serde(default)]
    pub wait: bool,

    #[serde(default)]
    pub no_cancel: bool,
}

impl BattleRequest {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn kind(&self) -> RequestKind {
        if self.wait {
            RequestKind::Wait
        } else if self.team_preview {
            RequestKind::TeamPreview
        } else if self.force_switch.iter().any(|&b| b) {
            RequestKind::ForceSwitch
        } else if !self.active.is_empty() {
            RequestKind::Move
        } else {
            RequestKind::Wait
        }
    }

    pub fn needs_decision(&self) -> bool {
        self.kind() != RequestKind::Wait
    }

    pub fn player(&self) -> Option<Player> {
        self.side.as_ref().and_then(|s| s.player())
    }

    /// Whether the given active slot must switch this decision
    pub fn must_switch(&self, slot: usize) -> bool {
        self.force_switch.get(slot).copied().unwrap_or(false)
    }

    pub fn pokemon(&self) -> &[RequestPokemon] {
        self.side.as_ref().map(|s| s.pokemon.as_slice()).unwrap_or(&[])
    }

    /// One-based team positions that may be switched in
    pub fn switch_positions(&self) -> Vec<usize> {
        self.pokemon()
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.active && !p.is_fainted())
            .map(|(i, _)| i + 1)
            .collect()
    }
}

/// An active creature and the moves it may use
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSlot {
    #[serde(default)]
    pub moves: Vec<MoveSlot>,

    #[serde(default)]
    pub trapped: bool,

    #[serde(default)]
    pub maybe_trapped: bool,

    #[serde(default)]
    pub can_mega_evo: bool,

    #[serde(default)]
    pub can_ultra_burst: bool,

    /// One entry per move; `None` where that move has no Z version
    #[serde(default)]
    pub can_z_move: Option<Vec<Option<ZMoveInfo>>>,

    #[serde(default)]
    pub can_dynamax: bool,

    #[serde(default)]
    pub can_gigantamax: Option<String>,

    /// Tera type offered this turn
    #[serde(default)]
    pub can_terastallize: Option<String>,

    #[serde(default)]
    pub max_moves: Option<MaxMoves>,
}

impl ActiveSlot {
    /// Usable moves with their one-based slot numbers
    pub fn usable_moves(&self) -> impl Iterator<Item = (usize, &MoveSlot)> {
        self.moves
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_usable())
            .map(|(i, m)| (i + 1, m))
    }

    pub fn can_switch(&self) -> bool {
        !self.trapped
    }

    pub fn z_move(&self, index: usize) -> Option<&ZMoveInfo> {
        self.can_z_move
            .as_ref()
            .and_then(|z| z.get(index.checked_sub(1)?))
            .and_then(Option::as_ref)
    }

    pub fn max_move(&self, index: usize) -> Option<&MaxMoveSlot> {
        self.max_moves
            .as_ref()
            .and_then(|m| m.max_moves.get(index.checked_sub(1)?))
    }
}

/// A move on an active creature
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveSlot {
    #[serde(rename = "move")]
    pub name: String,

    pub id: String,

    /// Absent while locked into a multi-turn move
    #[serde(default)]
    pub pp: Option<u32>,

    #[serde(default, rename = "maxpp")]
    pub max_pp: Option<u32>,

    /// Target class (normal, self, adjacentFoe, ...)
    #[serde(default)]
    pub target: Option<String>,

    /// The server sends either a bool or the name of the disabling effect
    #[serde(default, deserialize_with = "bool_or_source")]
    pub disabled: bool,
}

impl MoveSlot {
    pub fn is_usable(&self) -> bool {
        !self.disabled && self.pp.is_none_or(|pp| pp > 0)
    }
}

fn bool_or_source<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Null => false,
        _ => true,
    })
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZMoveInfo {
    #[serde(rename = "move")]
    pub name: String,

    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxMoves {
    #[serde(default)]
    pub max_moves: Vec<MaxMoveSlot>,

    #[serde(default)]
    pub gigantamax: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxMoveSlot {
    #[serde(rename = "move")]
    pub name: String,

    pub target: String,
}

/// Our side as reported by the request
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSide {
    pub name: String,

    pub id: String,

    #[serde(default)]
    pub pokemon: Vec<RequestPokemon>,
}

impl RequestSide {
    pub fn player(&self) -> Option<Player> {
        Player::parse(&self.id)
    }
}

/// A creature on our team, with everything the server knows about it
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPokemon {
    /// e.g. `p1: Pikachu`
    pub ident: String,

    pub details: String,

    /// `HP/MAXHP STATUS`
    pub condition: String,

    #[serde(default)]
    pub active: bool,

    #[serde(default)]
    pub stats: StatTable,

    #[serde(default)]
    pub moves: Vec<String>,

    #[serde(default)]
    pub base_ability: String,

    #[serde(default)]
    pub ability: String,

    #[serde(default)]
    pub item: String,

    #[serde(default)]
    pub pokeball: String,

    #[serde(default)]
    pub tera_type: Option<String>,

    /// Tera type once terastallized, empty otherwise
    #[serde(default)]
    pub terastallized: Option<String>,
}

impl RequestPokemon {
    pub fn is_fainted(&self) -> bool {
        self.condition.ends_with(" fnt") || self.condition == "0"
    }

    pub fn hp_status(&self) -> Option<HpStatus> {
        HpStatus::parse(&self.condition)
    }

    pub fn species(&self) -> &str {
        self.details.split(',').next().unwrap_or(&self.details)
    }

    pub fn is_terastallized(&self) -> bool {
        self.terastallized.as_deref().is_some_and(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct StatTable {
    #[serde(default)]
    pub atk: u32,
    #[serde(default)]
    pub def: u32,
    #[serde(default)]
    pub spa: u32,
    #[serde(default)]
    pub spd: u32,
    #[serde(default)]
    pub spe: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOVE_REQUEST: &str = r#"{
        "active": [{
            "moves": [
                {"move": "Thunderbolt", "id": "thunderbolt", "pp": 24, "maxpp": 24, "target": "normal", "disabled": false},
                {"move": "Outrage", "id": "outrage", "target": "randomNormal", "disabled": false},
                {"move": "Protect", "id": "protect", "pp": 0, "maxpp": 16, "target": "self", "disabled": false},
                {"move": "Taunt", "id": "taunt", "pp": 32, "maxpp": 32, "target": "normal", "disabled": "Torment"}
            ],
            "canTerastallize": "Electric"
        }],
        "side": {
            "name": "Alice",
            "id": "p2",
            "pokemon": [
                {"ident": "p2: Tapu Koko", "details": "Tapu Koko, L50", "condition": "145/145", "active": true,
                 "stats": {"atk": 120, "def": 105, "spa": 115, "spd": 95, "spe": 150},
                 "moves": ["thunderbolt", "outrage", "protect", "taunt"], "baseAbility": "electricsurge",
                 "item": "lifeorb", "ability": "electricsurge", "teraType": "Electric", "terastallized": ""},
                {"ident": "p2: Azumarill", "details": "Azumarill, L50, F", "condition": "0 fnt", "active": false,
                 "moves": [], "ability": "hugepower", "item": ""},
                {"ident": "p2: Yveltal", "details": "Yveltal", "condition": "100/201 par", "active": false,
                 "moves": [], "ability": "darkaura", "item": ""}
            ]
        },
        "rqid": 7
    }"#;

    #[test]
    fn test_move_request() {
        let request = BattleRequest::from_json(MOVE_REQUEST).unwrap();
        assert_eq!(request.kind(), RequestKind::Move);
        assert_eq!(request.rqid, Some(7));
        assert_eq!(request.player(), Some(Player::P2));

        let active = &request.active[0];
        let usable: Vec<usize> = active.usable_moves().map(|(i, _)| i).collect();
        assert_eq!(usable, vec![1, 2]);
        assert_eq!(active.can_terastallize.as_deref(), Some("Electric"));
        assert!(active.can_switch());
    }

    #[test]
    fn test_switch_positions_skip_active_and_fainted() {
        let request = BattleRequest::from_json(MOVE_REQUEST).unwrap();
        assert_eq!(request.switch_positions(), vec![3]);

        let yveltal = &request.pokemon()[2];
        assert_eq!(yveltal.species(), "Yveltal");
        assert_eq!(yveltal.hp_status().unwrap().status.as_deref(), Some("par"));
        assert!(!request.pokemon()[0].is_terastallized());
        assert!(request.pokemon()[1].is_fainted());
    }

    #[test]
    fn test_force_switch_request() {
        let request = BattleRequest::from_json(
            r#"{"forceSwitch": [false, true], "side": {"name": "a", "id": "p1", "pokemon": []}, "rqid": 3}"#,
        )
        .unwrap();
        assert_eq!(request.kind(), RequestKind::ForceSwitch);
        assert!(!request.must_switch(0));
        assert!(request.must_switch(1));
        assert!(!request.must_switch(2));
    }

    #[test]
    fn test_wait_and_preview_requests() {
        let wait = BattleRequest::from_json(r#"{"wait": true, "side": {"name": "a", "id": "p1"}}"#).unwrap();
        assert_eq!(wait.kind(), RequestKind::Wait);
        assert!(!wait.needs_decision());

        let preview = BattleRequest::from_json(r#"{"teamPreview": true, "maxChosenTeamSize": 4}"#).unwrap();
        assert_eq!(preview.kind(), RequestKind::TeamPreview);
        assert_eq!(preview.max_chosen_team_size, Some(4));
    }
}
