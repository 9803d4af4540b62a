//! TrackedBattle - main battle state tracking struct

use std::collections::BTreeMap;
use std::sync::Arc;

use pokestate_protocol::{Details, GameType, Player};

use super::carry_over::{BatonPass, BoostCarryOver};
use crate::data::{Dex, StaticData};
use crate::error::{BattleError, Inconsistency, Result};
use crate::types::{Creature, FieldState, MAX_TEAM_SIZE, SideState};

/// Handle to a creature returned by the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CreatureRef {
    /// On our team rather than the opponent's
    pub own: bool,
    pub index: usize,
}

/// A battle being tracked from server messages
///
/// State is kept from the point of view of one player. Until that player is known
/// (from a request, or from a `|player|` line carrying our username) creatures that
/// are not forced onto our team are filed under the opponent.
#[derive(Debug, Clone)]
pub struct TrackedBattle {
    pub game_type: Option<GameType>,
    pub generation: u8,
    pub tier: String,
    pub rated: bool,
    pub rules: Vec<String>,

    /// Last turn started, 0 before the first
    pub turn: u32,

    pub field: FieldState,

    /// Our side
    pub team: SideState,
    pub opponent_team: SideState,

    perspective: Option<Player>,
    /// Our username, matched against `|player|` lines
    pub username: Option<String>,
    players: BTreeMap<Player, String>,
    team_sizes: BTreeMap<Player, usize>,
    previews: BTreeMap<Player, Vec<Details>>,

    pub ended: bool,
    pub winner: Option<String>,
    pub tie: bool,

    /// Creature whose next move is the Z-move announced by `-zpower`
    pub(crate) pending_zmove: Option<CreatureRef>,
    /// Starting an unknown side or field condition is an error instead of a warning
    pub(crate) strict_conditions: bool,
    pub(crate) dex: Arc<dyn StaticData>,
    pub(crate) carry_over: Arc<dyn BoostCarryOver>,
}

impl TrackedBattle {
    /// A singles battle using the embedded static data and the Baton Pass rule
    pub fn new() -> Self {
        Self::with_slots(1)
    }

    pub fn with_slots(slots: usize) -> Self {
        Self {
            game_type: None,
            generation: 9,
            tier: String::new(),
            rated: false,
            rules: Vec::new(),
            turn: 0,
            field: FieldState::new(),
            team: SideState::new(slots),
            opponent_team: SideState::new(slots),
            perspective: None,
            username: None,
            players: BTreeMap::new(),
            team_sizes: BTreeMap::new(),
            previews: BTreeMap::new(),
            ended: false,
            winner: None,
            tie: false,
            pending_zmove: None,
            strict_conditions: false,
            dex: Dex::shared(),
            carry_over: Arc::new(BatonPass),
        }
    }

    pub fn with_static_data(mut self, dex: Arc<dyn StaticData>) -> Self {
        self.dex = dex;
        self
    }

    pub fn with_carry_over(mut self, rule: Arc<dyn BoostCarryOver>) -> Self {
        self.carry_over = rule;
        self
    }

    pub fn with_strict_conditions(mut self, strict: bool) -> Self {
        self.strict_conditions = strict;
        self
    }

    pub fn static_data(&self) -> &dyn StaticData {
        self.dex.as_ref()
    }

    pub fn perspective(&self) -> Option<Player> {
        self.perspective
    }

    /// Fix which player we are. Changing it afterwards is an inconsistency
    pub fn set_perspective(&mut self, player: Player) -> Result<()> {
        match self.perspective {
            Some(current) if current != player => Err(BattleError::inconsistent(
                Inconsistency::PerspectiveMismatch,
                format!("playing as {current}, got data for {player}"),
            )),
            Some(_) => Ok(()),
            None => {
                self.perspective = Some(player);
                self.team.player = Some(player);
                self.opponent_team.player = Some(player.foe());
                self.sync_side_metadata();
                Ok(())
            }
        }
    }

    pub(crate) fn record_player(&mut self, player: Player, username: &str) {
        if !username.is_empty() {
            self.players.insert(player, username.to_string());
        }
        self.sync_side_metadata();
    }

    pub(crate) fn record_team_size(&mut self, player: Player, size: usize) {
        self.team_sizes.insert(player, size);
        self.sync_side_metadata();
    }

    pub(crate) fn record_preview(&mut self, player: Player, details: &Details) -> Result<()> {
        let roster = self.previews.entry(player).or_default();
        if roster.len() >= MAX_TEAM_SIZE {
            return Err(BattleError::capacity(format!(
                "{player} previewed more than {MAX_TEAM_SIZE} creatures"
            )));
        }
        roster.push(details.clone());
        self.sync_side_metadata();
        Ok(())
    }

    pub(crate) fn clear_previews(&mut self) {
        self.previews.clear();
        self.team.preview.clear();
        self.opponent_team.preview.clear();
    }

    fn sync_side_metadata(&mut self) {
        let Some(me) = self.perspective else {
            return;
        };
        for (player, side) in [(me, &mut self.team), (me.foe(), &mut self.opponent_team)] {
            if let Some(name) = self.players.get(&player) {
                side.username = Some(name.clone());
            }
            if let Some(size) = self.team_sizes.get(&player) {
                side.team_size = Some(*size);
            }
            if let Some(roster) = self.previews.get(&player) {
                side.preview = roster.clone();
            }
        }
    }

    pub fn username_of(&self, player: Player) -> Option<&str> {
        self.players.get(&player).map(String::as_str)
    }

    /// Whether messages about this player describe our team
    pub fn is_own(&self, player: Player) -> bool {
        self.perspective == Some(player)
    }

    pub fn side(&self, own: bool) -> &SideState {
        if own { &self.team } else { &self.opponent_team }
    }

    pub fn side_mut(&mut self, own: bool) -> &mut SideState {
        if own {
            &mut self.team
        } else {
            &mut self.opponent_team
        }
    }

    pub fn creature(&self, creature: CreatureRef) -> Option<&Creature> {
        self.side(creature.own).creatures.get(creature.index)
    }

    pub fn creature_mut(&mut self, creature: CreatureRef) -> Option<&mut Creature> {
        self.side_mut(creature.own).creatures.get_mut(creature.index)
    }

    /// Look a creature up by key on either team without creating it
    pub fn get_creature(&self, key: &str) -> Option<&Creature> {
        [&self.team, &self.opponent_team]
            .into_iter()
            .find_map(|side| side.find(key).and_then(|idx| side.creatures.get(idx)))
    }

    pub fn slot_count(&self) -> usize {
        self.team.slot_count()
    }

    pub fn set_game_type(&mut self, game_type: GameType) {
        self.game_type = Some(game_type);
        let slots = game_type.active_slots();
        self.team.set_slot_count(slots);
        self.opponent_team.set_slot_count(slots);
    }

    pub fn is_active(&self) -> bool {
        self.turn > 0 && !self.ended
    }
}

impl Default for TrackedBattle {
    fn default() -> Self {
        Self::new()
    }
}
