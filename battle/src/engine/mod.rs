//! Per-battle orchestration
//!
//! A [`BattleEngine`] owns one [`TrackedBattle`], feeds it lines in order and decides
//! when a request becomes actionable. The server sends the request and the line that
//! makes it actionable (`|turn|`, `|upkeep|`, `|teampreview|`) in either order, so
//! whichever arrives second arms the decision point. A switch forced mid-turn has no
//! such line and arms at the end of the frame that follows its request.

mod snapshot;
mod variant;

use std::collections::BTreeSet;
use std::sync::Arc;

use pokestate_protocol::{
    BattleRequest, ClientCommand, ClientMessage, RequestKind, ServerMessage, parse_server_message,
};
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::data::{Dex, StaticData};
use crate::error::{BattleError, Result};
use crate::tracking::TrackedBattle;

pub use snapshot::{BattleSnapshot, Phase};
pub use variant::{Doubles, Singles, Variant};

pub type SinglesEngine = BattleEngine<Singles>;
pub type DoublesEngine = BattleEngine<Doubles>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Trigger {
    TeamPreview,
    Turn,
    Upkeep,
}

impl Trigger {
    fn for_request(kind: RequestKind) -> Option<Self> {
        match kind {
            RequestKind::TeamPreview => Some(Trigger::TeamPreview),
            RequestKind::Move => Some(Trigger::Turn),
            RequestKind::ForceSwitch => Some(Trigger::Upkeep),
            RequestKind::Wait => None,
        }
    }

    fn from_message(msg: &ServerMessage) -> Option<Self> {
        match msg {
            ServerMessage::TeamPreview(_) => Some(Trigger::TeamPreview),
            ServerMessage::Turn(_) => Some(Trigger::Turn),
            ServerMessage::Upkeep => Some(Trigger::Upkeep),
            _ => None,
        }
    }
}

/// A state snapshot and the orders that answer it
#[derive(Debug, Clone)]
pub struct DecisionPoint<V: Variant> {
    pub rqid: Option<u64>,
    pub kind: RequestKind,
    pub snapshot: BattleSnapshot,
    pub actions: V::Actions,
}

#[derive(Debug)]
pub struct BattleEngine<V: Variant> {
    room_id: Option<String>,
    battle: TrackedBattle,
    phase: Phase,

    /// Last request received, kept to re-arm after `|error|`
    last_request: Option<BattleRequest>,
    /// Request waiting for its trigger
    pending: Option<BattleRequest>,
    /// Triggers seen while no matching request was pending
    triggers: BTreeSet<Trigger>,
    rearm_next_request: bool,
    /// Battle lines have followed the pending request
    lines_since_request: bool,

    decision: Option<DecisionPoint<V>>,
    delivered: bool,

    error: Option<BattleError>,
}

impl<V: Variant> BattleEngine<V> {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_static_data(config, Dex::shared())
    }

    pub fn with_static_data(config: &EngineConfig, dex: Arc<dyn StaticData>) -> Self {
        let mut battle = TrackedBattle::with_slots(V::SLOTS)
            .with_static_data(dex)
            .with_carry_over(config.carry_over.build())
            .with_strict_conditions(config.strict_conditions);
        battle.generation = config.generation;
        battle.username = config.username.clone();
        if let Some(player) = config.perspective() {
            // A fresh battle has no perspective to conflict with
            battle.set_perspective(player).ok();
        }

        Self {
            room_id: None,
            battle,
            phase: Phase::Preview,
            last_request: None,
            pending: None,
            triggers: BTreeSet::new(),
            rearm_next_request: false,
            lines_since_request: false,
            decision: None,
            delivered: false,
            error: None,
        }
    }

    /// Room the outgoing commands are addressed to
    pub fn with_room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn battle(&self) -> &TrackedBattle {
        &self.battle
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Finished | Phase::Errored)
    }

    pub fn current_state(&self) -> BattleSnapshot {
        BattleSnapshot {
            phase: self.phase,
            battle: self.battle.clone(),
        }
    }

    /// Orders for the armed decision point, if any
    pub fn legal_actions(&self) -> Option<&V::Actions> {
        self.decision.as_ref().map(|d| &d.actions)
    }

    /// The armed decision point, handed out once per arming
    pub fn take_decision_point(&mut self) -> Option<DecisionPoint<V>> {
        if self.delivered {
            return None;
        }
        let point = self.decision.clone()?;
        self.delivered = true;
        Some(point)
    }

    /// Feed one raw protocol line.
    ///
    /// Unknown kinds and malformed payloads are logged and dropped. An error is
    /// returned only when the line contradicts the tracked state.
    pub fn ingest_line(&mut self, line: &str) -> Result<()> {
        if !self.accepting()? {
            return Ok(());
        }
        match parse_server_message(line) {
            Ok(msg) => self.ingest_message(&msg),
            Err(error) => {
                warn!(room = ?self.room_id, %error, line, "dropping unparseable line");
                Ok(())
            }
        }
    }

    pub fn ingest_message(&mut self, msg: &ServerMessage) -> Result<()> {
        if !self.accepting()? {
            return Ok(());
        }

        match msg {
            ServerMessage::Request(Some(request)) => return self.accept_request(request),
            ServerMessage::Error(text) => {
                self.on_choice_error(text);
                return Ok(());
            }
            _ => {}
        }

        if self.phase == Phase::Preview {
            if matches!(
                msg,
                ServerMessage::Turn(_) | ServerMessage::Switch { .. } | ServerMessage::Drag { .. }
            ) {
                info!(room = ?self.room_id, "battle started");
                self.phase = Phase::InProgress;
            } else if !allowed_in_preview(msg) {
                warn!(room = ?self.room_id, message = ?msg, "ignoring battle message before the start");
                return Ok(());
            }
        }

        if let Err(error) = self.battle.update(msg) {
            return Err(self.fail(error));
        }

        if !msg.is_metadata() {
            self.lines_since_request = true;
        }

        if msg.is_terminal() {
            info!(room = ?self.room_id, winner = ?self.battle.winner, tie = self.battle.tie, "battle finished");
            self.phase = Phase::Finished;
            self.pending = None;
            self.decision = None;
            return Ok(());
        }

        if let Some(trigger) = Trigger::from_message(msg) {
            self.on_trigger(trigger);
        }
        Ok(())
    }

    /// Feed a whole frame, then close the batch with [`end_batch`](Self::end_batch)
    pub fn ingest_frame(&mut self, frame: &str) -> Result<()> {
        for line in frame.lines() {
            if line.is_empty() || line.starts_with('>') {
                continue;
            }
            self.ingest_line(line)?;
        }
        self.end_batch();
        Ok(())
    }

    /// Mark the end of a frame.
    ///
    /// A switch forced mid-turn (U-turn, Eject Button, Emergency Exit) is never
    /// followed by `|upkeep|`. Its request arms once a frame of battle lines that
    /// came after it has been read.
    pub fn end_batch(&mut self) {
        if self.is_terminal() || !self.lines_since_request {
            return;
        }
        if let Some(request) = self
            .pending
            .take_if(|request| request.kind() == RequestKind::ForceSwitch)
        {
            self.arm(request);
        }
    }

    pub fn ingest_request(&mut self, request: &BattleRequest) -> Result<()> {
        if !self.accepting()? {
            return Ok(());
        }
        self.accept_request(request)
    }

    /// Request payload as raw JSON. A payload that does not parse is dropped
    pub fn ingest_request_json(&mut self, json: &str) -> Result<()> {
        match BattleRequest::from_json(json) {
            Ok(request) => self.ingest_request(&request),
            Err(error) => {
                warn!(room = ?self.room_id, %error, "dropping malformed request");
                Ok(())
            }
        }
    }

    /// Check an order against the armed decision point and build the command
    /// that sends it. A rejected order changes nothing and may be retried.
    pub fn submit(&mut self, order: &V::Order) -> Result<ClientMessage> {
        if let Some(error) = &self.error {
            return Err(BattleError::BattleErrored(Box::new(error.clone())));
        }
        if self.phase == Phase::Finished {
            return Err(BattleError::BattleFinished);
        }

        if V::is_forfeit(order) {
            self.decision = None;
            self.pending = None;
            return Ok(ClientMessage::new(self.room_id.clone(), ClientCommand::Forfeit));
        }

        let Some(decision) = &self.decision else {
            return Err(BattleError::illegal(order, "no decision is pending"));
        };
        if !V::contains(&decision.actions, order) {
            return Err(BattleError::illegal(order, "not a legal order for this request"));
        }

        let rqid = decision.rqid;
        self.decision = None;
        debug!(room = ?self.room_id, %order, ?rqid, "order accepted");
        Ok(ClientMessage::new(
            self.room_id.clone(),
            ClientCommand::Choose {
                choice: order.to_string(),
                rqid,
            },
        ))
    }

    /// Forfeit, accepted in any live phase
    pub fn forfeit(&mut self) -> Result<ClientMessage> {
        if let Some(error) = &self.error {
            return Err(BattleError::BattleErrored(Box::new(error.clone())));
        }
        self.decision = None;
        self.pending = None;
        Ok(ClientMessage::new(self.room_id.clone(), ClientCommand::Forfeit))
    }

    /// `Ok(false)` once finished, the stored error once errored
    fn accepting(&self) -> Result<bool> {
        if let Some(error) = &self.error {
            return Err(BattleError::BattleErrored(Box::new(error.clone())));
        }
        if self.phase == Phase::Finished {
            debug!(room = ?self.room_id, "battle finished, input ignored");
            return Ok(false);
        }
        Ok(true)
    }

    fn accept_request(&mut self, request: &BattleRequest) -> Result<()> {
        if let Err(error) = self.battle.update_from_request(request) {
            return Err(self.fail(error));
        }

        self.last_request = Some(request.clone());
        self.decision = None;
        self.pending = None;

        let Some(trigger) = Trigger::for_request(request.kind()) else {
            self.rearm_next_request = false;
            return Ok(());
        };
        if std::mem::take(&mut self.rearm_next_request) || self.triggers.contains(&trigger) {
            self.arm(request.clone());
        } else {
            self.pending = Some(request.clone());
            self.lines_since_request = false;
        }
        Ok(())
    }

    fn on_trigger(&mut self, trigger: Trigger) {
        let wanted = self
            .pending
            .as_ref()
            .and_then(|request| Trigger::for_request(request.kind()))
            == Some(trigger);
        match self.pending.take() {
            Some(request) if wanted => self.arm(request),
            other => {
                self.pending = other;
                self.triggers.insert(trigger);
            }
        }
    }

    fn on_choice_error(&mut self, text: &str) {
        warn!(room = ?self.room_id, error = text, "server rejected our choice");
        self.rearm_next_request = true;
        if let Some(request) = self.last_request.clone() {
            if Trigger::for_request(request.kind()).is_some() {
                self.arm(request);
            }
        }
    }

    fn arm(&mut self, request: BattleRequest) {
        self.triggers.clear();
        let actions = V::derive(&self.battle, &request);
        debug!(room = ?self.room_id, rqid = ?request.rqid, kind = ?request.kind(), "decision point armed");
        self.decision = Some(DecisionPoint {
            rqid: request.rqid,
            kind: request.kind(),
            snapshot: self.current_state(),
            actions,
        });
        self.delivered = false;
    }

    fn fail(&mut self, error: BattleError) -> BattleError {
        if error.is_fatal() {
            error!(room = ?self.room_id, %error, "battle state is inconsistent, stopping");
            self.phase = Phase::Errored;
            self.error = Some(error.clone());
            self.pending = None;
            self.decision = None;
        }
        error
    }
}

/// Setup lines plus the outcome; anything else waits for the battle to start
fn allowed_in_preview(msg: &ServerMessage) -> bool {
    msg.is_metadata() || msg.is_terminal() || matches!(msg, ServerMessage::Upkeep)
}
