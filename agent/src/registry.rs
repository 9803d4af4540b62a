//! Routing frames to concurrent battle sessions by room id

use std::collections::HashMap;

use anyhow::{Result, bail};
use pokestate_battle::Variant;
use pokestate_protocol::ClientMessage;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::SessionConfig;
use crate::session::{AgentHandle, SessionEnd, SessionInput, session};

struct SessionSlot {
    input: SessionInput,
    task: JoinHandle<SessionEnd>,
}

/// Open battles keyed by room id, each with its own engine, buffers and token
pub struct BattleRegistry {
    template: SessionConfig,
    outgoing: mpsc::UnboundedSender<ClientMessage>,
    sessions: HashMap<String, SessionSlot>,
}

impl BattleRegistry {
    /// `template` is used for every session, with the room id filled in per battle
    pub fn new(template: SessionConfig, outgoing: mpsc::UnboundedSender<ClientMessage>) -> Self {
        Self {
            template,
            outgoing,
            sessions: HashMap::new(),
        }
    }

    /// Start a session for `room_id` on the current tokio runtime
    pub fn open<V: Variant>(&mut self, room_id: &str) -> Result<AgentHandle<V>> {
        if self.sessions.contains_key(room_id) {
            bail!("battle {room_id} is already open");
        }

        let config = self.template.for_room(room_id);
        let (session, input, handle) = session::<V>(&config, self.outgoing.clone());
        let task = tokio::spawn(session.run());
        self.sessions
            .insert(room_id.to_string(), SessionSlot { input, task });

        info!(room = room_id, slots = V::SLOTS, "battle session opened");
        Ok(handle)
    }

    /// Hand a `>ROOMID` frame to its session. Returns whether a session took all of it.
    ///
    /// A stopped session stays registered until [`reap`](Self::reap) collects it.
    pub async fn route(&self, frame: &str) -> bool {
        let Some(room) = frame
            .lines()
            .next()
            .and_then(|line| line.strip_prefix('>'))
            .map(str::trim)
        else {
            debug!("frame without a room, not routed");
            return false;
        };
        let Some(slot) = self.sessions.get(room) else {
            debug!(room, "no session for room");
            return false;
        };

        let delivered = slot.input.send_frame(frame).await.is_ok();
        if !delivered {
            warn!(room, "session has stopped, frame dropped");
        }
        delivered
    }

    /// Cancel one battle. Other sessions keep running
    pub fn abandon(&mut self, room_id: &str) -> bool {
        match self.sessions.remove(room_id) {
            Some(slot) => {
                slot.input.token().cancel();
                info!(room = room_id, "battle abandoned");
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, room_id: &str) -> bool {
        self.sessions.contains_key(room_id)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &str> {
        self.sessions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Remove sessions whose task has ended and report how they ended
    pub async fn reap(&mut self) -> Vec<(String, SessionEnd)> {
        let finished: Vec<String> = self
            .sessions
            .iter()
            .filter(|(_, slot)| slot.task.is_finished())
            .map(|(room, _)| room.clone())
            .collect();

        let mut ended = Vec::with_capacity(finished.len());
        for room in finished {
            if let Some(slot) = self.sessions.remove(&room) {
                match slot.task.await {
                    Ok(end) => ended.push((room, end)),
                    Err(e) => error!(room = %room, error = %e, "session task failed"),
                }
            }
        }
        ended
    }

    /// Cancel every session and wait for all of them
    pub async fn shutdown(mut self) -> Vec<(String, SessionEnd)> {
        let mut ended = Vec::with_capacity(self.sessions.len());
        for (room, slot) in self.sessions.drain() {
            slot.input.token().cancel();
            match slot.task.await {
                Ok(end) => ended.push((room, end)),
                Err(e) => error!(room = %room, error = %e, "session task failed"),
            }
        }
        ended
    }
}
