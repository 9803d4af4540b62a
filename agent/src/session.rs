//! One battle driven by its engine and answered by an agent

use pokestate_battle::{BattleEngine, BattleError, DecisionPoint, Phase, Variant};
use pokestate_protocol::ClientMessage;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::handoff::{self, CancelToken, HandoffError, HandoffReceiver, HandoffSender};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    #[error("battle session is gone")]
    Cancelled,
    #[error(transparent)]
    Rejected(#[from] BattleError),
}

impl From<HandoffError> for AgentError {
    fn from(_: HandoffError) -> Self {
        AgentError::Cancelled
    }
}

/// Why a session stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Finished,
    Errored(BattleError),
    /// Cancelled, or the agent went away
    Abandoned,
    /// The line feed closed
    Disconnected,
}

/// What the line feed carries
#[derive(Debug)]
enum Feed {
    Line(String),
    EndOfFrame,
}

struct Submission<V: Variant> {
    order: V::Order,
    reply: oneshot::Sender<Result<(), BattleError>>,
}

/// Create a session with its line input and agent handle.
///
/// Commands produced by accepted orders are sent on `outgoing`.
pub fn session<V: Variant>(
    config: &SessionConfig,
    outgoing: mpsc::UnboundedSender<ClientMessage>,
) -> (BattleSession<V>, SessionInput, AgentHandle<V>) {
    let token = CancelToken::new();
    let mut engine = BattleEngine::new(&config.engine);
    if let Some(room) = &config.room_id {
        engine = engine.with_room(room.clone());
    }

    let (line_tx, line_rx) = mpsc::channel(config.line_capacity.max(1));
    let (decision_tx, decision_rx) = handoff::channel(&token);
    let (order_tx, order_rx) = handoff::channel(&token);

    let session = BattleSession {
        engine,
        lines: line_rx,
        decisions: decision_tx,
        orders: order_rx,
        outgoing,
        token: token.clone(),
    };
    let input = SessionInput {
        lines: line_tx,
        token,
    };
    let handle = AgentHandle {
        room_id: config.room_id.clone(),
        decisions: decision_rx,
        orders: order_tx,
    };
    (session, input, handle)
}

pub struct BattleSession<V: Variant> {
    engine: BattleEngine<V>,
    lines: mpsc::Receiver<Feed>,
    decisions: HandoffSender<DecisionPoint<V>>,
    orders: HandoffReceiver<Submission<V>>,
    outgoing: mpsc::UnboundedSender<ClientMessage>,
    token: CancelToken,
}

impl<V: Variant> BattleSession<V> {
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Drive the battle until it ends, is cancelled or loses its line feed.
    ///
    /// The token is cancelled on the way out so a waiting agent wakes up.
    pub async fn run(mut self) -> SessionEnd {
        let end = self.drive().await;
        self.token.cancel();
        info!(room = ?self.engine.room_id(), ?end, "battle session ended");
        end
    }

    async fn drive(&mut self) -> SessionEnd {
        loop {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => return SessionEnd::Abandoned,
                submission = self.orders.take() => match submission {
                    Ok(submission) => answer(&mut self.engine, &self.outgoing, submission),
                    Err(_) => return SessionEnd::Abandoned,
                },
                feed = self.lines.recv() => {
                    let Some(feed) = feed else {
                        return SessionEnd::Disconnected;
                    };
                    if let Some(end) = self.ingest(feed).await {
                        return end;
                    }
                }
            }
        }
    }

    async fn ingest(&mut self, feed: Feed) -> Option<SessionEnd> {
        match feed {
            Feed::Line(line) => {
                if let Err(error) = self.engine.ingest_line(&line) {
                    if error.is_fatal() {
                        return Some(SessionEnd::Errored(error));
                    }
                    warn!(room = ?self.engine.room_id(), %error, "line rejected");
                }
            }
            Feed::EndOfFrame => self.engine.end_batch(),
        }
        if self.engine.phase() == Phase::Finished {
            return Some(SessionEnd::Finished);
        }

        let point = self.engine.take_decision_point()?;
        debug!(room = ?self.engine.room_id(), rqid = ?point.rqid, "handing decision to agent");

        // Keep answering orders while the agent still holds an older decision
        let put = self.decisions.put(point);
        tokio::pin!(put);
        loop {
            tokio::select! {
                biased;
                delivered = &mut put => {
                    return delivered.err().map(|_| SessionEnd::Abandoned);
                }
                submission = self.orders.take() => match submission {
                    Ok(submission) => answer(&mut self.engine, &self.outgoing, submission),
                    Err(_) => return Some(SessionEnd::Abandoned),
                },
            }
        }
    }
}

fn answer<V: Variant>(
    engine: &mut BattleEngine<V>,
    outgoing: &mpsc::UnboundedSender<ClientMessage>,
    submission: Submission<V>,
) {
    let result = engine.submit(&submission.order).map(|message| {
        debug!(room = ?engine.room_id(), command = %message.to_wire_format(), "sending order");
        if outgoing.send(message).is_err() {
            warn!(room = ?engine.room_id(), "outgoing channel closed, order dropped");
        }
    });
    if let Err(error) = &result {
        warn!(room = ?engine.room_id(), %error, order = %submission.order, "order rejected");
    }
    submission.reply.send(result).ok();
}

/// Feeds raw protocol lines into one session
#[derive(Debug, Clone)]
pub struct SessionInput {
    lines: mpsc::Sender<Feed>,
    token: CancelToken,
}

impl SessionInput {
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    pub async fn send_line(&self, line: impl Into<String>) -> Result<(), HandoffError> {
        self.send(Feed::Line(line.into())).await
    }

    /// Send every line of a frame, skipping the `>ROOMID` header, then close the frame
    pub async fn send_frame(&self, frame: &str) -> Result<(), HandoffError> {
        for line in frame.lines() {
            if line.is_empty() || line.starts_with('>') {
                continue;
            }
            self.send_line(line).await?;
        }
        self.end_frame().await
    }

    /// Mark the end of a frame sent line by line
    pub async fn end_frame(&self) -> Result<(), HandoffError> {
        self.send(Feed::EndOfFrame).await
    }

    async fn send(&self, feed: Feed) -> Result<(), HandoffError> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(HandoffError::Cancelled),
            sent = self.lines.send(feed) => sent.map_err(|_| HandoffError::Cancelled),
        }
    }
}

/// The agent's end of a session
pub struct AgentHandle<V: Variant> {
    room_id: Option<String>,
    decisions: HandoffReceiver<DecisionPoint<V>>,
    orders: HandoffSender<Submission<V>>,
}

impl<V: Variant> AgentHandle<V> {
    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    /// Wait for the next decision point
    pub async fn next_decision(&mut self) -> Result<DecisionPoint<V>, AgentError> {
        Ok(self.decisions.take().await?)
    }

    /// Submit an order and wait for the session's verdict.
    ///
    /// An illegal order comes back as [`AgentError::Rejected`] and may be retried.
    pub async fn submit(&self, order: V::Order) -> Result<(), AgentError> {
        let (reply, verdict) = oneshot::channel();
        self.orders.put(Submission { order, reply }).await?;
        verdict.await.map_err(|_| AgentError::Cancelled)??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pokestate_battle::{EngineConfig, Order, Singles};

    use super::*;

    const REQUEST: &str = r#"|request|{"rqid": 3,
        "active": [{"moves": [{"move": "Thunderbolt", "id": "thunderbolt", "pp": 24, "maxpp": 24, "target": "normal"}]}],
        "side": {"name": "Alice", "id": "p1", "pokemon": [
            {"ident": "p1: Pikachu", "details": "Pikachu", "condition": "100/100", "active": true}
        ]}}"#;

    fn config() -> SessionConfig {
        SessionConfig {
            room_id: Some("battle-gen9ou-1".to_string()),
            engine: EngineConfig {
                username: Some("Alice".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    async fn start(input: &SessionInput) {
        for line in [
            "|player|p1|Alice|1",
            "|player|p2|Bob|2",
            "|start",
            "|switch|p1a: Pikachu|Pikachu|100/100",
            "|switch|p2a: Snorlax|Snorlax|100/100",
        ] {
            input.send_line(line).await.unwrap();
        }
        input.send_line(REQUEST.replace('\n', "")).await.unwrap();
        input.send_line("|turn|1").await.unwrap();
    }

    #[tokio::test]
    async fn test_decision_order_roundtrip() {
        let (outgoing, mut sent) = mpsc::unbounded_channel();
        let (session, input, mut agent) = session::<Singles>(&config(), outgoing);
        let task = tokio::spawn(session.run());

        start(&input).await;
        let point = agent.next_decision().await.unwrap();
        assert_eq!(point.rqid, Some(3));

        let rejected = agent.submit(Order::move_to(3)).await.unwrap_err();
        assert!(matches!(rejected, AgentError::Rejected(BattleError::IllegalOrder { .. })));

        agent.submit(Order::move_to(1)).await.unwrap();
        let command = sent.recv().await.unwrap();
        assert_eq!(command.to_wire_format(), "battle-gen9ou-1|/choose move 1|3");

        input.send_line("|win|Alice").await.unwrap();
        assert_eq!(task.await.unwrap(), SessionEnd::Finished);
        assert_eq!(agent.next_decision().await.unwrap_err(), AgentError::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_releases_agent() {
        let (outgoing, _sent) = mpsc::unbounded_channel();
        let (session, input, mut agent) = session::<Singles>(&config(), outgoing);
        let token = session.token().clone();
        let task = tokio::spawn(session.run());

        token.cancel();
        assert_eq!(agent.next_decision().await.unwrap_err(), AgentError::Cancelled);
        assert_eq!(task.await.unwrap(), SessionEnd::Abandoned);
        assert!(input.send_line("|turn|1").await.is_err());
    }

    #[tokio::test]
    async fn test_fatal_line_ends_session() {
        let (outgoing, _sent) = mpsc::unbounded_channel();
        let (session, input, _agent) = session::<Singles>(&config(), outgoing);
        let task = tokio::spawn(session.run());

        start(&input).await;
        input.send_line("|-fieldend|move: Trick Room").await.unwrap();
        assert!(matches!(task.await.unwrap(), SessionEnd::Errored(error) if error.is_fatal()));
    }

    #[tokio::test]
    async fn test_closed_feed_disconnects() {
        let (outgoing, _sent) = mpsc::unbounded_channel();
        let (session, input, _agent) = session::<Singles>(&config(), outgoing);
        drop(input);
        assert_eq!(session.run().await, SessionEnd::Disconnected);
    }
}
