//! Async hand-off between battle engines and decision-making agents.
//!
//! Each battle runs as a [`BattleSession`] on its own tokio task. The session feeds
//! protocol lines to a [`BattleEngine`](pokestate_battle::BattleEngine), hands every
//! decision point to the agent through a one-slot buffer and answers each submitted
//! order with the engine's verdict. Accepted orders leave as [`ClientMessage`]s on an
//! outgoing channel owned by the networking layer.
//!
//! ```ignore
//! let (outgoing, mut commands) = tokio::sync::mpsc::unbounded_channel();
//! let mut registry = BattleRegistry::new(SessionConfig::default(), outgoing);
//! let mut agent = registry.open::<Singles>("battle-gen9ou-1")?;
//!
//! tokio::spawn(async move {
//!     while let Ok(point) = agent.next_decision().await {
//!         let order = point.actions.orders()[0].clone();
//!         agent.submit(order).await.ok();
//!     }
//! });
//!
//! registry.route(&frame).await;
//! ```

mod config;
pub mod handoff;
mod registry;
mod session;

pub use config::SessionConfig;
pub use handoff::{CancelToken, HandoffError};
pub use registry::BattleRegistry;
pub use session::{AgentError, AgentHandle, BattleSession, SessionEnd, SessionInput, session};

pub use pokestate_battle::{
    DecisionPoint, DoubleOrder, Doubles, EngineConfig, Order, Singles, Variant,
};
pub use pokestate_protocol::ClientMessage;
