//! Battle state tracking from server messages

mod battle;
mod carry_over;
mod request;
mod resolver;
mod updater;

pub use battle::{CreatureRef, TrackedBattle};
pub use carry_over::{BatonPass, BoostCarryOver, EntranceCause, ResetAlways};
pub use resolver::ResolveOptions;
