//! Domain types for battle state tracking

mod conditions;
mod creature;
mod field;
mod mechanic;
mod side;
mod stats;
mod status;
mod typing;

pub use conditions::{Field, SideCondition, Weather};
pub use creature::{Creature, MAX_KNOWN_MOVES, PartialDetails, Profile, Reveal};
pub use field::FieldState;
pub use mechanic::{Mechanic, MechanicAllocation, MechanicUsage};
pub use side::{MAX_TEAM_SIZE, SideState};
pub use stats::{MAX_STAGE, StatStages};
pub use status::{Status, Volatile};
pub use typing::Type;
