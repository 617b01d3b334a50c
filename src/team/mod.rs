//! Team formation core
//!
//! - [`Roster`]: append-only, deduplicated participant collection
//! - [`partition`]: snake-draft split of a roster snapshot into teams
//! - [`stats`]: per-team total and average skill

mod partition;
mod roster;
mod stats;

pub use partition::{partition, Team, MAX_TEAM_SIZE, MIN_TEAM_SIZE};
pub use roster::Roster;
pub use stats::{stats, TeamReport, TeamStats};
