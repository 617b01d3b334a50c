//! CSV file formats
//!
//! - roster files: participant input, one row per participant
//! - team files: formed team export, one row per team member

mod roster;
mod teams;

pub use roster::{append_roster_row, read_roster, verify_roster_file};
pub use teams::{group_by_team, read_teams, write_teams};
