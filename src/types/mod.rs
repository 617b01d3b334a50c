//! Type definitions for TeamMate
//!
//! Participant records, their field invariants, and personality
//! classification.

mod participant;
mod personality;

pub use participant::*;
pub use personality::*;
