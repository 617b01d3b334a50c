//! Append-only participant roster keyed by id.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{Participant, ParticipantId};

/// Ordered, deduplicated collection of participants.
///
/// Entries are shared through `Arc` so teams can reference roster members
/// without copying or owning them.
#[derive(Debug, Default)]
pub struct Roster {
    participants: Vec<Arc<Participant>>,
    ids: HashSet<ParticipantId>,
}

impl Roster {
    /// Append a participant, rejecting an id that is already present.
    pub fn insert(&mut self, participant: Participant) -> Result<Arc<Participant>> {
        if self.ids.contains(participant.id()) {
            return Err(Error::DuplicateId {
                id: participant.id().to_string(),
            });
        }

        self.ids.insert(participant.id().clone());
        let participant = Arc::new(participant);
        self.participants.push(Arc::clone(&participant));
        Ok(participant)
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Participants in registration order, detached from later inserts.
    pub fn snapshot(&self) -> Vec<Arc<Participant>> {
        self.participants.clone()
    }
}
