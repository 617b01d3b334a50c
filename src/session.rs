//! Session state: the roster and the latest formed teams.
//!
//! Classification of a batch runs as a bounded group of tokio tasks that is
//! fully awaited before any participant joins the roster. Team formation
//! holds the write lock for the whole partition, so no load, registration
//! or second formation can interleave with it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::team::{partition, Roster, Team};
use crate::types::{Participant, PersonalityClassifier};

// ─────────────────────────────────────────────────────────────────
// State
// ─────────────────────────────────────────────────────────────────

/// Result of one team formation run
#[derive(Debug, Clone)]
pub struct Formation {
    pub teams: Vec<Team>,
    pub team_size: usize,
    pub formed_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct SessionState {
    roster: Roster,
    formation: Option<Formation>,
}

/// Outcome of loading a batch of participants
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Participants appended to the roster
    pub added: usize,
    /// Participants classified during the load (the rest carried a recorded type)
    pub classified: usize,
    /// Ids skipped because they were already present
    pub duplicates: Vec<String>,
}

// ─────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────

/// Owns the roster and latest formation for one run of the tool
pub struct Session {
    state: RwLock<SessionState>,
    classifier: Arc<PersonalityClassifier>,
    max_parallel: usize,
}

impl Session {
    /// Create an empty session; `max_parallel` bounds concurrent classification tasks.
    pub fn new(classifier: PersonalityClassifier, max_parallel: usize) -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            classifier: Arc::new(classifier),
            max_parallel: max_parallel.max(1),
        }
    }

    /// Classify every unclassified participant, preserving input order.
    async fn classify_batch(&self, participants: Vec<Participant>) -> Result<(Vec<Participant>, usize)> {
        let total = participants.len();
        let semaphore = Arc::new(Semaphore::new(self.max_parallel));
        let mut tasks = JoinSet::new();
        let mut slots: Vec<Option<Participant>> = Vec::with_capacity(total);
        let mut classified = 0;

        for (index, participant) in participants.into_iter().enumerate() {
            if participant.is_classified() {
                slots.push(Some(participant));
                continue;
            }
            slots.push(None);

            let classifier = Arc::clone(&self.classifier);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| Error::Internal(format!("Classification semaphore closed: {}", e)))?;
                let mut participant = participant;
                classifier.classify_participant(&mut participant)?;
                Ok::<_, Error>((index, participant))
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (index, participant) = joined
                .map_err(|e| Error::Internal(format!("Classification task failed: {}", e)))??;
            debug!(
                id = %participant.id(),
                personality = %participant.personality_type(),
                "Participant classified"
            );
            slots[index] = Some(participant);
            classified += 1;
        }

        let participants: Vec<Participant> = slots.into_iter().flatten().collect();
        debug_assert_eq!(participants.len(), total);
        Ok((participants, classified))
    }

    /// Append a batch from a roster file. Duplicate ids are skipped and reported.
    pub async fn load_participants(&self, participants: Vec<Participant>) -> Result<LoadReport> {
        let (participants, classified) = self.classify_batch(participants).await?;

        let mut report = LoadReport {
            classified,
            ..LoadReport::default()
        };
        let mut state = self.state.write();
        for participant in participants {
            match state.roster.insert(participant) {
                Ok(_) => report.added += 1,
                Err(Error::DuplicateId { id }) => {
                    warn!(id = %id, "Skipping participant with duplicate ID");
                    report.duplicates.push(id);
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            added = report.added,
            classified = report.classified,
            duplicates = report.duplicates.len(),
            total = state.roster.len(),
            "Participants loaded"
        );
        Ok(report)
    }

    /// Classify and append a single newly registered participant.
    pub async fn register(&self, participant: Participant) -> Result<Arc<Participant>> {
        if self.state.read().roster.contains(participant.id()) {
            return Err(Error::DuplicateId {
                id: participant.id().to_string(),
            });
        }

        let classifier = Arc::clone(&self.classifier);
        let participant = tokio::spawn(async move {
            let mut participant = participant;
            classifier.classify_participant(&mut participant)?;
            Ok::<_, Error>(participant)
        })
        .await
        .map_err(|e| Error::Internal(format!("Classification task failed: {}", e)))??;

        let registered = self.state.write().roster.insert(participant)?;
        info!(
            id = %registered.id(),
            personality = %registered.personality_type(),
            "Participant registered"
        );
        Ok(registered)
    }

    /// Partition the current roster, replacing any previous formation.
    pub async fn form_teams(self: &Arc<Self>, team_size: usize) -> Result<Formation> {
        let session = Arc::clone(self);
        tokio::task::spawn_blocking(move || session.form_teams_locked(team_size))
            .await
            .map_err(|e| Error::Internal(format!("Team formation task failed: {}", e)))?
    }

    fn form_teams_locked(&self, team_size: usize) -> Result<Formation> {
        let mut state = self.state.write();
        let snapshot = state.roster.snapshot();
        let teams = partition(&snapshot, team_size)?;

        info!(
            participants = snapshot.len(),
            team_size,
            teams = teams.len(),
            "Teams formed"
        );

        let formation = Formation {
            teams,
            team_size,
            formed_at: Utc::now(),
        };
        state.formation = Some(formation.clone());
        Ok(formation)
    }

    /// Roster membership in registration order
    pub fn roster_snapshot(&self) -> Vec<Arc<Participant>> {
        self.state.read().roster.snapshot()
    }

    /// Number of participants on the roster
    pub fn participant_count(&self) -> usize {
        self.state.read().roster.len()
    }

}
