//! Snake-draft team partitioning.
//!
//! Participants are ranked by skill (descending, stable) and dealt into
//! `ceil(N / team_size)` teams in rounds that alternate direction:
//! slots `0..T` on even rounds, `T..0` on odd rounds. Cumulative team
//! totals therefore never drift apart by more than one participant's skill.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::Participant;

/// Smallest team size accepted by [`partition`]
pub const MIN_TEAM_SIZE: usize = 2;
/// Largest team size accepted by [`partition`]
pub const MAX_TEAM_SIZE: usize = 100;

/// One team of a partition result.
#[derive(Debug, Clone)]
pub struct Team {
    name: String,
    members: Vec<Arc<Participant>>,
}

impl Team {
    pub fn new(name: impl Into<String>, members: Vec<Arc<Participant>>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Members in assignment order.
    pub fn members(&self) -> &[Arc<Participant>] {
        &self.members
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn total_skill(&self) -> u32 {
        self.members.iter().map(|p| p.skill_rating() as u32).sum()
    }
}

/// Team slot for the participant at `position` in the ranked order.
fn snake_slot(position: usize, team_count: usize) -> usize {
    let round = position / team_count;
    let offset = position % team_count;
    if round % 2 == 0 {
        offset
    } else {
        team_count - 1 - offset
    }
}

/// Split a roster snapshot into skill-balanced teams of at most `team_size`.
///
/// Team sizes differ by at most one and every participant lands in exactly
/// one team. Ties in skill keep roster order, so identical input always
/// yields identical teams.
pub fn partition(roster: &[Arc<Participant>], team_size: usize) -> Result<Vec<Team>> {
    if !(MIN_TEAM_SIZE..=MAX_TEAM_SIZE).contains(&team_size) {
        return Err(Error::InvalidTeamSize {
            size: team_size,
            min: MIN_TEAM_SIZE,
            max: MAX_TEAM_SIZE,
        });
    }
    if roster.is_empty() {
        return Err(Error::EmptyRoster);
    }

    let team_count = roster.len().div_ceil(team_size);

    // sort_by is stable
    let mut ranked: Vec<&Arc<Participant>> = roster.iter().collect();
    ranked.sort_by(|a, b| b.skill_rating().cmp(&a.skill_rating()));

    let per_team = roster.len().div_ceil(team_count);
    let mut slots: Vec<Vec<Arc<Participant>>> =
        (0..team_count).map(|_| Vec::with_capacity(per_team)).collect();

    for (position, participant) in ranked.into_iter().enumerate() {
        slots[snake_slot(position, team_count)].push(Arc::clone(participant));
    }

    Ok(slots
        .into_iter()
        .enumerate()
        .map(|(index, members)| Team::new(format!("Team {}", index + 1), members))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::error::ErrorCode;
    use crate::types::{Game, Role};

    fn roster_with_skills(skills: &[i64]) -> Vec<Arc<Participant>> {
        skills
            .iter()
            .enumerate()
            .map(|(i, &skill)| {
                Arc::new(
                    Participant::new(
                        format!("P{:03}", i + 1).parse().unwrap(),
                        &format!("Player {}", i + 1),
                        Game::all()[i % Game::all().len()],
                        Role::all()[i % Role::all().len()],
                        skill,
                        5 + (i as i64 % 21),
                    )
                    .unwrap(),
                )
            })
            .collect()
    }

    fn skills_of(team: &Team) -> Vec<u8> {
        team.members().iter().map(|p| p.skill_rating()).collect()
    }

    #[test]
    fn test_documented_snake_scenario() {
        let roster = roster_with_skills(&[10, 9, 8, 7, 6, 5, 4]);
        let teams = partition(&roster, 3).unwrap();

        assert_eq!(teams.len(), 3);
        assert_eq!(skills_of(&teams[0]), [10, 5, 4]);
        assert_eq!(skills_of(&teams[1]), [9, 6]);
        assert_eq!(skills_of(&teams[2]), [8, 7]);

        let totals: Vec<u32> = teams.iter().map(Team::total_skill).collect();
        assert_eq!(totals, [19, 15, 15]);
    }

    #[test]
    fn test_team_names() {
        let roster = roster_with_skills(&[5, 5, 5, 5, 5]);
        let teams = partition(&roster, 2).unwrap();
        let names: Vec<&str> = teams.iter().map(Team::name).collect();
        assert_eq!(names, ["Team 1", "Team 2", "Team 3"]);
    }

    #[test]
    fn test_counts_and_spread() {
        for n in 1..=40 {
            let skills: Vec<i64> = (0..n).map(|i| 1 + (i * 7 % 10)).collect();
            let roster = roster_with_skills(&skills);
            for team_size in MIN_TEAM_SIZE..=12 {
                let teams = partition(&roster, team_size).unwrap();

                assert_eq!(teams.len(), (n as usize).div_ceil(team_size), "n={} size={}", n, team_size);
                assert_eq!(teams.iter().map(Team::size).sum::<usize>(), n as usize);

                let max = teams.iter().map(Team::size).max().unwrap();
                let min = teams.iter().map(Team::size).min().unwrap();
                assert!(max - min <= 1, "n={} size={} spread {}", n, team_size, max - min);
                assert!(max <= team_size);
            }
        }
    }

    #[test]
    fn test_every_participant_exactly_once() {
        let skills: Vec<i64> = (0..23).map(|i| 1 + (i * 3 % 10)).collect();
        let roster = roster_with_skills(&skills);
        let teams = partition(&roster, 4).unwrap();

        let mut seen: HashMap<String, usize> = HashMap::new();
        for team in &teams {
            for member in team.members() {
                *seen.entry(member.id().to_string()).or_default() += 1;
            }
        }

        assert_eq!(seen.len(), roster.len());
        assert!(seen.values().all(|&count| count == 1));
        for participant in &roster {
            assert!(seen.contains_key(participant.id().as_str()));
        }
    }

    #[test]
    fn test_balance_with_distinct_skills() {
        let all: Vec<i64> = (1..=10).rev().collect();
        for n in 2..=10 {
            let roster = roster_with_skills(&all[..n]);
            let largest = roster.iter().map(|p| p.skill_rating() as u32).max().unwrap();
            for team_size in MIN_TEAM_SIZE..=n.max(MIN_TEAM_SIZE) {
                let teams = partition(&roster, team_size).unwrap();
                let totals: Vec<u32> = teams.iter().map(Team::total_skill).collect();
                let spread = totals.iter().max().unwrap() - totals.iter().min().unwrap();
                assert!(spread <= largest, "n={} size={} totals {:?}", n, team_size, totals);
            }
        }
    }

    #[test]
    fn test_ties_keep_roster_order() {
        let roster = roster_with_skills(&[5, 8, 5, 8, 5, 5]);
        let first = partition(&roster, 2).unwrap();
        let second = partition(&roster, 2).unwrap();

        let ids = |teams: &[Team]| -> Vec<Vec<String>> {
            teams
                .iter()
                .map(|t| t.members().iter().map(|p| p.id().to_string()).collect())
                .collect()
        };
        assert_eq!(ids(&first), ids(&second));
        // ranked: P002, P004 (8s), then P001, P003, P005, P006 (5s)
        assert_eq!(
            ids(&first),
            vec![
                vec!["P002".to_string(), "P006".to_string()],
                vec!["P004".to_string(), "P005".to_string()],
                vec!["P001".to_string(), "P003".to_string()],
            ]
        );
    }

    #[test]
    fn test_single_participant() {
        let roster = roster_with_skills(&[6]);
        let teams = partition(&roster, 5).unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].size(), 1);
    }

    #[test]
    fn test_invalid_team_size() {
        let roster = roster_with_skills(&[6, 7, 8]);
        for size in [0, 1, 101, 1000] {
            let err = partition(&roster, size).unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidTeamSize, "size {}", size);
        }
        assert!(partition(&roster, MAX_TEAM_SIZE).is_ok());
    }

    #[test]
    fn test_empty_roster() {
        let err = partition(&[], 3).unwrap_err();
        assert_eq!(err.code(), ErrorCode::EmptyRoster);
    }

    #[test]
    fn test_members_share_roster_entries() {
        let roster = roster_with_skills(&[3, 4]);
        let teams = partition(&roster, 2).unwrap();
        assert!(Arc::ptr_eq(&teams[0].members()[0], &roster[1]));
    }
}
