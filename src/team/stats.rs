//! Per-team reporting statistics.

use serde::Serialize;

use super::partition::Team;

/// Aggregate skill figures for one team
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TeamStats {
    pub member_count: usize,
    pub total_skill: u32,
    pub avg_skill: f64,
}

impl TeamStats {
    /// Stats from a member count and skill total. An empty team averages 0.0.
    pub fn new(member_count: usize, total_skill: u32) -> Self {
        let avg_skill = if member_count > 0 {
            total_skill as f64 / member_count as f64
        } else {
            0.0
        };

        Self {
            member_count,
            total_skill,
            avg_skill,
        }
    }

    /// Stats over individual skill ratings, e.g. rows read back from a team file.
    pub fn from_skills(skills: impl IntoIterator<Item = u8>) -> Self {
        let (count, total) = skills
            .into_iter()
            .fold((0usize, 0u32), |(count, total), skill| (count + 1, total + u32::from(skill)));
        Self::new(count, total)
    }
}

/// Compute total and average skill for a formed team.
pub fn stats(team: &Team) -> TeamStats {
    TeamStats::new(team.size(), team.total_skill())
}

/// Member row of a [`TeamReport`]
#[derive(Debug, Clone, Serialize)]
pub struct MemberReport {
    pub id: String,
    pub name: String,
    pub game: String,
    pub role: String,
    pub skill: u8,
    pub personality: String,
}

/// Serializable view of a team with its statistics, for `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct TeamReport {
    pub name: String,
    #[serde(flatten)]
    pub stats: TeamStats,
    pub members: Vec<MemberReport>,
}

impl TeamReport {
    pub fn from_team(team: &Team) -> Self {
        Self {
            name: team.name().to_string(),
            stats: stats(team),
            members: team
                .members()
                .iter()
                .map(|p| MemberReport {
                    id: p.id().to_string(),
                    name: p.name().to_string(),
                    game: p.game().to_string(),
                    role: p.role().to_string(),
                    skill: p.skill_rating(),
                    personality: p.personality_type().to_string(),
                })
                .collect(),
        }
    }
}
