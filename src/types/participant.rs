//! Participant records and their field invariants.
//!
//! Every participant, whether ingested from a roster file or registered
//! interactively, is built through [`Participant::new`], so skill and survey
//! ranges hold regardless of where the record came from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::personality::PersonalityType;
use crate::error::{Error, Result};

/// Lowest accepted skill rating
pub const MIN_SKILL: u8 = 1;
/// Highest accepted skill rating
pub const MAX_SKILL: u8 = 10;

/// Number of questions in the personality survey
pub const SURVEY_QUESTIONS: usize = 5;
/// Lowest answer to a single survey question
pub const MIN_ANSWER: u8 = 1;
/// Highest answer to a single survey question
pub const MAX_ANSWER: u8 = 5;
/// Lowest possible survey total
pub const MIN_SURVEY_TOTAL: u8 = MIN_ANSWER * SURVEY_QUESTIONS as u8;
/// Highest possible survey total
pub const MAX_SURVEY_TOTAL: u8 = MAX_ANSWER * SURVEY_QUESTIONS as u8;

// ─────────────────────────────────────────────────────────────────
// Participant ID
// ─────────────────────────────────────────────────────────────────

/// Participant identifier of the form `P` followed by digits (e.g. `P034`).
///
/// The prefix is normalized to uppercase so ids compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Build an id from the numeric part typed at registration.
    pub fn from_number(digits: &str) -> Result<Self> {
        let digits = digits.trim();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::invalid_participant(
                "id",
                format!("'{}' is not a number", digits),
            ));
        }
        Ok(Self(format!("P{}", digits)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ParticipantId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.strip_prefix(['P', 'p']) {
            Some(digits) if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => {
                Ok(Self(format!("P{}", digits)))
            }
            _ => Err(Error::invalid_participant(
                "id",
                format!("'{}' must be 'P' followed by digits", s),
            )),
        }
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ParticipantId> for String {
    fn from(id: ParticipantId) -> Self {
        id.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────
// Game / Role
// ─────────────────────────────────────────────────────────────────

/// Lowercase and drop separators so "CS:GO", "csgo" and "Dota 2" all match.
fn normalize_label(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Preferred game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Game {
    Chess,
    Fifa,
    Basketball,
    CsGo,
    Dota2,
    Valorant,
}

impl Game {
    /// All games in menu order.
    pub fn all() -> &'static [Game] {
        &[
            Game::Chess,
            Game::Fifa,
            Game::Basketball,
            Game::CsGo,
            Game::Dota2,
            Game::Valorant,
        ]
    }

    /// Label written to roster and team files.
    pub fn label(&self) -> &'static str {
        match self {
            Game::Chess => "Chess",
            Game::Fifa => "FIFA",
            Game::Basketball => "Basketball",
            Game::CsGo => "CS:GO",
            Game::Dota2 => "DOTA 2",
            Game::Valorant => "Valorant",
        }
    }

    /// Resolve a 1-based menu choice.
    pub fn from_choice(choice: u8) -> Result<Self> {
        choice
            .checked_sub(1)
            .and_then(|index| Self::all().get(usize::from(index)))
            .copied()
            .ok_or_else(|| {
                Error::invalid_participant("game", format!("choice {} is not between 1 and 6", choice))
            })
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Game {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize_label(s);
        Self::all()
            .iter()
            .find(|g| normalize_label(g.label()) == wanted)
            .copied()
            .ok_or_else(|| Error::invalid_participant("game", format!("unknown game '{}'", s.trim())))
    }
}

/// Preferred in-team role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Attacker,
    Defender,
    Strategist,
    Supporter,
    Coordinator,
}

impl Role {
    /// All roles in menu order.
    pub fn all() -> &'static [Role] {
        &[
            Role::Attacker,
            Role::Defender,
            Role::Strategist,
            Role::Supporter,
            Role::Coordinator,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Attacker => "Attacker",
            Role::Defender => "Defender",
            Role::Strategist => "Strategist",
            Role::Supporter => "Supporter",
            Role::Coordinator => "Coordinator",
        }
    }

    /// Resolve a 1-based menu choice.
    pub fn from_choice(choice: u8) -> Result<Self> {
        choice
            .checked_sub(1)
            .and_then(|index| Self::all().get(usize::from(index)))
            .copied()
            .ok_or_else(|| {
                Error::invalid_participant("role", format!("choice {} is not between 1 and 5", choice))
            })
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize_label(s);
        Self::all()
            .iter()
            .find(|r| normalize_label(r.label()) == wanted)
            .copied()
            .ok_or_else(|| Error::invalid_participant("role", format!("unknown role '{}'", s.trim())))
    }
}

// ─────────────────────────────────────────────────────────────────
// Field validation
// ─────────────────────────────────────────────────────────────────

/// Check a skill rating against `[1, 10]`.
pub fn validate_skill(skill: i64) -> Result<u8> {
    if (MIN_SKILL as i64..=MAX_SKILL as i64).contains(&skill) {
        Ok(skill as u8)
    } else {
        Err(Error::invalid_participant(
            "skill",
            format!("{} is not between {} and {}", skill, MIN_SKILL, MAX_SKILL),
        ))
    }
}

/// Check a survey total against `[5, 25]`.
pub fn validate_survey_total(total: i64) -> Result<u8> {
    if (MIN_SURVEY_TOTAL as i64..=MAX_SURVEY_TOTAL as i64).contains(&total) {
        Ok(total as u8)
    } else {
        Err(Error::SurveyTotalOutOfRange {
            total,
            min: MIN_SURVEY_TOTAL,
            max: MAX_SURVEY_TOTAL,
        })
    }
}

/// Sum exactly five survey answers, each in `[1, 5]`.
pub fn survey_total(answers: &[u8]) -> Result<u8> {
    if answers.len() != SURVEY_QUESTIONS {
        return Err(Error::invalid_participant(
            "survey",
            format!("expected {} answers, got {}", SURVEY_QUESTIONS, answers.len()),
        ));
    }
    if let Some((question, answer)) = answers
        .iter()
        .enumerate()
        .find(|(_, a)| !(MIN_ANSWER..=MAX_ANSWER).contains(*a))
    {
        return Err(Error::invalid_participant(
            "survey",
            format!(
                "answer {} to question {} is not between {} and {}",
                answer,
                question + 1,
                MIN_ANSWER,
                MAX_ANSWER
            ),
        ));
    }
    Ok(answers.iter().sum())
}

// ─────────────────────────────────────────────────────────────────
// Participant
// ─────────────────────────────────────────────────────────────────

/// A registered event participant.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    id: ParticipantId,
    name: String,
    email: Option<String>,
    game: Game,
    role: Role,
    skill_rating: u8,
    survey_total: u8,
    personality_type: PersonalityType,
}

impl Participant {
    /// Build an unclassified participant, enforcing every field invariant.
    pub fn new(
        id: ParticipantId,
        name: &str,
        game: Game,
        role: Role,
        skill_rating: i64,
        survey_total: i64,
    ) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::invalid_participant("name", "must not be empty"));
        }
        // Both file formats are plain comma-separated lines.
        if name.contains([',', '\n', '\r']) {
            return Err(Error::invalid_participant(
                "name",
                "must not contain commas or line breaks",
            ));
        }

        Ok(Self {
            id,
            name: name.to_string(),
            email: None,
            game,
            role,
            skill_rating: validate_skill(skill_rating)?,
            survey_total: validate_survey_total(survey_total)?,
            personality_type: PersonalityType::Unknown,
        })
    }

    /// Attach a contact email (carried through files, unused for team formation).
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        let email = email.into();
        let email = email.trim();
        self.email = (!email.is_empty()).then(|| email.to_string());
        self
    }

    /// Adopt a personality type recorded alongside an ingested row.
    ///
    /// `Unknown` leaves the participant unclassified so the classifier
    /// derives the type from the survey total instead.
    pub fn with_recorded_type(mut self, personality: PersonalityType) -> Self {
        if !self.is_classified() {
            self.personality_type = personality;
        }
        self
    }

    pub fn id(&self) -> &ParticipantId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn game(&self) -> Game {
        self.game
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn skill_rating(&self) -> u8 {
        self.skill_rating
    }

    pub fn survey_total(&self) -> u8 {
        self.survey_total
    }

    pub fn personality_type(&self) -> PersonalityType {
        self.personality_type
    }

    pub fn is_classified(&self) -> bool {
        self.personality_type != PersonalityType::Unknown
    }

    /// Only the classifier sets the type, and only once.
    pub(crate) fn set_personality_type(&mut self, personality: PersonalityType) -> Result<()> {
        if self.is_classified() {
            return Err(Error::AlreadyClassified {
                id: self.id.to_string(),
                personality: self.personality_type.to_string(),
            });
        }
        self.personality_type = personality;
        Ok(())
    }
}

/// One-line description used by participant listings.
pub fn summary(participant: &Participant) -> String {
    format!(
        "{} | {} | Game={} | Role={} | Skill={} | Score={} | Type={}",
        participant.id,
        participant.name,
        participant.game,
        participant.role,
        participant.skill_rating,
        participant.survey_total,
        participant.personality_type
    )
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&summary(self))
    }
}
