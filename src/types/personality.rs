//! Personality classification from survey totals.
//!
//! A survey total in `[5, 25]` falls into one of four contiguous buckets.
//! The bucket upper bounds come from [`Thresholds`], which defaults to the
//! quartiles 5–10, 11–15, 16–20, 21–25 and can be overridden in config.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::participant::{validate_survey_total, Participant, MAX_SURVEY_TOTAL, MIN_SURVEY_TOTAL};
use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────
// Personality Type
// ─────────────────────────────────────────────────────────────────

/// Categorical personality type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersonalityType {
    TypeA,
    TypeB,
    TypeC,
    TypeD,
    /// Not yet classified
    Unknown,
}

impl PersonalityType {
    /// Label used in files and console output.
    pub fn label(&self) -> &'static str {
        match self {
            PersonalityType::TypeA => "TYPE_A",
            PersonalityType::TypeB => "TYPE_B",
            PersonalityType::TypeC => "TYPE_C",
            PersonalityType::TypeD => "TYPE_D",
            PersonalityType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for PersonalityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PersonalityType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TYPE_A" => Ok(PersonalityType::TypeA),
            "TYPE_B" => Ok(PersonalityType::TypeB),
            "TYPE_C" => Ok(PersonalityType::TypeC),
            "TYPE_D" => Ok(PersonalityType::TypeD),
            "UNKNOWN" => Ok(PersonalityType::Unknown),
            _ => Err(format!(
                "Unknown personality type '{}'. Valid: TYPE_A, TYPE_B, TYPE_C, TYPE_D, UNKNOWN",
                s.trim()
            )),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Thresholds
// ─────────────────────────────────────────────────────────────────

/// Inclusive upper bounds of the first three buckets; TYPE_D runs to 25.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub type_a_max: u8,
    pub type_b_max: u8,
    pub type_c_max: u8,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            type_a_max: 10,
            type_b_max: 15,
            type_c_max: 20,
        }
    }
}

impl Thresholds {
    /// Every bucket must be non-empty and the four together must cover `[5, 25]`.
    pub fn validate(&self) -> Result<()> {
        let bounds = [
            MIN_SURVEY_TOTAL - 1,
            self.type_a_max,
            self.type_b_max,
            self.type_c_max,
            MAX_SURVEY_TOTAL,
        ];
        if bounds.windows(2).all(|pair| pair[0] < pair[1]) {
            Ok(())
        } else {
            Err(Error::config_field_invalid(
                "personality",
                format!(
                    "thresholds must satisfy {} <= type_a_max < type_b_max < type_c_max < {} (got {}, {}, {})",
                    MIN_SURVEY_TOTAL,
                    MAX_SURVEY_TOTAL,
                    self.type_a_max,
                    self.type_b_max,
                    self.type_c_max
                ),
            ))
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Classifier
// ─────────────────────────────────────────────────────────────────

/// Stateless mapping from survey total to [`PersonalityType`].
#[derive(Debug, Clone, Default)]
pub struct PersonalityClassifier {
    thresholds: Thresholds,
}

impl PersonalityClassifier {
    /// Create a classifier, rejecting thresholds that leave gaps or empty buckets.
    pub fn new(thresholds: Thresholds) -> Result<Self> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    /// Classify a raw survey total.
    pub fn classify(&self, total: i64) -> Result<PersonalityType> {
        let total = validate_survey_total(total)?;
        let t = &self.thresholds;

        Ok(if total <= t.type_a_max {
            PersonalityType::TypeA
        } else if total <= t.type_b_max {
            PersonalityType::TypeB
        } else if total <= t.type_c_max {
            PersonalityType::TypeC
        } else {
            PersonalityType::TypeD
        })
    }

    /// Set a participant's type from its survey total.
    ///
    /// Fails with `AlreadyClassified` if the participant already has a type.
    pub fn classify_participant(&self, participant: &mut Participant) -> Result<PersonalityType> {
        let personality = self.classify(participant.survey_total() as i64)?;
        participant.set_personality_type(personality)?;
        Ok(personality)
    }
}
