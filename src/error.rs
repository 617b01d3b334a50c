//! Error types for TeamMate
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - Exit codes for CLI

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for TeamMate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoPermission = 202,
    IoNotFound = 203,

    // Roster / team file format errors (3xx)
    RosterFileEmpty = 300,
    RosterHeaderMismatch = 301,
    TeamFileMalformed = 302,

    // Participant validation errors (4xx)
    InvalidParticipant = 400,
    DuplicateId = 401,

    // Classification errors (5xx)
    SurveyTotalOutOfRange = 500,
    AlreadyClassified = 501,

    // Team formation errors (6xx)
    InvalidTeamSize = 600,
    EmptyRoster = 601,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10, // Config errors
            200..=299 => 20, // IO errors
            300..=399 => 30, // File format errors
            400..=499 => 40, // Participant errors
            500..=599 => 50, // Classification errors
            600..=699 => 60, // Team formation errors
            900..=999 => 90, // Internal errors
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // File Format Errors
    // ─────────────────────────────────────────────────────────────

    /// Roster file has no header line
    #[error("Roster file is empty: {path}")]
    RosterFileEmpty { path: PathBuf },

    /// Roster header does not match the expected columns
    #[error("Roster file {path}: column {column} should be '{expected}' but found '{found}'")]
    RosterHeaderMismatch {
        path: PathBuf,
        column: usize,
        expected: &'static str,
        found: String,
    },

    /// Team file row could not be parsed
    #[error("Team file {path}, line {line}: {message}")]
    TeamFileMalformed {
        path: PathBuf,
        line: usize,
        message: String,
    },

    // ─────────────────────────────────────────────────────────────
    // Participant Errors
    // ─────────────────────────────────────────────────────────────

    /// A participant field violates its invariant
    #[error("Invalid participant {field}: {message}")]
    InvalidParticipant { field: &'static str, message: String },

    /// Participant id already present in the roster
    #[error("Participant ID already exists: {id}")]
    DuplicateId { id: String },

    // ─────────────────────────────────────────────────────────────
    // Classification Errors
    // ─────────────────────────────────────────────────────────────

    /// Survey total outside the classifiable range
    #[error("Personality survey total {total} is outside the range {min}-{max}")]
    SurveyTotalOutOfRange { total: i64, min: u8, max: u8 },

    /// Participant already carries a personality type
    #[error("Participant {id} is already classified as {personality}")]
    AlreadyClassified { id: String, personality: String },

    // ─────────────────────────────────────────────────────────────
    // Team Formation Errors
    // ─────────────────────────────────────────────────────────────

    /// Requested team size outside the supported range
    #[error("Team size {size} is outside the range {min}-{max}")]
    InvalidTeamSize { size: usize, min: usize, max: usize },

    /// Partition requested with no participants
    #[error("Cannot form teams from an empty roster")]
    EmptyRoster,

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::Config(_) => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,
            Error::Json(_) => ErrorCode::InternalError,

            Error::RosterFileEmpty { .. } => ErrorCode::RosterFileEmpty,
            Error::RosterHeaderMismatch { .. } => ErrorCode::RosterHeaderMismatch,
            Error::TeamFileMalformed { .. } => ErrorCode::TeamFileMalformed,

            Error::InvalidParticipant { .. } => ErrorCode::InvalidParticipant,
            Error::DuplicateId { .. } => ErrorCode::DuplicateId,

            Error::SurveyTotalOutOfRange { .. } => ErrorCode::SurveyTotalOutOfRange,
            Error::AlreadyClassified { .. } => ErrorCode::AlreadyClassified,

            Error::InvalidTeamSize { .. } => ErrorCode::InvalidTeamSize,
            Error::EmptyRoster => ErrorCode::EmptyRoster,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => {
                Some("Run 'teammate config init' to create a default configuration file.")
            }
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'teammate config validate' to see details.",
            ),
            Error::ConfigValidation { .. } => {
                Some("Review the configuration file and fix the invalid values.")
            }

            Error::RosterFileEmpty { .. } | Error::RosterHeaderMismatch { .. } => Some(
                "The first line must be: ID,Name,Email,PreferredGame,SkillLevel,PreferredRole,PersonalityScore,PersonalityType",
            ),
            Error::TeamFileMalformed { .. } => {
                Some("Team files must start with: TeamName,ID,Name,Game,Role,Skill,Personality")
            }

            Error::DuplicateId { .. } => Some("Choose a participant ID number that is not in use."),
            Error::SurveyTotalOutOfRange { .. } => {
                Some("Each of the 5 survey answers must be between 1 and 5.")
            }

            Error::InvalidTeamSize { .. } => Some("Pass a --team-size between 2 and 100."),
            Error::EmptyRoster => Some(
                "Load participants first with --roster, or register them with 'teammate register'.",
            ),

            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let mut output = format!("\x1b[31mError [{}]\x1b[0m: {}\n", self.code().as_str(), self);

        if let Some(hint) = self.suggestion() {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.code().as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Error::ConfigNotFound { path: path.into() }
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a participant invariant error
    pub fn invalid_participant(field: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidParticipant {
            field,
            message: message.into(),
        }
    }
}
