//! Configuration for TeamMate
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (TEAMMATE_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::team::{MAX_TEAM_SIZE, MIN_TEAM_SIZE};
use crate::types::Thresholds;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamMateConfig {
    /// Team formation defaults
    pub teams: TeamSettings,

    /// Survey total cut points
    pub personality: Thresholds,

    /// Batch classification settings
    pub classification: ClassificationSettings,

    /// Default file locations
    pub files: FileSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Team formation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamSettings {
    /// Team size used when `--team-size` is not given
    pub default_team_size: usize,
}

/// Classification settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationSettings {
    /// Maximum concurrent classification tasks (0 = number of CPUs)
    pub max_parallel: usize,
}

/// File location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    /// Roster loaded when no `--roster` is given
    pub roster: String,

    /// Team file written after formation
    pub output: String,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Maximum log file size in MB before rotation
    pub max_file_size_mb: u64,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

impl Default for TeamSettings {
    fn default() -> Self {
        Self {
            default_team_size: 5,
        }
    }
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            roster: "participants_sample.csv".to_string(),
            output: "formed_teams.csv".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

impl TeamMateConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = match Self::find_config_file(config_path)? {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.expand_paths();
        config.validate()?;

        Ok(config)
    }

    /// Parse a single file without overrides or validation
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading configuration file");
        let content = fs::read_to_string(path).map_err(|source| Error::IoRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|e| Error::ConfigParse {
            message: format!("{}: {}", path.display(), e),
            source: Some(e),
        })?;
        info!(path = %path.display(), "Configuration loaded from file");
        Ok(config)
    }

    /// Find the configuration file to use
    pub fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            return if path.exists() {
                Ok(Some(path))
            } else {
                Err(Error::config_not_found(path))
            };
        }

        let search_paths = [
            PathBuf::from("teammate.toml"),
            dirs::config_dir()
                .map(|p| p.join("teammate").join("config.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".teammate").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &search_paths {
            if !path.as_os_str().is_empty() && path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Some(n) = env_parse("TEAMMATE_TEAM_SIZE") {
            self.teams.default_team_size = n;
        }

        if let Some(n) = env_parse("TEAMMATE_TYPE_A_MAX") {
            self.personality.type_a_max = n;
        }
        if let Some(n) = env_parse("TEAMMATE_TYPE_B_MAX") {
            self.personality.type_b_max = n;
        }
        if let Some(n) = env_parse("TEAMMATE_TYPE_C_MAX") {
            self.personality.type_c_max = n;
        }

        if let Some(n) = env_parse("TEAMMATE_MAX_PARALLEL") {
            self.classification.max_parallel = n;
        }

        if let Ok(val) = std::env::var("TEAMMATE_ROSTER") {
            self.files.roster = val;
        }
        if let Ok(val) = std::env::var("TEAMMATE_OUTPUT") {
            self.files.output = val;
        }

        if let Ok(val) = std::env::var("TEAMMATE_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("TEAMMATE_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("TEAMMATE_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        self.files.roster = expand_path(&self.files.roster);
        self.files.output = expand_path(&self.files.output);

        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let size = self.teams.default_team_size;
        if !(MIN_TEAM_SIZE..=MAX_TEAM_SIZE).contains(&size) {
            return Err(Error::config_field_invalid(
                "teams.default_team_size",
                format!(
                    "default_team_size must be between {} and {}, got {}",
                    MIN_TEAM_SIZE, MAX_TEAM_SIZE, size
                ),
            ));
        }

        self.personality.validate()?;

        if self.files.roster.trim().is_empty() {
            return Err(Error::config_field_invalid("files.roster", "Roster path cannot be empty"));
        }
        if self.files.output.trim().is_empty() {
            return Err(Error::config_field_invalid("files.output", "Output path cannot be empty"));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// Personality thresholds for the classifier
    pub fn thresholds(&self) -> Thresholds {
        self.personality
    }

    /// Effective classification parallelism
    pub fn max_parallel(&self) -> usize {
        match self.classification.max_parallel {
            0 => num_cpus::get(),
            n => n,
        }
    }

    pub fn roster_path(&self) -> PathBuf {
        PathBuf::from(&self.files.roster)
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.files.output)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|val| val.parse().ok())
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or(std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Default location written by `config init`
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".teammate")
        .join("config.toml")
}

/// Initialize a new configuration file, returning where it was written
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(default_config_path);

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    let write_err = |source: std::io::Error| Error::IoWrite {
        path: config_path.clone(),
        source,
    };
    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(&config_path, generate_default_config()).map_err(write_err)?;

    info!(path = %config_path.display(), "Configuration file created");
    Ok(config_path)
}

/// Generate default configuration content with comments
pub fn generate_default_config() -> String {
    r#"# TeamMate Configuration

[teams]
# Team size used when --team-size is not given (2-100)
default_team_size = 5

[personality]
# Survey totals (5-25) up to and including each cut point map to that type;
# anything above type_c_max is TYPE_D
type_a_max = 10
type_b_max = 15
type_c_max = 20

[classification]
# Maximum concurrent classification tasks (0 = number of CPUs)
max_parallel = 0

[files]
# Roster read when no --roster is given
roster = "participants_sample.csv"

# Team file written after formation
output = "formed_teams.csv"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.teammate/logs/teammate.log"

# Maximum log file size in MB before rotation
max_file_size_mb = 100

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::env;

    #[test]
    fn test_default_config() {
        let config = TeamMateConfig::default();
        assert_eq!(config.teams.default_team_size, 5);
        assert_eq!(config.personality.type_b_max, 15);
        assert_eq!(config.files.output, "formed_teams.csv");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_env_override() {
        env::set_var("TEAMMATE_TEAM_SIZE", "4");
        env::set_var("TEAMMATE_MAX_PARALLEL", "3");
        env::set_var("TEAMMATE_TYPE_A_MAX", "9");
        env::set_var("TEAMMATE_LOG_LEVEL", "debug");

        let mut config = TeamMateConfig::default();
        config.apply_env_overrides();

        assert_eq!(config.teams.default_team_size, 4);
        assert_eq!(config.max_parallel(), 3);
        assert_eq!(config.personality.type_a_max, 9);
        assert_eq!(config.logging.level, "debug");

        env::remove_var("TEAMMATE_TEAM_SIZE");
        env::remove_var("TEAMMATE_MAX_PARALLEL");
        env::remove_var("TEAMMATE_TYPE_A_MAX");
        env::remove_var("TEAMMATE_LOG_LEVEL");
    }

    #[test]
    fn test_validation_team_size() {
        let mut config = TeamMateConfig::default();
        config.teams.default_team_size = 1;
        let err = config.validate().unwrap_err();
        assert_eq!(err.code(), ErrorCode::ConfigValidation);

        config.teams.default_team_size = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_thresholds() {
        let mut config = TeamMateConfig::default();
        config.personality.type_b_max = 22;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_log_level() {
        let mut config = TeamMateConfig::default();
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(TeamMateConfig::default().validate().is_ok());
    }

    #[test]
    fn test_max_parallel_auto() {
        let config = TeamMateConfig::default();
        assert!(config.max_parallel() >= 1);
    }

    #[test]
    fn test_path_expansion() {
        let mut config = TeamMateConfig::default();
        config.files.roster = "~/rosters/spring.csv".to_string();
        config.expand_paths();
        assert!(!config.files.roster.contains('~'));
    }

    #[test]
    fn test_explicit_path_missing() {
        let err = TeamMateConfig::find_config_file(Some("/nonexistent/teammate.toml")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_generated_default_parses() {
        let parsed: TeamMateConfig = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(parsed.teams.default_team_size, 5);
        assert_eq!(parsed.personality, Thresholds::default());
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_parse_config_file() {
        let config_str = r#"
[teams]
default_team_size = 3

[personality]
type_a_max = 8
type_b_max = 14
type_c_max = 19

[files]
roster = "spring.csv"
"#;

        let config: TeamMateConfig = toml::from_str(config_str).unwrap();

        assert_eq!(config.teams.default_team_size, 3);
        assert_eq!(config.personality.type_a_max, 8);
        assert_eq!(config.personality.type_c_max, 19);
        assert_eq!(config.files.roster, "spring.csv");
        assert_eq!(config.files.output, "formed_teams.csv");
        assert_eq!(config.classification.max_parallel, 0);
    }

    #[test]
    fn test_from_file_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[teams\ndefault_team_size = ").unwrap();
        let err = TeamMateConfig::from_file(&path).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ConfigParseError);
    }
}
