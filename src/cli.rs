//! CLI argument parsing using clap v4

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// TeamMate - balanced team formation for community gaming events
///
/// Loads participant rosters, classifies each participant's personality from
/// a five-question survey, and splits the roster into skill-balanced teams.
#[derive(Parser, Debug)]
#[command(name = "teammate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, env = "TEAMMATE_CONFIG", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load rosters and form skill-balanced teams
    Form {
        /// Roster file to load (repeatable, appended in order; defaults to files.roster)
        #[arg(short, long)]
        roster: Vec<PathBuf>,

        /// Members per team (defaults to teams.default_team_size)
        #[arg(short, long)]
        team_size: Option<usize>,

        /// Team file to write (defaults to files.output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not write the team file
        #[arg(long)]
        no_save: bool,

        /// List members under each team
        #[arg(long)]
        show_members: bool,

        /// Print teams as JSON
        #[arg(long, conflicts_with = "show_members")]
        json: bool,
    },

    /// Register a new participant and append it to a roster file
    Register {
        /// Roster file to check for duplicates and append to (defaults to files.roster)
        #[arg(short, long)]
        roster: Option<PathBuf>,

        /// Numeric participant id; stored as P<id>
        #[arg(long)]
        id: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// Contact email
        #[arg(long)]
        email: Option<String>,

        /// Preferred game: 1-6 or a name (Chess, FIFA, Basketball, CS:GO, DOTA 2, Valorant)
        #[arg(long)]
        game: String,

        /// Preferred role: 1-5 or a name (Attacker, Defender, Strategist, Supporter, Coordinator)
        #[arg(long)]
        role: String,

        /// Skill rating, 1-10
        #[arg(long, allow_negative_numbers = true)]
        skill: i64,

        /// Five survey answers, each 1-5, comma separated
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        answers: Vec<u8>,
    },

    /// List loaded participants
    Participants {
        /// Roster file to load (repeatable; defaults to files.roster)
        #[arg(short, long)]
        roster: Vec<PathBuf>,
    },

    /// Show a saved team file
    Teams {
        /// Team file to read (defaults to files.output)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Show the personality type for a survey total (5-25)
    Classify {
        #[arg(allow_negative_numbers = true)]
        total: i64,
    },

    /// Display version and build information
    Version,

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the effective configuration
    Show,

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the configuration
    Validate,
}
