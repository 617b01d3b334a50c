//! TeamMate - balanced team formation for community gaming events
//!
//! Entry point for the `teammate` binary.

mod cli;
mod config;
mod error;
mod files;
mod logging;
mod session;
mod team;
mod types;
mod version;

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, info, warn};

use crate::cli::{Cli, Commands, ConfigSubcommand};
use crate::config::TeamMateConfig;
use crate::error::{Error, Result};
use crate::session::Session;
use crate::team::{stats, TeamReport, TeamStats};
use crate::types::{survey_total, Game, Participant, ParticipantId, PersonalityClassifier, Role};

fn main() {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    match &cli.command {
        Commands::Version => {
            version::print_version();
            return;
        }
        Commands::Config { subcommand } => {
            if let Err(e) = logging::init_simple(tracing::Level::WARN)
                .and_then(|_| handle_config_command(subcommand.clone(), cli.config.as_deref()))
            {
                exit_with(e);
            }
            return;
        }
        _ => {}
    }

    let config = TeamMateConfig::load(cli.config.as_deref()).unwrap_or_else(|e| exit_with(e));

    // The guards must be kept alive for the lifetime of the program
    let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)
        .unwrap_or_else(|e| exit_with(e));

    let build = version::build_info();
    debug!(version = %build.full_version(), target = %build.target, "Starting TeamMate");

    if let Err(e) = run_command(cli.command, config) {
        exit_with(e);
    }
}

fn exit_with(e: Error) -> ! {
    debug!(error = %e.format_for_log(), "Command failed");
    eprint!("{}", e.format_for_terminal());
    std::process::exit(e.exit_code());
}

fn run_command(command: Commands, config: TeamMateConfig) -> Result<()> {
    let classifier = PersonalityClassifier::new(config.thresholds())?;

    // These need no session.
    match command {
        Commands::Classify { total } => {
            println!("{}", classifier.classify(total)?);
            return Ok(());
        }
        Commands::Teams { file } => {
            let path = file.unwrap_or_else(|| config.output_path());
            return show_team_file(&path);
        }
        _ => {}
    }

    let session = Arc::new(Session::new(classifier, config.max_parallel()));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(config.max_parallel().min(8))
        .thread_name("teammate")
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create async runtime: {}", e)))?;

    runtime.block_on(async move {
        match command {
            Commands::Form {
                roster,
                team_size,
                output,
                no_save,
                show_members,
                json,
            } => {
                let rosters = roster_paths(roster, &config);
                load_rosters(&session, &rosters).await?;

                let team_size = team_size.unwrap_or(config.teams.default_team_size);
                let output = (!no_save).then(|| output.unwrap_or_else(|| config.output_path()));
                form(&session, team_size, output.as_deref(), show_members, json).await
            }
            Commands::Register {
                roster,
                id,
                name,
                email,
                game,
                role,
                skill,
                answers,
            } => {
                let path = roster.unwrap_or_else(|| config.roster_path());
                let id = id.trim();
                let participant = Participant::new(
                    ParticipantId::from_number(id.strip_prefix(['P', 'p']).unwrap_or(id))?,
                    &name,
                    parse_choice(&game, Game::from_choice)?,
                    parse_choice(&role, Role::from_choice)?,
                    skill,
                    survey_total(&answers)? as i64,
                )?
                .with_email(email.unwrap_or_default());
                register(&session, &path, participant).await
            }
            Commands::Participants { roster } => {
                let rosters = roster_paths(roster, &config);
                load_rosters(&session, &rosters).await?;
                list_participants(&session);
                Ok(())
            }
            Commands::Classify { .. }
            | Commands::Teams { .. }
            | Commands::Version
            | Commands::Config { .. } => {
                Err(Error::Internal("Command handled before session setup".to_string()))
            }
        }
    })
}

fn roster_paths(explicit: Vec<PathBuf>, config: &TeamMateConfig) -> Vec<PathBuf> {
    if explicit.is_empty() {
        vec![config.roster_path()]
    } else {
        explicit
    }
}

/// Accept a 1-based menu number or a name.
fn parse_choice<T>(raw: &str, from_choice: fn(u8) -> Result<T>) -> Result<T>
where
    T: FromStr<Err = Error>,
{
    match raw.trim().parse::<u8>() {
        Ok(choice) => from_choice(choice),
        Err(_) => raw.parse(),
    }
}

/// Load roster files into the session in order.
async fn load_rosters(session: &Session, paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        files::verify_roster_file(path)?;
        let load = files::read_roster(path)?;
        for skipped in &load.skipped {
            debug!(path = %path.display(), line = skipped.line, "Skipped row: {}", skipped.reason);
        }

        let report = session.load_participants(load.participants).await?;
        debug!(
            path = %path.display(),
            added = report.added,
            classified = report.classified,
            skipped = load.skipped.len(),
            "Roster file loaded"
        );
        if !report.duplicates.is_empty() {
            warn!(
                path = %path.display(),
                duplicates = ?report.duplicates,
                "Duplicate participant IDs skipped"
            );
        }
    }
    info!(participants = session.participant_count(), files = paths.len(), "Rosters loaded");
    Ok(())
}

async fn form(
    session: &Arc<Session>,
    team_size: usize,
    output: Option<&Path>,
    show_members: bool,
    json: bool,
) -> Result<()> {
    let formation = session.form_teams(team_size).await?;
    debug!(
        team_size = formation.team_size,
        formed_at = %formation.formed_at.to_rfc3339(),
        "Formation complete"
    );
    let teams = formation.teams;

    if json {
        let reports: Vec<TeamReport> = teams.iter().map(TeamReport::from_team).collect();
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        println!("Teams formed: {}", teams.len());
        for team in &teams {
            let s = stats(team);
            println!(
                "{} (members={}, avg skill rating={:.2})",
                team.name(),
                s.member_count,
                s.avg_skill
            );
            if show_members {
                for member in team.members() {
                    println!("  - {}", member);
                }
            }
        }
    }

    if let Some(path) = output {
        files::write_teams(path, &teams)?;
        if !json {
            println!("Teams saved to: {}", path.display());
        }
    }
    Ok(())
}

async fn register(session: &Session, roster: &Path, participant: Participant) -> Result<()> {
    let has_rows = std::fs::metadata(roster).map(|m| m.len() > 0).unwrap_or(false);
    if has_rows {
        load_rosters(session, &[roster.to_path_buf()]).await?;
    }

    let registered = session.register(participant).await?;
    files::append_roster_row(roster, &registered)?;

    info!(id = %registered.id(), roster = %roster.display(), "Participant saved");
    println!("Participant registered successfully: {}", registered);
    Ok(())
}

fn list_participants(session: &Session) {
    let roster = session.roster_snapshot();
    if roster.is_empty() {
        println!("No participants available.");
        return;
    }
    for participant in roster {
        println!("{}", participant);
    }
}

/// Print a previously saved team file grouped by team.
fn show_team_file(path: &Path) -> Result<()> {
    let rows = files::read_teams(path)?;
    if rows.is_empty() {
        println!("No teams in {}", path.display());
        return Ok(());
    }

    for (team_name, members) in files::group_by_team(&rows) {
        let s = TeamStats::from_skills(members.iter().map(|r| r.skill_rating));
        println!(
            "{} (members={}, avg skill rating={:.2})",
            team_name, s.member_count, s.avg_skill
        );
        for row in members {
            println!(
                "  - {} | {} | Game={} | Role={} | Skill={} | Type={}",
                row.id, row.name, row.game, row.role, row.skill_rating, row.personality_type
            );
        }
    }
    Ok(())
}

/// Handle configuration subcommands
fn handle_config_command(subcommand: ConfigSubcommand, config_path: Option<&str>) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show => {
            let cfg = TeamMateConfig::load(config_path)?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), force)?;
            println!("Configuration file created: {}", written.display());
        }
        ConfigSubcommand::Validate => {
            TeamMateConfig::load(config_path)?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}
