//! Team file export and re-ingestion.
//!
//! One row per `(team, member)` pair, in team order then assignment order,
//! under the header `TeamName,ID,Name,Game,Role,Skill,Personality`.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};
use crate::team::Team;
use crate::types::{validate_skill, Game, ParticipantId, PersonalityType, Role};

/// Team file columns
pub const TEAM_HEADER: [&str; 7] = ["TeamName", "ID", "Name", "Game", "Role", "Skill", "Personality"];

/// One member row read back from a team file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRow {
    pub team_name: String,
    pub id: ParticipantId,
    pub name: String,
    pub game: Game,
    pub role: Role,
    pub skill_rating: u8,
    pub personality_type: PersonalityType,
}

/// Write teams to any writer.
pub fn render_teams<W: Write>(mut writer: W, teams: &[Team]) -> std::io::Result<()> {
    writeln!(writer, "{}", TEAM_HEADER.join(","))?;
    for team in teams {
        for member in team.members() {
            writeln!(
                writer,
                "{},{},{},{},{},{},{}",
                team.name(),
                member.id(),
                member.name(),
                member.game(),
                member.role(),
                member.skill_rating(),
                member.personality_type()
            )?;
        }
    }
    writer.flush()
}

/// Save teams to a CSV file, replacing any existing content.
pub fn write_teams(path: &Path, teams: &[Team]) -> Result<()> {
    let write_err = |source: std::io::Error| Error::IoWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let file = File::create(path).map_err(write_err)?;
    render_teams(BufWriter::new(file), teams).map_err(write_err)?;

    info!(
        path = %path.display(),
        teams = teams.len(),
        rows = teams.iter().map(Team::size).sum::<usize>(),
        "Team file written"
    );
    Ok(())
}

fn parse_team_row(line: &str) -> std::result::Result<TeamRow, String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let [team_name, id, name, game, role, skill, personality] = fields[..] else {
        return Err(format!(
            "expected {} columns, found {}",
            TEAM_HEADER.len(),
            fields.len()
        ));
    };
    if team_name.is_empty() || name.is_empty() {
        return Err("missing team or member name".to_string());
    }

    let skill: i64 = skill
        .parse()
        .map_err(|_| format!("'{}' is not an integer skill", skill))?;

    Ok(TeamRow {
        team_name: team_name.to_string(),
        id: id.parse().map_err(|e: Error| e.to_string())?,
        name: name.to_string(),
        game: game.parse().map_err(|e: Error| e.to_string())?,
        role: role.parse().map_err(|e: Error| e.to_string())?,
        skill_rating: validate_skill(skill).map_err(|e| e.to_string())?,
        personality_type: personality.parse()?,
    })
}

/// Parse team file content. Unlike roster ingestion, any bad row fails the read.
pub fn parse_teams<R: BufRead>(reader: R, path: &Path) -> Result<Vec<TeamRow>> {
    let malformed = |line: usize, message: String| Error::TeamFileMalformed {
        path: path.to_path_buf(),
        line,
        message,
    };

    let mut rows = Vec::new();
    let mut header_seen = false;
    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|source| Error::IoRead {
            path: path.to_path_buf(),
            source,
        })?;

        if line_no == 1 {
            let columns: Vec<&str> = line.split(',').map(str::trim).collect();
            let matches = columns.len() == TEAM_HEADER.len()
                && columns
                    .iter()
                    .zip(TEAM_HEADER)
                    .all(|(found, expected)| found.eq_ignore_ascii_case(expected));
            if !matches {
                return Err(malformed(line_no, format!("unexpected header '{}'", line.trim())));
            }
            header_seen = true;
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        rows.push(parse_team_row(&line).map_err(|message| malformed(line_no, message))?);
    }

    if !header_seen {
        return Err(malformed(1, "file is empty".to_string()));
    }
    Ok(rows)
}

/// Read a previously exported team file.
pub fn read_teams(path: &Path) -> Result<Vec<TeamRow>> {
    let file = File::open(path).map_err(|source| Error::IoRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_teams(BufReader::new(file), path)
}

/// Group rows by team name, keeping teams in first-appearance order.
pub fn group_by_team(rows: &[TeamRow]) -> Vec<(&str, Vec<&TeamRow>)> {
    let mut groups: Vec<(&str, Vec<&TeamRow>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        let slot = *index.entry(row.team_name.as_str()).or_insert_with(|| {
            groups.push((row.team_name.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(row);
    }
    groups
}
