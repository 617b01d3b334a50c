//! Roster file ingestion and appending.
//!
//! Format: a header line
//! `ID,Name,Email,PreferredGame,SkillLevel,PreferredRole,PersonalityScore,PersonalityType`
//! followed by one comma-separated participant per line. Malformed rows are
//! skipped with a warning; only a missing file or a bad header fails the load.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::types::{Game, Participant, ParticipantId, PersonalityType, Role};

/// Expected roster columns, matched case-insensitively
pub const ROSTER_HEADER: [&str; 8] = [
    "ID",
    "Name",
    "Email",
    "PreferredGame",
    "SkillLevel",
    "PreferredRole",
    "PersonalityScore",
    "PersonalityType",
];

/// A data row that was not loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line number in the file
    pub line: usize,
    pub reason: String,
}

/// Participants parsed from one roster file
#[derive(Debug, Default)]
pub struct RosterLoad {
    pub participants: Vec<Participant>,
    pub skipped: Vec<SkippedRow>,
}

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| Error::IoRead {
            path: path.to_path_buf(),
            source,
        })
}

fn check_header(header: Option<&str>, path: &Path) -> Result<()> {
    let header = match header.map(str::trim) {
        Some(h) if !h.is_empty() => h,
        _ => {
            return Err(Error::RosterFileEmpty {
                path: path.to_path_buf(),
            })
        }
    };

    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    for (index, expected) in ROSTER_HEADER.iter().enumerate() {
        let found = columns.get(index).copied().unwrap_or_default();
        if !found.eq_ignore_ascii_case(expected) {
            return Err(Error::RosterHeaderMismatch {
                path: path.to_path_buf(),
                column: index + 1,
                expected: *expected,
                found: found.to_string(),
            });
        }
    }
    Ok(())
}

/// Check that a roster file exists, is non-empty and has the expected header.
pub fn verify_roster_file(path: &Path) -> Result<()> {
    let mut header = String::new();
    open(path)?
        .read_line(&mut header)
        .map_err(|source| Error::IoRead {
            path: path.to_path_buf(),
            source,
        })?;
    check_header(Some(header.as_str()), path)
}

/// Build a participant from one data row.
fn parse_row(line: &str) -> Result<Participant> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < ROSTER_HEADER.len() {
        return Err(Error::invalid_participant(
            "row",
            format!("expected {} columns, found {}", ROSTER_HEADER.len(), fields.len()),
        ));
    }

    let [id, name, email, game, skill, role, score, personality] =
        [0, 1, 2, 3, 4, 5, 6, 7].map(|i| fields[i]);

    if [id, name, game, skill, role, score, personality]
        .iter()
        .any(|f| f.is_empty())
    {
        return Err(Error::invalid_participant("row", "missing required fields"));
    }

    let skill: i64 = skill
        .parse()
        .map_err(|_| Error::invalid_participant("skill", format!("'{}' is not an integer", skill)))?;
    let score: i64 = score.parse().map_err(|_| {
        Error::invalid_participant("survey", format!("'{}' is not an integer", score))
    })?;

    let participant = Participant::new(
        id.parse::<ParticipantId>()?,
        name,
        game.parse::<Game>()?,
        role.parse::<Role>()?,
        skill,
        score,
    )?
    .with_email(email);

    // Unrecognized labels fall back to classification from the survey total.
    let recorded = personality.parse::<PersonalityType>().unwrap_or_else(|reason| {
        debug!(id = %participant.id(), reason = %reason, "Ignoring recorded personality type");
        PersonalityType::Unknown
    });
    Ok(participant.with_recorded_type(recorded))
}

/// Parse roster content. `path` is used for error reporting only.
pub fn parse_roster<R: BufRead>(reader: R, path: &Path) -> Result<RosterLoad> {
    let mut lines = reader.lines();
    let header = lines.next().transpose().map_err(|source| Error::IoRead {
        path: path.to_path_buf(),
        source,
    })?;
    check_header(header.as_deref(), path)?;

    let mut load = RosterLoad::default();
    for (index, line) in lines.enumerate() {
        let line_no = index + 2;
        let line = line.map_err(|source| Error::IoRead {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        match parse_row(&line) {
            Ok(participant) => load.participants.push(participant),
            Err(e) => {
                warn!(path = %path.display(), line = line_no, reason = %e, "Skipping roster row");
                load.skipped.push(SkippedRow {
                    line: line_no,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(load)
}

/// Read every valid participant from a roster file.
pub fn read_roster(path: &Path) -> Result<RosterLoad> {
    let load = parse_roster(open(path)?, path)?;
    info!(
        path = %path.display(),
        loaded = load.participants.len(),
        skipped = load.skipped.len(),
        "Roster file read"
    );
    Ok(load)
}

/// Render a participant as a roster data row.
pub fn roster_row(participant: &Participant) -> String {
    [
        participant.id().to_string(),
        participant.name().to_string(),
        participant.email().unwrap_or_default().to_string(),
        participant.game().to_string(),
        participant.skill_rating().to_string(),
        participant.role().to_string(),
        participant.survey_total().to_string(),
        participant.personality_type().to_string(),
    ]
    .join(",")
}

/// Append one participant, writing the header first if the file is new or empty.
pub fn append_roster_row(path: &Path, participant: &Participant) -> Result<()> {
    let write_err = |source: std::io::Error| Error::IoWrite {
        path: PathBuf::from(path),
        source,
    };

    let needs_header = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let needs_newline = !needs_header
        && !ends_with_newline(path).map_err(|source| Error::IoRead {
            path: PathBuf::from(path),
            source,
        })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(write_err)?;

    if needs_header {
        writeln!(file, "{}", ROSTER_HEADER.join(",")).map_err(write_err)?;
    } else if needs_newline {
        writeln!(file).map_err(write_err)?;
    }
    writeln!(file, "{}", roster_row(participant)).map_err(write_err)?;

    debug!(path = %path.display(), id = %participant.id(), "Roster row appended");
    Ok(())
}

/// Whether a non-empty file's last byte is a line break
fn ends_with_newline(path: &Path) -> std::io::Result<bool> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    use crate::error::ErrorCode;

    const HEADER: &str = "ID,Name,Email,PreferredGame,SkillLevel,PreferredRole,PersonalityScore,PersonalityType";

    fn parse(content: &str) -> Result<RosterLoad> {
        parse_roster(Cursor::new(content), Path::new("test.csv"))
    }

    #[test]
    fn test_parse_valid_rows() {
        let content = format!(
            "{}\nP001,Alice,alice@example.com,Chess,7,Attacker,12,TYPE_B\nP002,Bob,,DOTA 2,3,Defender,22,type_d\n",
            HEADER
        );
        let load = parse(&content).unwrap();

        assert!(load.skipped.is_empty());
        assert_eq!(load.participants.len(), 2);

        let alice = &load.participants[0];
        assert_eq!(alice.id().as_str(), "P001");
        assert_eq!(alice.email(), Some("alice@example.com"));
        assert_eq!(alice.skill_rating(), 7);
        assert_eq!(alice.personality_type(), PersonalityType::TypeB);

        let bob = &load.participants[1];
        assert_eq!(bob.game(), Game::Dota2);
        assert_eq!(bob.email(), None);
        assert_eq!(bob.personality_type(), PersonalityType::TypeD);
    }

    #[test]
    fn test_header_case_insensitive() {
        let content = "id,NAME,email,preferredgame,skilllevel,preferredrole,personalityscore,personalitytype\n";
        assert!(parse(content).unwrap().participants.is_empty());
    }

    #[test]
    fn test_header_mismatch() {
        let content = "ID,Name,Email,Game,SkillLevel,PreferredRole,PersonalityScore,PersonalityType\n";
        match parse(content).unwrap_err() {
            Error::RosterHeaderMismatch { column, expected, found, .. } => {
                assert_eq!(column, 4);
                assert_eq!(expected, "PreferredGame");
                assert_eq!(found, "Game");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = parse("ID,Name,Email\n").unwrap_err();
        assert_eq!(err.code(), ErrorCode::RosterHeaderMismatch);
    }

    #[test]
    fn test_empty_file() {
        assert_eq!(parse("").unwrap_err().code(), ErrorCode::RosterFileEmpty);
        assert_eq!(parse("   \n").unwrap_err().code(), ErrorCode::RosterFileEmpty);
    }

    #[test]
    fn test_bad_rows_are_skipped() {
        let content = format!(
            "{}\n\
             P001,Alice,,Chess,7,Attacker,12,TYPE_B\n\
             P002,,,Chess,7,Attacker,12,TYPE_B\n\
             P003,Cy,,Chess,seven,Attacker,12,TYPE_B\n\
             P004,Di,,Chess,11,Attacker,12,TYPE_B\n\
             P005,Ed,,Chess,0,Attacker,12,TYPE_B\n\
             P006,Fay,,Chess,5,Attacker\n\
             \n\
             P007,Gus,,Chess,5,Attacker,30,TYPE_B\n\
             P008,Hal,,Tetris,5,Attacker,12,TYPE_B\n\
             008,Ivy,,Chess,5,Attacker,12,TYPE_B\n\
             P010,Jo,,Chess,5,Attacker,12,\n\
             P011,Kim,,Valorant,10,Coordinator,25,TYPE_D\n",
            HEADER
        );
        let load = parse(&content).unwrap();

        let ids: Vec<_> = load.participants.iter().map(|p| p.id().to_string()).collect();
        assert_eq!(ids, ["P001", "P011"]);

        let lines: Vec<_> = load.skipped.iter().map(|s| s.line).collect();
        assert_eq!(lines, [3, 4, 5, 6, 7, 9, 10, 11, 12]);
        assert!(load.skipped[0].reason.contains("missing required fields"));
        assert!(load.skipped[1].reason.contains("not an integer"));
    }

    #[test]
    fn test_unrecognized_type_left_for_classifier() {
        let content = format!("{}\nP001,Alice,,Chess,7,Attacker,12,Leader\n", HEADER);
        let load = parse(&content).unwrap();
        assert_eq!(load.participants[0].personality_type(), PersonalityType::Unknown);
    }

    #[test]
    fn test_extra_columns_tolerated() {
        let content = format!("{},Notes\nP001,Alice,,Chess,7,Attacker,12,TYPE_B,likes tea\n", HEADER);
        assert_eq!(parse(&content).unwrap().participants.len(), 1);
    }

    #[test]
    fn test_verify_roster_file() {
        let dir = TempDir::new().unwrap();

        let missing = dir.path().join("missing.csv");
        assert_eq!(verify_roster_file(&missing).unwrap_err().code(), ErrorCode::IoRead);

        let good = dir.path().join("good.csv");
        fs::write(&good, format!("{}\n", HEADER)).unwrap();
        assert!(verify_roster_file(&good).is_ok());

        let empty = dir.path().join("empty.csv");
        fs::write(&empty, "").unwrap();
        assert_eq!(verify_roster_file(&empty).unwrap_err().code(), ErrorCode::RosterFileEmpty);
    }

    #[test]
    fn test_append_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("roster.csv");

        let first = Participant::new("P1".parse().unwrap(), "Ann", Game::CsGo, Role::Strategist, 9, 19)
            .unwrap()
            .with_email("ann@example.com")
            .with_recorded_type(PersonalityType::TypeC);
        let second = Participant::new("P2".parse().unwrap(), "Ben", Game::Fifa, Role::Supporter, 2, 6)
            .unwrap()
            .with_recorded_type(PersonalityType::TypeA);

        append_roster_row(&path, &first).unwrap();
        append_roster_row(&path, &second).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().next().unwrap(), HEADER);
        assert_eq!(content.lines().count(), 3);

        let load = read_roster(&path).unwrap();
        assert_eq!(load.participants, vec![first, second]);
    }

    #[test]
    fn test_append_after_unterminated_last_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roster.csv");
        fs::write(&path, format!("{}\nP001,Ann,,Chess,7,Attacker,12,TYPE_B", HEADER)).unwrap();

        let ben = Participant::new("P2".parse().unwrap(), "Ben", Game::Fifa, Role::Supporter, 2, 6).unwrap();
        append_roster_row(&path, &ben).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert!(content.ends_with('\n'));

        let load = read_roster(&path).unwrap();
        assert!(load.skipped.is_empty());
        assert_eq!(load.participants.len(), 2);
        assert_eq!(load.participants[1].name(), "Ben");
    }
}
