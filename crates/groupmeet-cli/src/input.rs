//! CSV ingestion for the five input tables.
//!
//! All files are header-driven, one row per logical record, with the
//! column names the preference forms export. Fixed-schema files use
//! serde records; the group preference form is read by header lookup
//! because its member-column count follows the maximum allowed group
//! size.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use groupmeet_core::{
    Contact, ExclusionList, GroupPreference, IndividualPreference, SlotCoverage,
};

/// Availability column on the individual preference form.
pub const INDIVIDUAL_AVAILABILITY_COLUMN: &str =
    "Check all mentor meeting slots for which you will be available each week of the Term Project";

/// Availability column on the group preference form.
pub const GROUP_AVAILABILITY_COLUMN: &str =
    "Check all mentor meeting slots for which your entire group will be available each week of the Term Project";

/// Input file error, always naming the offending file.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} is missing required column {column:?}")]
    MissingColumn { path: PathBuf, column: String },
}

fn csv_err(path: &Path) -> impl FnOnce(csv::Error) -> InputError + '_ {
    move |source| InputError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

/// The form's checkbox export joins selections with ", ".
fn split_slots(raw: &str) -> Vec<String> {
    raw.split(", ")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn optional(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "Student CS Login")]
    login: String,
}

/// Reads the student roster.
pub fn read_roster(path: &Path) -> Result<Vec<String>, InputError> {
    let mut reader = csv::Reader::from_path(path).map_err(csv_err(path))?;
    let mut roster = Vec::new();
    for row in reader.deserialize() {
        let row: RosterRow = row.map_err(csv_err(path))?;
        roster.push(row.login);
    }
    Ok(roster)
}

#[derive(Debug, Deserialize)]
struct CoverageRow {
    #[serde(rename = "TA CS Login")]
    mentor: String,
    #[serde(rename = "Mentor Meeting Slot")]
    slot: String,
}

/// Reads the mentor-to-slot coverage mapping (many-to-many).
pub fn read_coverage(path: &Path) -> Result<SlotCoverage, InputError> {
    let mut reader = csv::Reader::from_path(path).map_err(csv_err(path))?;
    let mut coverage = SlotCoverage::new();
    for row in reader.deserialize() {
        let row: CoverageRow = row.map_err(csv_err(path))?;
        coverage.add(&row.mentor, &row.slot);
    }
    Ok(coverage)
}

#[derive(Debug, Deserialize)]
struct ExclusionRow {
    #[serde(rename = "TA CS Login")]
    mentor: String,
    #[serde(rename = "Student CS Login")]
    student: String,
}

/// Reads the (mentor, student) exclusion pairs.
pub fn read_exclusions(path: &Path) -> Result<ExclusionList, InputError> {
    let mut reader = csv::Reader::from_path(path).map_err(csv_err(path))?;
    let mut exclusions = ExclusionList::new();
    for row in reader.deserialize() {
        let row: ExclusionRow = row.map_err(csv_err(path))?;
        exclusions.add(&row.mentor, &row.student);
    }
    Ok(exclusions)
}

#[derive(Debug, Deserialize)]
struct IndividualRow {
    #[serde(rename = "Partner 1 - CS Login")]
    login: String,
    #[serde(rename = "Partner 1 - GitHub Username", default)]
    github: String,
    #[serde(rename = "Partner 1 - Discord Username", default)]
    discord: String,
    #[serde(rename = "Partner 2 - CS Login [optional]", default)]
    partner: String,
    #[serde(rename = "Partner 2 - GitHub Username [optional]", default)]
    partner_github: String,
    #[serde(rename = "Partner 2 - Discord Username [optional]", default)]
    partner_discord: String,
    #[serde(
        rename = "Check all mentor meeting slots for which you will be available each week of the Term Project",
        default
    )]
    availability: String,
}

/// Reads the individual preference form.
pub fn read_individual_prefs(path: &Path) -> Result<Vec<IndividualPreference>, InputError> {
    let mut reader = csv::Reader::from_path(path).map_err(csv_err(path))?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        let row: IndividualRow = row.map_err(csv_err(path))?;
        records.push(IndividualPreference {
            login: row.login,
            contact: Contact::new(row.github, row.discord),
            partner: optional(&row.partner),
            partner_contact: Contact::new(row.partner_github, row.partner_discord),
            slots: split_slots(&row.availability),
        });
    }
    Ok(records)
}

/// Reads the group preference form.
///
/// Member columns run `Partner 1` through `Partner {max_size}`; the
/// file may carry fewer, but `Partner 1 - CS Login` and the
/// availability column must exist.
pub fn read_group_prefs(path: &Path, max_size: u32) -> Result<Vec<GroupPreference>, InputError> {
    let mut reader = csv::Reader::from_path(path).map_err(csv_err(path))?;
    let headers = reader.headers().map_err(csv_err(path))?.clone();
    let position = |name: &str| headers.iter().position(|h| h == name);
    let require = |name: &str| {
        position(name).ok_or_else(|| InputError::MissingColumn {
            path: path.to_path_buf(),
            column: name.to_string(),
        })
    };

    let availability_idx = require(GROUP_AVAILABILITY_COLUMN)?;
    require("Partner 1 - CS Login")?;
    let member_columns: Vec<(usize, Option<usize>, Option<usize>)> = (1..=max_size)
        .filter_map(|i| {
            position(&format!("Partner {i} - CS Login")).map(|login_idx| {
                (
                    login_idx,
                    position(&format!("Partner {i} - GitHub Username")),
                    position(&format!("Partner {i} - Discord Username")),
                )
            })
        })
        .collect();

    let cell = |record: &csv::StringRecord, idx: Option<usize>| {
        idx.and_then(|i| record.get(i)).unwrap_or("").trim().to_string()
    };

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(csv_err(path))?;
        let mut members = Vec::new();
        for &(login_idx, github_idx, discord_idx) in &member_columns {
            let login = cell(&row, Some(login_idx));
            if !login.is_empty() {
                members.push((
                    login,
                    Contact::new(cell(&row, github_idx), cell(&row, discord_idx)),
                ));
            }
        }
        records.push(GroupPreference {
            members,
            slots: split_slots(row.get(availability_idx).unwrap_or("")),
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_read_roster() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "roster.csv", "Student CS Login\nana\nbo\n");
        assert_eq!(read_roster(&path).unwrap(), vec!["ana", "bo"]);
    }

    #[test]
    fn test_read_individual_prefs() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "prefs.csv",
            "Partner 1 - CS Login,Partner 1 - GitHub Username,Partner 1 - Discord Username,\
             Partner 2 - CS Login [optional],Partner 2 - GitHub Username [optional],\
             Partner 2 - Discord Username [optional],\
             Check all mentor meeting slots for which you will be available each week of the Term Project\n\
             ana,ana-gh,ana-dc,bo,bo-gh,bo-dc,\"Mon 3pm, Tue 1pm\"\n\
             cy,cy-gh,cy-dc,,,,Mon 3pm\n",
        );
        let records = read_individual_prefs(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].login, "ana");
        assert_eq!(records[0].partner.as_deref(), Some("bo"));
        assert_eq!(records[0].slots, vec!["Mon 3pm", "Tue 1pm"]);
        assert_eq!(records[1].partner, None);
    }

    #[test]
    fn test_read_group_prefs() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "groups.csv",
            "Partner 1 - CS Login,Partner 1 - GitHub Username,Partner 1 - Discord Username,\
             Partner 2 - CS Login,Partner 2 - GitHub Username,Partner 2 - Discord Username,\
             Check all mentor meeting slots for which your entire group will be available each week of the Term Project\n\
             ana,ana-gh,ana-dc,bo,bo-gh,bo-dc,Mon 3pm\n",
        );
        let records = read_group_prefs(&path, 6).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].members.len(), 2);
        assert_eq!(records[0].members[1].0, "bo");
        assert_eq!(records[0].members[1].1.github, "bo-gh");
        assert_eq!(records[0].slots, vec!["Mon 3pm"]);
    }

    #[test]
    fn test_group_prefs_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "groups.csv", "wrong,header\n1,2\n");
        let err = read_group_prefs(&path, 6).unwrap_err();
        assert!(matches!(err, InputError::MissingColumn { .. }));
    }
}
