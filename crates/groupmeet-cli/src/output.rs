//! Solution table rendering.
//!
//! One row per mentor slot unit, in (mentor, slot) order: the mentor,
//! the meeting time, then one (cs login, github, discord) column
//! triple per member slot up to the maximum allowed group size, blank
//! for unfilled slots. Units nobody was assigned to still get a row.

use std::path::{Path, PathBuf};

use thiserror::Error;

use groupmeet_core::NormalizedPreferences;
use groupmeet_solver::Assignment;

/// Output file error.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Writes the solution table to `path`.
pub fn write_solution(
    path: &Path,
    assignment: &Assignment,
    prefs: &NormalizedPreferences,
    max_size: u32,
) -> Result<(), OutputError> {
    let wrap = |source: csv::Error| OutputError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(&wrap)?;

    let mut header = vec!["Mentor cs login".to_string(), "Meeting time".to_string()];
    for i in 1..=max_size {
        header.push(format!("partner {i} - cs login"));
        header.push(format!("partner {i} - github"));
        header.push(format!("partner {i} - discord"));
    }
    writer.write_record(&header).map_err(&wrap)?;

    for (unit, members) in assignment.rosters() {
        let mut row = vec![unit.mentor.clone(), unit.slot.clone()];
        for i in 0..max_size as usize {
            match members.get(i) {
                Some(login) => {
                    let contact = prefs.contact_of(login);
                    row.push(login.clone());
                    row.push(contact.github);
                    row.push(contact.discord);
                }
                None => {
                    row.extend(std::iter::repeat(String::new()).take(3));
                }
            }
        }
        writer.write_record(&row).map_err(&wrap)?;
    }
    writer.flush().map_err(|err| wrap(err.into()))?;
    Ok(())
}
