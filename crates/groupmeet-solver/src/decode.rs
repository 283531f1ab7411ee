//! Solution decoding.
//!
//! Turns a satisfying model back into group rosters. A student whose
//! grid row contains zero or several true variables means the builder
//! emitted a broken constraint set; that is an invariant violation,
//! not bad input.

use std::collections::BTreeMap;

use groupmeet_core::{GroupMeetError, ProblemIndex, Result, Unit};

use crate::encode::Encoding;
use crate::sat::Model;

/// The total student -> unit mapping recovered from a model.
///
/// Never partially populated: construction fails unless every student
/// has exactly one unit.
#[derive(Debug, Clone)]
pub struct Assignment {
    /// Unit -> member logins, in login order. Every unit in the
    /// universe has an entry; an empty roster is a valid outcome.
    pub by_unit: BTreeMap<Unit, Vec<String>>,
    pub by_student: BTreeMap<String, Unit>,
}

impl Assignment {
    pub fn unit_of(&self, login: &str) -> Option<&Unit> {
        self.by_student.get(login)
    }

    /// Units in output order (mentor, then slot) with their members.
    pub fn rosters(&self) -> impl Iterator<Item = (&Unit, &[String])> {
        self.by_unit.iter().map(|(unit, members)| (unit, members.as_slice()))
    }
}

/// Reads each student's row of the grid back out of the model.
///
/// Only available-unit variables are consulted: barred and pruned
/// units are pinned false by their own constraints, and variables the
/// builder never referenced must not be queried at all.
pub fn decode(model: &Model, encoding: &Encoding, index: &ProblemIndex) -> Result<Assignment> {
    let mut by_unit: BTreeMap<Unit, Vec<String>> = index
        .units
        .iter()
        .map(|(_, unit)| (unit.clone(), Vec::new()))
        .collect();
    let mut by_student = BTreeMap::new();

    for (sid, login) in index.students.iter() {
        let hits: Vec<usize> = encoding.available[sid]
            .iter()
            .copied()
            .filter(|&uid| model.is_true(encoding.grid[sid][uid]))
            .collect();
        match hits.as_slice() {
            [uid] => {
                let unit = index.units.get(*uid).clone();
                by_unit
                    .get_mut(&unit)
                    .expect("every indexed unit has a roster entry")
                    .push(login.clone());
                by_student.insert(login.clone(), unit);
            }
            [] => {
                return Err(GroupMeetError::InvariantViolation(format!(
                    "student {login} satisfied coverage but holds no unit"
                )));
            }
            many => {
                let units: Vec<String> = many
                    .iter()
                    .map(|&uid| index.units.get(uid).to_string())
                    .collect();
                return Err(GroupMeetError::InvariantViolation(format!(
                    "student {login} assigned to multiple units: {}",
                    units.join(", ")
                )));
            }
        }
    }

    Ok(Assignment { by_unit, by_student })
}
