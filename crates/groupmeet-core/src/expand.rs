//! Slot expansion.
//!
//! Explodes each raw time slot into one [`Unit`] per mentor covering
//! it, filtered per student by the mentor exclusion list. A slot no
//! mentor covers produces no units and is dropped from every
//! student's availability with a warning.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::model::{normalize_login, Unit};
use crate::normalize::NormalizedPreferences;

/// Mentor coverage: which mentors staff which raw time slots.
#[derive(Debug, Clone, Default)]
pub struct SlotCoverage {
    slot_to_mentors: BTreeMap<String, BTreeSet<String>>,
}

impl SlotCoverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `mentor` covers `slot`. Many-to-many.
    pub fn add(&mut self, mentor: &str, slot: &str) {
        self.slot_to_mentors
            .entry(slot.trim().to_string())
            .or_default()
            .insert(normalize_login(mentor));
    }

    pub fn mentors_for(&self, slot: &str) -> Option<&BTreeSet<String>> {
        self.slot_to_mentors.get(slot)
    }

    /// Every (slot, mentor) unit that exists as a resource.
    pub fn all_units(&self) -> BTreeSet<Unit> {
        self.slot_to_mentors
            .iter()
            .flat_map(|(slot, mentors)| {
                mentors.iter().map(|mentor| Unit::new(slot.clone(), mentor.clone()))
            })
            .collect()
    }
}

/// Mentor-side student exclusions.
#[derive(Debug, Clone, Default)]
pub struct ExclusionList {
    mentor_to_students: BTreeMap<String, BTreeSet<String>>,
}

impl ExclusionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mentor: &str, student: &str) {
        self.mentor_to_students
            .entry(normalize_login(mentor))
            .or_default()
            .insert(normalize_login(student));
    }

    pub fn is_excluded(&self, mentor: &str, student: &str) -> bool {
        self.mentor_to_students
            .get(mentor)
            .is_some_and(|students| students.contains(student))
    }
}

/// Per-student availability expressed in mentor slot units.
#[derive(Debug, Clone, Default)]
pub struct ExpandedAvailability {
    /// Units the student may actually be assigned to.
    pub available: BTreeMap<String, BTreeSet<Unit>>,
    /// Units expanded from the student's slots but vetoed by an
    /// exclusion pair. Kept so the constraint builder can forbid them
    /// by name (the unsat core then points at the exclusion rule).
    pub barred: BTreeMap<String, BTreeSet<Unit>>,
    /// The global universe of units.
    pub units: BTreeSet<Unit>,
}

impl ExpandedAvailability {
    pub fn available_for(&self, login: &str) -> BTreeSet<Unit> {
        self.available.get(login).cloned().unwrap_or_default()
    }
}

/// Expands normalized availability into mentor slot units.
///
/// An excluded unit is omitted from that student's availability only;
/// the unit itself still exists for everyone else. Uncovered slots are
/// warned about once each and contribute zero units.
pub fn expand(
    prefs: &NormalizedPreferences,
    coverage: &SlotCoverage,
    exclusions: &ExclusionList,
) -> ExpandedAvailability {
    let mut expanded = ExpandedAvailability {
        units: coverage.all_units(),
        ..Default::default()
    };

    let mut uncovered: BTreeSet<&str> = BTreeSet::new();
    for (login, slots) in &prefs.availability {
        let available = expanded.available.entry(login.clone()).or_default();
        let barred = expanded.barred.entry(login.clone()).or_default();
        for slot in slots {
            let Some(mentors) = coverage.mentors_for(slot) else {
                uncovered.insert(slot);
                continue;
            };
            for mentor in mentors {
                let unit = Unit::new(slot.clone(), mentor.clone());
                if exclusions.is_excluded(mentor, login) {
                    barred.insert(unit);
                } else {
                    available.insert(unit);
                }
            }
        }
    }

    for slot in uncovered {
        warn!(slot, "no mentor covers this slot, dropping it from all availabilities");
    }

    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IndividualPreference;
    use crate::normalize::normalize;

    fn prefs(rows: &[(&str, &[&str])]) -> NormalizedPreferences {
        let roster: Vec<String> = rows.iter().map(|(l, _)| l.to_string()).collect();
        let individual: Vec<IndividualPreference> = rows
            .iter()
            .map(|(login, slots)| IndividualPreference {
                login: login.to_string(),
                slots: slots.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            })
            .collect();
        normalize(&roster, &individual, &[]).unwrap()
    }

    #[test]
    fn test_each_covering_mentor_yields_a_unit() {
        let mut coverage = SlotCoverage::new();
        coverage.add("tx", "Mon 3pm");
        coverage.add("ty", "Mon 3pm");
        let expanded = expand(
            &prefs(&[("ana", &["Mon 3pm"])]),
            &coverage,
            &ExclusionList::new(),
        );
        let units = expanded.available_for("ana");
        assert_eq!(units.len(), 2);
        assert!(units.contains(&Unit::new("Mon 3pm", "tx")));
        assert!(units.contains(&Unit::new("Mon 3pm", "ty")));
    }

    #[test]
    fn test_excluded_unit_is_barred_for_that_student_only() {
        let mut coverage = SlotCoverage::new();
        coverage.add("tx", "Mon 3pm");
        let mut exclusions = ExclusionList::new();
        exclusions.add("tx", "ana");
        let expanded = expand(
            &prefs(&[("ana", &["Mon 3pm"]), ("bo", &["Mon 3pm"])]),
            &coverage,
            &exclusions,
        );
        let unit = Unit::new("Mon 3pm", "tx");
        assert!(expanded.available_for("ana").is_empty());
        assert!(expanded.barred["ana"].contains(&unit));
        assert!(expanded.available_for("bo").contains(&unit));
        // The unit still exists globally.
        assert!(expanded.units.contains(&unit));
    }

    #[test]
    fn test_uncovered_slot_contributes_no_units() {
        let coverage = SlotCoverage::new();
        let expanded = expand(
            &prefs(&[("ana", &["Mon 3pm"])]),
            &coverage,
            &ExclusionList::new(),
        );
        assert!(expanded.available_for("ana").is_empty());
        assert!(expanded.units.is_empty());
    }

    #[test]
    fn test_unit_universe_covers_unrequested_slots() {
        let mut coverage = SlotCoverage::new();
        coverage.add("tx", "Mon 3pm");
        coverage.add("tx", "Fri 9am");
        let expanded = expand(
            &prefs(&[("ana", &["Mon 3pm"])]),
            &coverage,
            &ExclusionList::new(),
        );
        assert!(expanded.units.contains(&Unit::new("Fri 9am", "tx")));
    }
}
