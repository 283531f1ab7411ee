//! Preference normalization.
//!
//! Merges the individual and group preference forms into one
//! availability set per rostered student, resolving conflicts (the
//! group form wins) and defaulting silent students to full
//! availability. All merge conflicts and defaults are non-fatal and
//! logged; an unrostered login in either form aborts the run.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::error::{GroupMeetError, Result};
use crate::model::{normalize_login, Contact, GroupPreference, IndividualPreference};

/// The merged per-student preference data, still expressed in raw
/// time-slot labels. Read-only input to the slot expander.
#[derive(Debug, Clone, Default)]
pub struct NormalizedPreferences {
    /// Student login -> raw time-slot labels the student accepts.
    pub availability: BTreeMap<String, BTreeSet<String>>,
    /// Undirected partner relation, stored symmetrically.
    pub partners: BTreeMap<String, BTreeSet<String>>,
    /// Contact fields, as last self-reported (partner-reported fields
    /// only fill gaps).
    pub contacts: BTreeMap<String, Contact>,
    /// Every raw time-slot label seen in any preference record.
    pub observed_slots: BTreeSet<String>,
}

impl NormalizedPreferences {
    /// Returns the partner set of `login`, empty if none declared.
    pub fn partners_of(&self, login: &str) -> BTreeSet<String> {
        self.partners.get(login).cloned().unwrap_or_default()
    }

    pub fn contact_of(&self, login: &str) -> Contact {
        self.contacts.get(login).cloned().unwrap_or_default()
    }
}

/// Merges preference records against the roster.
///
/// Every rostered student starts with an empty availability set.
/// Individual records accumulate availability; group records replace
/// it outright (with a warning if the student had already stated
/// preferences). After all records are processed, students with no
/// stated availability default to the full set of observed slots.
///
/// # Errors
///
/// Returns [`GroupMeetError::RosterMismatch`] if any record names a
/// login absent from the roster.
pub fn normalize(
    roster: &[String],
    individual: &[IndividualPreference],
    group: &[GroupPreference],
) -> Result<NormalizedPreferences> {
    let mut prefs = NormalizedPreferences::default();
    for raw in roster {
        let login = normalize_login(raw);
        if !login.is_empty() {
            prefs.availability.entry(login).or_default();
        }
    }

    for record in individual {
        merge_individual(&mut prefs, record)?;
    }
    for record in group {
        merge_group(&mut prefs, record)?;
    }

    // Silent students are assumed fully flexible.
    let observed = prefs.observed_slots.clone();
    for (login, slots) in &mut prefs.availability {
        if slots.is_empty() {
            warn!(
                student = %login,
                "student has no preferences in either form, defaulting to full availability"
            );
            *slots = observed.clone();
        }
    }

    Ok(prefs)
}

fn merge_individual(prefs: &mut NormalizedPreferences, record: &IndividualPreference) -> Result<()> {
    let login = require_rostered(prefs, &record.login, "individual preference form")?;
    let slots = clean_slots(&record.slots);
    prefs.observed_slots.extend(slots.iter().cloned());
    prefs
        .availability
        .get_mut(&login)
        .expect("rostered login has an availability entry")
        .extend(slots);
    prefs.contacts.insert(login.clone(), record.contact.clone());

    if let Some(raw_partner) = &record.partner {
        let partner = require_rostered(prefs, raw_partner, "individual preference form")?;
        link_partners(prefs, &login, &partner);
        // A partner-reported contact only fills a gap; the partner's
        // own form, if any, wins.
        let entry = prefs.contacts.entry(partner).or_default();
        if entry.is_empty() {
            *entry = record.partner_contact.clone();
        }
    }
    Ok(())
}

fn merge_group(prefs: &mut NormalizedPreferences, record: &GroupPreference) -> Result<()> {
    let mut members = Vec::new();
    for (raw, contact) in &record.members {
        let login = require_rostered(prefs, raw, "group preference form")?;
        prefs.contacts.insert(login.clone(), contact.clone());
        members.push(login);
    }
    members.sort();
    members.dedup();

    if members.len() < 2 {
        warn!(
            members = members.len(),
            "group preference row with fewer than two members"
        );
    }

    let slots = clean_slots(&record.slots);
    prefs.observed_slots.extend(slots.iter().cloned());

    for login in &members {
        let availability = prefs
            .availability
            .get_mut(login)
            .expect("rostered login has an availability entry");
        if !availability.is_empty() {
            // Filled out both forms; the group form wins.
            warn!(
                student = %login,
                "student has both individual and group preferences, keeping the group preferences"
            );
            availability.clear();
        }
        availability.extend(slots.iter().cloned());
    }

    for a in &members {
        for b in &members {
            if a != b {
                prefs.partners.entry(a.clone()).or_default().insert(b.clone());
            }
        }
    }
    Ok(())
}

/// Normalizes a referenced login and checks it against the roster.
fn require_rostered(
    prefs: &NormalizedPreferences,
    raw: &str,
    source_file: &str,
) -> Result<String> {
    let login = normalize_login(raw);
    if prefs.availability.contains_key(&login) {
        Ok(login)
    } else {
        Err(GroupMeetError::RosterMismatch {
            login,
            source_file: source_file.to_string(),
        })
    }
}

fn link_partners(prefs: &mut NormalizedPreferences, a: &str, b: &str) {
    if a == b {
        return;
    }
    prefs.partners.entry(a.to_string()).or_default().insert(b.to_string());
    prefs.partners.entry(b.to_string()).or_default().insert(a.to_string());
}

fn clean_slots(raw: &[String]) -> BTreeSet<String> {
    raw.iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(logins: &[&str]) -> Vec<String> {
        logins.iter().map(|s| s.to_string()).collect()
    }

    fn individual(login: &str, partner: Option<&str>, slots: &[&str]) -> IndividualPreference {
        IndividualPreference {
            login: login.to_string(),
            partner: partner.map(|p| p.to_string()),
            slots: slots.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn group(members: &[&str], slots: &[&str]) -> GroupPreference {
        GroupPreference {
            members: members
                .iter()
                .map(|m| (m.to_string(), Contact::default()))
                .collect(),
            slots: slots.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_individual_preferences_accumulate() {
        let prefs = normalize(
            &roster(&["ana", "bo"]),
            &[
                individual("Ana ", None, &["Mon 3pm"]),
                individual("ana", None, &["Tue 1pm"]),
            ],
            &[],
        )
        .unwrap();
        let slots: Vec<_> = prefs.availability["ana"].iter().cloned().collect();
        assert_eq!(slots, vec!["Mon 3pm", "Tue 1pm"]);
    }

    #[test]
    fn test_group_form_overrides_individual() {
        let prefs = normalize(
            &roster(&["ana", "bo"]),
            &[individual("ana", None, &["Mon 3pm"])],
            &[group(&["ana", "bo"], &["Tue 1pm"])],
        )
        .unwrap();
        assert!(prefs.availability["ana"].contains("Tue 1pm"));
        assert!(!prefs.availability["ana"].contains("Mon 3pm"));
        assert!(prefs.partners_of("ana").contains("bo"));
        assert!(prefs.partners_of("bo").contains("ana"));
    }

    #[test]
    fn test_partner_relation_is_symmetric() {
        let prefs = normalize(
            &roster(&["ana", "bo"]),
            &[individual("ana", Some("bo"), &["Mon 3pm"])],
            &[],
        )
        .unwrap();
        assert!(prefs.partners_of("bo").contains("ana"));
    }

    #[test]
    fn test_silent_student_defaults_to_observed_slots() {
        let prefs = normalize(
            &roster(&["ana", "bo"]),
            &[individual("ana", None, &["Mon 3pm", "Tue 1pm"])],
            &[],
        )
        .unwrap();
        assert_eq!(prefs.availability["bo"], prefs.observed_slots);
    }

    #[test]
    fn test_unrostered_login_fails_fast() {
        let err = normalize(
            &roster(&["ana"]),
            &[individual("ghost", None, &["Mon 3pm"])],
            &[],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GroupMeetError::RosterMismatch { ref login, .. } if login == "ghost"
        ));
    }

    #[test]
    fn test_unrostered_partner_fails_fast() {
        let err = normalize(
            &roster(&["ana"]),
            &[individual("ana", Some("ghost"), &["Mon 3pm"])],
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, GroupMeetError::RosterMismatch { .. }));
    }

    #[test]
    fn test_partner_contact_fills_gap_only() {
        let mut rec = individual("ana", Some("bo"), &["Mon 3pm"]);
        rec.partner_contact = Contact::new("bo-gh", "bo-dc");
        let mut own = individual("bo", None, &["Mon 3pm"]);
        own.contact = Contact::new("real-gh", "real-dc");
        // Partner-reported first, own form later: own form wins.
        let prefs = normalize(&roster(&["ana", "bo"]), &[rec, own], &[]).unwrap();
        assert_eq!(prefs.contact_of("bo").github, "real-gh");
    }
}
