//! Core domain types.

use std::fmt;

/// Normalizes a raw login string: trimmed and lowercased.
///
/// Every login comparison in the pipeline happens on normalized form,
/// so form typos like `" JSmith "` and `"jsmith"` name the same student.
pub fn normalize_login(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Auxiliary contact fields carried through to the output table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
    pub github: String,
    pub discord: String,
}

impl Contact {
    pub fn new(github: impl Into<String>, discord: impl Into<String>) -> Self {
        Self {
            github: github.into(),
            discord: discord.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.github.is_empty() && self.discord.is_empty()
    }
}

/// One assignable (time slot, mentor) resource.
///
/// Field order matters: `Ord` derives mentor-major, which is the
/// deterministic order the output table is emitted in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Unit {
    pub mentor: String,
    pub slot: String,
}

impl Unit {
    pub fn new(slot: impl Into<String>, mentor: impl Into<String>) -> Self {
        Self {
            mentor: mentor.into(),
            slot: slot.into(),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.slot, self.mentor)
    }
}

/// One row of the individual preference form.
#[derive(Debug, Clone, Default)]
pub struct IndividualPreference {
    pub login: String,
    pub contact: Contact,
    /// Optional second partner named on the form.
    pub partner: Option<String>,
    pub partner_contact: Contact,
    /// Raw time-slot labels the student is available for.
    pub slots: Vec<String>,
}

/// One row of the group preference form: 2-6 members sharing an
/// availability list.
#[derive(Debug, Clone, Default)]
pub struct GroupPreference {
    pub members: Vec<(String, Contact)>,
    /// Raw time-slot labels the whole group is available for.
    pub slots: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_login() {
        assert_eq!(normalize_login("  JSmith "), "jsmith");
        assert_eq!(normalize_login("jsmith"), "jsmith");
        assert_eq!(normalize_login(""), "");
    }

    #[test]
    fn test_unit_display() {
        let unit = Unit::new("Mon 3pm", "ta1");
        assert_eq!(unit.to_string(), "Mon 3pm (ta1)");
    }

    #[test]
    fn test_unit_order_is_mentor_major() {
        let a = Unit::new("Tue 1pm", "alice");
        let b = Unit::new("Mon 3pm", "bob");
        assert!(a < b);
    }
}
