//! GroupMeet Core - domain model and preference pipeline
//!
//! This crate provides everything upstream of the constraint solver:
//! - Domain types for students, time slots, and mentor slot units
//! - Preference normalization (individual vs. group form merging)
//! - Slot expansion (time slot x mentor, with exclusion handling)
//! - Dense id mapping for the boolean variable grid
//! - The group-size policy and its TOML configuration

pub mod error;
pub mod expand;
pub mod index;
pub mod model;
pub mod normalize;
pub mod policy;

pub use error::{GroupMeetError, Result};
pub use expand::{ExclusionList, ExpandedAvailability, SlotCoverage};
pub use index::{IdMap, ProblemIndex};
pub use model::{normalize_login, Contact, GroupPreference, IndividualPreference, Unit};
pub use normalize::NormalizedPreferences;
pub use policy::{GroupSizePolicy, PolicyError};
