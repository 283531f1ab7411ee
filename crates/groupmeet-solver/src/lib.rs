//! GroupMeet Solver - constraint construction and solution extraction
//!
//! This crate turns normalized preference data into a boolean
//! satisfiability instance, hands it to the external SAT engine, and
//! decodes the verdict:
//! - A labeled constraint set over one variable per (student, unit)
//! - Totalizer cardinality counters for the group-size rules
//! - Assumption-based unsat cores that name the conflicting rules
//! - Roster decoding with invariant checking
//!
//! The whole pipeline is synchronous and single-threaded; the blocking
//! solve is the only long-running step.

pub mod card;
pub mod decode;
pub mod encode;
pub mod sat;


pub use decode::{decode, Assignment};
pub use encode::{encode, Encoding};
pub use sat::{solve, Model, SolveOutcome};

use tracing::info;

use groupmeet_core::{
    expand, normalize, ExclusionList, GroupMeetError, GroupPreference, GroupSizePolicy,
    IndividualPreference, NormalizedPreferences, ProblemIndex, Result, SlotCoverage,
};

/// Runs the full pipeline for one set of inputs: normalize, expand,
/// index, encode, solve, decode.
///
/// # Errors
///
/// * [`GroupMeetError::RosterMismatch`] - a preference record names an
///   unrostered student
/// * [`GroupMeetError::Unsatisfiable`] - no valid assignment exists;
///   carries the conflicting rule labels
/// * [`GroupMeetError::InvariantViolation`] - the decoded model broke
///   a builder invariant (a bug, not bad input)
pub fn solve_assignment(
    roster: &[String],
    individual: &[IndividualPreference],
    group: &[GroupPreference],
    coverage: &SlotCoverage,
    exclusions: &ExclusionList,
    policy: &GroupSizePolicy,
) -> Result<Assignment> {
    let prefs = normalize::normalize(roster, individual, group)?;
    solve_prepared(&prefs, coverage, exclusions, policy)
}

/// Same as [`solve_assignment`], starting from already-normalized
/// preferences (the caller usually wants to keep them for contact
/// fields in the output table).
pub fn solve_prepared(
    prefs: &NormalizedPreferences,
    coverage: &SlotCoverage,
    exclusions: &ExclusionList,
    policy: &GroupSizePolicy,
) -> Result<Assignment> {
    let expanded = expand::expand(prefs, coverage, exclusions);
    let index = ProblemIndex::build(&expanded);

    info!(
        event = "encode_start",
        students = index.students.len(),
        units = index.units.len(),
    );
    let encoding = encode(&index, &expanded, prefs, policy);
    info!(
        event = "solve_start",
        variables = encoding.formula.var_count(),
        rules = encoding.selectors.len(),
    );

    match solve(&encoding)? {
        SolveOutcome::Satisfiable(model) => {
            let assignment = decode(&model, &encoding, &index)?;
            info!(event = "solve_end", outcome = "satisfiable");
            Ok(assignment)
        }
        SolveOutcome::Unsatisfiable(core) => {
            info!(event = "solve_end", outcome = "unsatisfiable");
            Err(GroupMeetError::Unsatisfiable { core })
        }
    }
}
