//! Error types for GroupMeet

use thiserror::Error;

/// Main error type for GroupMeet operations
#[derive(Debug, Error)]
pub enum GroupMeetError {
    /// A preference file names a student absent from the roster
    #[error("student {login} appears in the {source_file} but not in the roster")]
    RosterMismatch { login: String, source_file: String },

    /// No valid assignment exists; carries the labels of the minimal
    /// conflicting constraint subset reported by the solver
    #[error("no valid assignment exists; conflicting rules: [{}]", core.join("; "))]
    Unsatisfiable { core: Vec<String> },

    /// A decoded solution broke a builder invariant (indicates a bug,
    /// not bad input)
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),

    /// The SAT backend failed outright
    #[error("solver failure: {0}")]
    Solver(String),
}

/// Result type alias for GroupMeet operations
pub type Result<T> = std::result::Result<T, GroupMeetError>;
