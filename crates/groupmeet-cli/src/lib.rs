//! GroupMeet CLI - CSV ingestion and output rendering
//!
//! Reads the five input tables (roster, exclusions, mentor coverage,
//! individual preferences, group preferences), drives the solver
//! pipeline, and writes the one-row-per-unit solution table.

pub mod input;
pub mod output;

use thiserror::Error;

use groupmeet_core::{GroupMeetError, PolicyError};

/// Top-level error for one CLI run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] GroupMeetError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Input(#[from] input::InputError),

    #[error(transparent)]
    Output(#[from] output::OutputError),
}
