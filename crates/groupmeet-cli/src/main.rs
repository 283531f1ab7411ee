//! The `groupmeet` binary.
//!
//! Takes the five input CSVs as positional arguments, runs the
//! assignment pipeline, prints a per-unit summary to stdout, and
//! writes the solution table. Diagnostics go to stderr so they never
//! mix with the summary.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use groupmeet_cli::{input, output, CliError};
use groupmeet_core::{normalize, GroupSizePolicy};
use groupmeet_solver::solve_prepared;

/// Default policy file consulted when `--config` is not given.
const DEFAULT_POLICY_FILE: &str = "groupmeet.toml";

#[derive(Debug, Parser)]
#[command(
    name = "groupmeet",
    version,
    about = "Assigns students to mentor meeting groups"
)]
struct Cli {
    /// Student roster CSV
    roster: PathBuf,
    /// Mentor exclusion list CSV
    exclusions: PathBuf,
    /// Mentor slot coverage CSV
    mentor_slots: PathBuf,
    /// Individual preference form CSV
    individual_prefs: PathBuf,
    /// Group preference form CSV
    group_prefs: PathBuf,

    /// Where to write the solution table
    #[arg(long, default_value = "solution.csv")]
    output: PathBuf,
    /// Group-size policy TOML (allowed_sizes, default_size)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        error!(error = %err, "run aborted");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let policy = match &cli.config {
        Some(path) => GroupSizePolicy::load(path)?,
        None => GroupSizePolicy::load(DEFAULT_POLICY_FILE).unwrap_or_default(),
    };

    let roster = input::read_roster(&cli.roster)?;
    let exclusions = input::read_exclusions(&cli.exclusions)?;
    let coverage = input::read_coverage(&cli.mentor_slots)?;
    let individual = input::read_individual_prefs(&cli.individual_prefs)?;
    let group = input::read_group_prefs(&cli.group_prefs, policy.max_size())?;
    info!(
        students = roster.len(),
        individual_records = individual.len(),
        group_records = group.len(),
        "inputs loaded"
    );

    let prefs = normalize::normalize(&roster, &individual, &group)?;
    let assignment = solve_prepared(&prefs, &coverage, &exclusions, &policy)?;

    for (unit, members) in assignment.rosters() {
        println!("{:<35} {members:?}", unit.to_string());
    }
    output::write_solution(&cli.output, &assignment, &prefs, policy.max_size())?;
    info!(path = %cli.output.display(), "solution written");
    Ok(())
}
