//! Solver invocation boundary.
//!
//! The one place the external SAT engine is touched. The full clause
//! set goes in, every rule selector is assumed, and the blocking solve
//! comes back as either a model or the failed-assumption core mapped
//! back to rule labels. No timeout, no cancellation, no retries: an
//! unsatisfiable verdict is terminal for the run.

use std::collections::HashMap;

use varisat::{Lit, Solver};

use groupmeet_core::{GroupMeetError, Result};

use crate::encode::Encoding;

/// A satisfying assignment over the variables the encoder allocated.
#[derive(Debug)]
pub struct Model {
    values: Vec<bool>,
}

impl Model {
    #[cfg(test)]
    pub(crate) fn from_values(values: Vec<bool>) -> Self {
        Self { values }
    }

    /// Truth value of a literal under the model.
    ///
    /// Only literals handed out by the encoder may be queried; the
    /// decoder restricts itself to grid literals over candidate units.
    pub fn is_true(&self, lit: Lit) -> bool {
        let value = self.values.get(lit.var().index()).copied().unwrap_or(false);
        if lit.is_positive() {
            value
        } else {
            !value
        }
    }
}

/// Outcome of one blocking solve.
#[derive(Debug)]
pub enum SolveOutcome {
    Satisfiable(Model),
    /// Labels of the minimal conflicting rule subset the engine could
    /// identify.
    Unsatisfiable(Vec<String>),
}

/// Submits the encoding and blocks until the engine decides.
///
/// # Errors
///
/// Returns [`GroupMeetError::Solver`] only when the backend itself
/// fails; an unsatisfiable instance is a normal [`SolveOutcome`].
pub fn solve(encoding: &Encoding) -> Result<SolveOutcome> {
    let mut solver = Solver::new();
    solver.add_formula(&encoding.formula);

    let assumptions: Vec<Lit> = encoding.selectors.iter().map(|(sel, _)| *sel).collect();
    solver.assume(&assumptions);

    let satisfiable = solver
        .solve()
        .map_err(|err| GroupMeetError::Solver(err.to_string()))?;

    if satisfiable {
        let lits = solver
            .model()
            .ok_or_else(|| GroupMeetError::Solver("satisfiable verdict without a model".into()))?;
        let mut values = vec![false; encoding.formula.var_count()];
        for lit in lits {
            let idx = lit.var().index();
            if idx >= values.len() {
                values.resize(idx + 1, false);
            }
            values[idx] = lit.is_positive();
        }
        Ok(SolveOutcome::Satisfiable(Model { values }))
    } else {
        let labels: HashMap<_, _> = encoding
            .selectors
            .iter()
            .map(|(sel, label)| (sel.var(), label.clone()))
            .collect();
        let mut core: Vec<String> = solver
            .failed_core()
            .unwrap_or(&[])
            .iter()
            .filter_map(|lit| labels.get(&lit.var()).cloned())
            .collect();
        core.sort();
        core.dedup();
        Ok(SolveOutcome::Unsatisfiable(core))
    }
}
