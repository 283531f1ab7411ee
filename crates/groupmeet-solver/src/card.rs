//! Totalizer cardinality encoding.
//!
//! Counts how many of a set of literals are true in unary: a balanced
//! merge tree whose root outputs `o_1..o_n` satisfy `o_k` iff at least
//! `k` inputs are true. Clauses are emitted in both directions, so the
//! outputs are exact, not just one-sided bounds. Group-size rules are
//! then single clauses over the outputs instead of an exact-count
//! constraint over the whole grid.

use varisat::{ExtendFormula, Lit};

/// Unary occupancy counter over a fixed set of input literals.
#[derive(Debug, Clone)]
pub struct Totalizer {
    outputs: Vec<Lit>,
}

impl Totalizer {
    /// Builds the counter, adding its defining clauses to `formula`.
    ///
    /// The defining clauses are satisfiable under every assignment of
    /// the inputs (the outputs are simply forced to the unary count),
    /// so they never need a selector guard.
    pub fn build(formula: &mut impl ExtendFormula, inputs: &[Lit]) -> Self {
        Self {
            outputs: merge_tree(formula, inputs),
        }
    }

    /// Number of inputs counted.
    pub fn input_count(&self) -> usize {
        self.outputs.len()
    }

    /// Literal that is true iff at least `k` inputs are true.
    ///
    /// Returns `None` when `k` exceeds the input count: that count is
    /// unreachable and the caller should treat the bound as false.
    /// `k` must be at least 1.
    pub fn at_least(&self, k: u32) -> Option<Lit> {
        debug_assert!(k >= 1, "at_least(0) is trivially true");
        self.outputs.get(k as usize - 1).copied()
    }
}

fn merge_tree(formula: &mut impl ExtendFormula, inputs: &[Lit]) -> Vec<Lit> {
    match inputs.len() {
        0 => Vec::new(),
        1 => vec![inputs[0]],
        n => {
            let (left, right) = inputs.split_at(n / 2);
            let a = merge_tree(formula, left);
            let b = merge_tree(formula, right);
            merge(formula, &a, &b)
        }
    }
}

/// Merges two child counters into one, with fresh output literals.
fn merge(formula: &mut impl ExtendFormula, a: &[Lit], b: &[Lit]) -> Vec<Lit> {
    let (na, nb) = (a.len(), b.len());
    let outputs: Vec<Lit> = (0..na + nb).map(|_| formula.new_lit()).collect();

    for i in 0..=na {
        for j in 0..=nb {
            let k = i + j;
            // left >= i and right >= j force total >= i + j
            if k > 0 {
                let mut clause = Vec::with_capacity(3);
                if i > 0 {
                    clause.push(!a[i - 1]);
                }
                if j > 0 {
                    clause.push(!b[j - 1]);
                }
                clause.push(outputs[k - 1]);
                formula.add_clause(&clause);
            }
            // total >= i + j + 1 forces left >= i + 1 or right >= j + 1
            if k < na + nb {
                let mut clause = Vec::with_capacity(3);
                clause.push(!outputs[k]);
                if i < na {
                    clause.push(a[i]);
                }
                if j < nb {
                    clause.push(b[j]);
                }
                formula.add_clause(&clause);
            }
        }
    }
    outputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use varisat::{CnfFormula, Solver};

    /// Forces an exact input count through the outputs and checks the
    /// solver agrees, for every count over a small input set.
    #[test]
    fn test_outputs_track_exact_counts() {
        let n = 5u32;
        for want in 0..=n {
            let mut formula = CnfFormula::new();
            let inputs: Vec<Lit> = (0..n).map(|_| formula.new_lit()).collect();
            let totalizer = Totalizer::build(&mut formula, &inputs);

            // count >= want, count < want + 1
            if want >= 1 {
                let lit = totalizer.at_least(want).unwrap();
                formula.add_clause(&[lit]);
            }
            if let Some(lit) = totalizer.at_least(want + 1) {
                formula.add_clause(&[!lit]);
            }

            let mut solver = Solver::new();
            solver.add_formula(&formula);
            assert!(solver.solve().unwrap(), "count {want} should be feasible");
            let model = solver.model().unwrap();
            let mut truth = vec![false; formula.var_count()];
            for lit in model {
                truth[lit.var().index()] = lit.is_positive();
            }
            let count = inputs.iter().filter(|l| truth[l.var().index()]).count();
            assert_eq!(count as u32, want);
        }
    }

    #[test]
    fn test_overconstrained_count_is_unsat() {
        let mut formula = CnfFormula::new();
        let inputs: Vec<Lit> = (0..3).map(|_| formula.new_lit()).collect();
        let totalizer = Totalizer::build(&mut formula, &inputs);

        // all three inputs true but count must stay below 2
        for lit in &inputs {
            formula.add_clause(&[*lit]);
        }
        formula.add_clause(&[!totalizer.at_least(2).unwrap()]);

        let mut solver = Solver::new();
        solver.add_formula(&formula);
        assert!(!solver.solve().unwrap());
    }

    #[test]
    fn test_empty_and_singleton_inputs() {
        let mut formula = CnfFormula::new();
        let empty = Totalizer::build(&mut formula, &[]);
        assert_eq!(empty.input_count(), 0);
        assert!(empty.at_least(1).is_none());

        let lone = formula.new_lit();
        let single = Totalizer::build(&mut formula, &[lone]);
        assert_eq!(single.at_least(1), Some(lone));
        assert!(single.at_least(2).is_none());
    }
}
