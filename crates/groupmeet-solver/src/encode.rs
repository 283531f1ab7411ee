//! Constraint construction.
//!
//! Builds the boolean variable grid (one variable per student x unit,
//! "student is assigned to unit") and the full labeled constraint set
//! over it. Every rule is guarded by a fresh selector literal; the
//! selectors are assumed at solve time, so an unsatisfiable verdict
//! comes back as a set of rule labels instead of opaque clause
//! indices.
//!
//! Rule families, mirroring the run's semantics:
//! 1. coverage - each student lands in one of their candidate units
//! 2. pruning - all other units are forbidden (exclusion-derived
//!    vetoes carry their own label)
//! 3. uniqueness - at most one candidate unit per student
//! 4. size-from-set - each unit's occupancy is drawn from the allowed
//!    size set (0 meaning unused)
//! 5. partner co-assignment
//! 6. closure of full-size partner groups
//! 7. default-size placement for partnerless students

use std::collections::BTreeSet;

use varisat::{CnfFormula, ExtendFormula, Lit};

use groupmeet_core::{
    ExpandedAvailability, GroupSizePolicy, NormalizedPreferences, ProblemIndex, Unit,
};

use crate::card::Totalizer;

/// The encoded problem instance handed to the solver boundary.
#[derive(Debug)]
pub struct Encoding {
    pub formula: CnfFormula,
    /// `grid[student][unit]` - positive literal for "student assigned
    /// to unit". Only literals over candidate units appear in any
    /// satisfiable-direction constraint; the decoder must not consult
    /// anything else.
    pub grid: Vec<Vec<Lit>>,
    /// Selector literal and human-readable label per tracked rule.
    pub selectors: Vec<(Lit, String)>,
    /// Per student, ascending ids of units they may be assigned to.
    pub available: Vec<Vec<usize>>,
}

/// Collects the formula and the tracked selector literals.
struct ConstraintSink {
    formula: CnfFormula,
    selectors: Vec<(Lit, String)>,
}

impl ConstraintSink {
    /// Registers a labeled rule and returns its selector literal.
    fn tracked(&mut self, label: String) -> Lit {
        let selector = self.formula.new_lit();
        self.selectors.push((selector, label));
        selector
    }

    /// Adds one clause of a tracked rule: `clause` holds whenever the
    /// rule's selector is assumed.
    fn clause(&mut self, selector: Lit, lits: &[Lit]) {
        let mut guarded = Vec::with_capacity(lits.len() + 1);
        guarded.extend_from_slice(lits);
        guarded.push(!selector);
        self.formula.add_clause(&guarded);
    }
}

/// Builds the complete constraint set for one run.
///
/// Consumes nothing: all inputs stay owned by the caller, and the
/// returned [`Encoding`] holds only ids and literals.
pub fn encode(
    index: &ProblemIndex,
    expanded: &ExpandedAvailability,
    prefs: &NormalizedPreferences,
    policy: &GroupSizePolicy,
) -> Encoding {
    let n_students = index.students.len();
    let n_units = index.units.len();

    let mut sink = ConstraintSink {
        formula: CnfFormula::new(),
        selectors: Vec::new(),
    };

    // The variable grid comes first so it occupies the low indices.
    let grid: Vec<Vec<Lit>> = (0..n_students)
        .map(|_| (0..n_units).map(|_| sink.formula.new_lit()).collect())
        .collect();

    // Availability in id space. Both sets come out of ordered maps, so
    // the id lists are ascending.
    let mut available = vec![Vec::new(); n_students];
    let mut barred = vec![Vec::new(); n_students];
    let mut partner_ids = vec![Vec::new(); n_students];
    for (sid, login) in index.students.iter() {
        available[sid] = unit_ids(index, expanded.available.get(login));
        barred[sid] = unit_ids(index, expanded.barred.get(login));
        partner_ids[sid] = prefs
            .partners_of(login)
            .iter()
            .filter_map(|p| index.students.id_of(p))
            .collect();
    }
    let candidates: Vec<Vec<usize>> = (0..n_students)
        .map(|sid| {
            let mut merged = available[sid].clone();
            merged.extend_from_slice(&barred[sid]);
            merged.sort_unstable();
            merged
        })
        .collect();
    // Per unit: students that could occupy it. This is what bounds the
    // cardinality counters, rather than the whole roster.
    let mut unit_candidates: Vec<Vec<usize>> = vec![Vec::new(); n_units];
    for (sid, units) in candidates.iter().enumerate() {
        for &uid in units {
            unit_candidates[uid].push(sid);
        }
    }

    encode_per_student(&mut sink, index, &grid, &barred, &candidates, n_units);
    let totalizers = encode_unit_sizes(&mut sink, index, &grid, &unit_candidates, policy);
    encode_partner_rules(
        &mut sink,
        index,
        &grid,
        &candidates,
        &unit_candidates,
        &partner_ids,
        policy,
    );
    encode_solo_rules(
        &mut sink, index, &grid, &available, &partner_ids, &totalizers, policy,
    );

    Encoding {
        formula: sink.formula,
        grid,
        selectors: sink.selectors,
        available,
    }
}

fn unit_ids(index: &ProblemIndex, units: Option<&BTreeSet<Unit>>) -> Vec<usize> {
    units
        .into_iter()
        .flatten()
        .filter_map(|u| index.units.id_of(u))
        .collect()
}

/// Rules 1-3: coverage, pruning, uniqueness.
fn encode_per_student(
    sink: &mut ConstraintSink,
    index: &ProblemIndex,
    grid: &[Vec<Lit>],
    barred: &[Vec<usize>],
    candidates: &[Vec<usize>],
    n_units: usize,
) {
    for (sid, login) in index.students.iter() {
        // Coverage over every candidate unit, barred ones included:
        // the veto clauses below keep barred units unreachable, and an
        // infeasible exclusion then surfaces in the core by name.
        let selector = sink.tracked(format!("{login} is assigned"));
        let clause: Vec<Lit> = candidates[sid].iter().map(|&uid| grid[sid][uid]).collect();
        sink.clause(selector, &clause);

        let mut is_candidate = vec![false; n_units];
        for &uid in &candidates[sid] {
            is_candidate[uid] = true;
        }
        for uid in 0..n_units {
            if !is_candidate[uid] {
                let unit = index.units.get(uid);
                let selector = sink.tracked(format!("{login} is not assigned to {unit}"));
                sink.clause(selector, &[!grid[sid][uid]]);
            }
        }
        for &uid in &barred[sid] {
            let unit = index.units.get(uid);
            let selector = sink.tracked(format!(
                "{login} is blocked from {unit} by mentor {}",
                unit.mentor
            ));
            sink.clause(selector, &[!grid[sid][uid]]);
        }

        // At most one candidate unit; self is skipped by position.
        for (i, &uid) in candidates[sid].iter().enumerate() {
            let unit = index.units.get(uid);
            let selector = sink.tracked(format!("{login} assignment to {unit} is unique"));
            for (j, &other) in candidates[sid].iter().enumerate() {
                if j != i {
                    sink.clause(selector, &[!grid[sid][uid], !grid[sid][other]]);
                }
            }
        }
    }
}

/// Rule 4: per-unit occupancy drawn from the allowed size set.
///
/// Returns the per-unit counters for reuse by the default-size rule.
fn encode_unit_sizes(
    sink: &mut ConstraintSink,
    index: &ProblemIndex,
    grid: &[Vec<Lit>],
    unit_candidates: &[Vec<usize>],
    policy: &GroupSizePolicy,
) -> Vec<Totalizer> {
    let sizes: Vec<u32> = policy.sizes().collect();
    let size_list = sizes
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let mut totalizers = Vec::with_capacity(unit_candidates.len());
    for (uid, members) in unit_candidates.iter().enumerate() {
        let inputs: Vec<Lit> = members.iter().map(|&sid| grid[sid][uid]).collect();
        let totalizer = Totalizer::build(&mut sink.formula, &inputs);

        let unit = index.units.get(uid);
        let selector = sink.tracked(format!("{unit} size drawn from {{{size_list}}}"));

        // No more than the largest allowed size.
        if let Some(over) = totalizer.at_least(policy.max_size() + 1) {
            sink.clause(selector, &[!over]);
        }
        // No occupancy strictly between two consecutive allowed sizes:
        // reaching low + 1 forces reaching the next allowed size.
        for pair in sizes.windows(2) {
            let (low, high) = (pair[0], pair[1]);
            if high > low + 1 {
                if let Some(enter_gap) = totalizer.at_least(low + 1) {
                    match totalizer.at_least(high) {
                        Some(reach) => sink.clause(selector, &[!enter_gap, reach]),
                        // The unit cannot reach the next allowed size
                        // at all, so the gap must not be entered.
                        None => sink.clause(selector, &[!enter_gap]),
                    }
                }
            }
        }
        totalizers.push(totalizer);
    }
    totalizers
}

/// Rules 5 and 6: partner co-assignment and closure of full groups.
fn encode_partner_rules(
    sink: &mut ConstraintSink,
    index: &ProblemIndex,
    grid: &[Vec<Lit>],
    candidates: &[Vec<usize>],
    unit_candidates: &[Vec<usize>],
    partner_ids: &[Vec<usize>],
    policy: &GroupSizePolicy,
) {
    let mut seen_cliques: BTreeSet<Vec<usize>> = BTreeSet::new();

    for (sid, login) in index.students.iter() {
        if partner_ids[sid].is_empty() {
            continue;
        }

        // Wherever this student goes, every declared partner follows.
        // Asserted per member, so the relation binds group-wide even
        // when it is not transitive.
        for &uid in &candidates[sid] {
            let unit = index.units.get(uid);
            let selector = sink.tracked(format!("{login} partners follow into {unit}"));
            for &pid in &partner_ids[sid] {
                sink.clause(selector, &[!grid[sid][uid], grid[pid][uid]]);
            }
        }

        // A partner set that already forms an allowed size closes its
        // unit to outsiders. Emitted once per distinct clique; rule 5
        // makes any member's assignment pull this student along, so
        // anchoring the closure on them covers the whole clique.
        let mut clique: Vec<usize> = partner_ids[sid].clone();
        clique.push(sid);
        clique.sort_unstable();
        clique.dedup();
        if !policy.allowed_sizes.contains(&(clique.len() as u32)) {
            continue;
        }
        if !seen_cliques.insert(clique.clone()) {
            continue;
        }
        for &uid in &candidates[sid] {
            let unit = index.units.get(uid);
            let selector =
                sink.tracked(format!("{unit} is closed to outsiders of {login}'s group"));
            for &other in &unit_candidates[uid] {
                if !clique.contains(&other) {
                    sink.clause(selector, &[!grid[sid][uid], !grid[other][uid]]);
                }
            }
        }
    }
}

/// Rule 7: a partnerless student sits in a default-size group.
fn encode_solo_rules(
    sink: &mut ConstraintSink,
    index: &ProblemIndex,
    grid: &[Vec<Lit>],
    available: &[Vec<usize>],
    partner_ids: &[Vec<usize>],
    totalizers: &[Totalizer],
    policy: &GroupSizePolicy,
) {
    let default_size = policy.default_size;
    for (sid, login) in index.students.iter() {
        if !partner_ids[sid].is_empty() {
            continue;
        }
        for &uid in &available[sid] {
            let unit = index.units.get(uid);
            let selector = sink.tracked(format!(
                "{login} requires a group of {default_size} in {unit}"
            ));
            let counter = &totalizers[uid];
            match counter.at_least(default_size) {
                Some(reach) => sink.clause(selector, &[!grid[sid][uid], reach]),
                // Too few possible members to ever reach the default
                // size; the unit is off-limits for solo students.
                None => sink.clause(selector, &[!grid[sid][uid]]),
            }
            if let Some(over) = counter.at_least(default_size + 1) {
                sink.clause(selector, &[!grid[sid][uid], !over]);
            }
        }
    }
}
