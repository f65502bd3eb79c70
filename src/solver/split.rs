/*!
Variable-elimination solver.

The solver keeps a frontier of partial formulas, each a residual clause list
paired with the literals fixed true to reach it. Every step takes the next
variable `v`, pulls the still untouched input clauses mentioning `v` into every
partial formula, and replaces each formula by its two residuals under `v = true`
and `v = false`. Residuals containing an empty clause are dropped and identical
residuals are kept once, which keeps the frontier small when many branches
converge. The formula is satisfiable as soon as a residual without clauses
appears after the last input clause has been pulled in, and unsatisfiable
when the frontier runs dry.
*/

use std::collections::VecDeque;

use typed_index_collections::TiVec;

use crate::cancel::CancelToken;
use crate::formula::{Cnf, Literal, Model, TriClause, Variable};
use crate::normalize::normalize;
use crate::prelude::*;

use self::frontier::{Frontier, PartialFormula};
use self::order::{initial_order, reorder, PolarityTable};

use super::{Error, InvariantViolation, Normalization, SolveTimedOut, Solver};

mod frontier;
mod order;

/// The cancel token is polled for the first formula of every step and then
/// once per this many formulas. Must be a power of two.
pub const CANCEL_CHECK_STRIDE: usize = 0x2000;

#[derive(Clone, Copy, Debug)]
pub struct StepStats {
    pub variable: Variable,
    /// Residual formulas offered to the frontier.
    pub candidates: usize,
    /// Residual formulas kept after deduplication.
    pub retained: usize,
}

#[derive(Clone, Debug, Default)]
pub struct Stats {
    pub steps: Vec<StepStats>,
    pub peak_frontier: usize,
    pub auxiliary_variables: usize,
}

/// Clauses of one split, and whether each side produced an empty clause.
struct Branches {
    when_true: Vec<TriClause>,
    when_false: Vec<TriClause>,
    true_falsified: bool,
    false_falsified: bool,
}

impl Branches {
    fn with_capacity(capacity: usize) -> Self {
        Branches {
            when_true: Vec::with_capacity(capacity),
            when_false: Vec::with_capacity(capacity),
            true_falsified: false,
            false_falsified: false,
        }
    }
}

fn note_unit(clause: &TriClause, units: &mut Vec<Literal>) {
    if clause.is_unit() {
        if let Some(literal) = clause.first() {
            if !units.contains(&literal) {
                units.push(literal);
            }
        }
    }
}

/// Splits `clause` on `variable`: a clause containing `v` is satisfied by
/// `v = true` and shrinks under `v = false`, and symmetrically for `¬v`.
fn split_clause(
    clause: TriClause,
    variable: Variable,
    branches: &mut Branches,
    units: &mut Vec<Literal>,
) -> Result<(), Error> {
    let positive = variable.literal(true);

    if let Some(index) = clause.position(positive) {
        let mut reduced = clause;
        reduced.remove_at(index).context(InvariantViolation)?;
        branches.false_falsified |= reduced.is_empty();
        note_unit(&reduced, units);
        branches.when_false.push(reduced);
    } else if let Some(index) = clause.position(!positive) {
        let mut reduced = clause;
        reduced.remove_at(index).context(InvariantViolation)?;
        branches.true_falsified |= reduced.is_empty();
        note_unit(&reduced, units);
        branches.when_true.push(reduced);
    } else {
        note_unit(&clause, units);
        branches.when_true.push(clause);
        branches.when_false.push(clause);
    }

    Ok(())
}

#[derive(Debug)]
pub struct SplitSolver {
    formula: Cnf,
    cancel: CancelToken,
    stats: Stats,
}

impl SplitSolver {
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    fn check_cancel(&self) -> Result<(), Error> {
        if self.cancel.is_cancelled() {
            warn!(
                "Cancelled after {} expansion steps",
                self.stats.steps.len()
            );
            return SolveTimedOut.fail();
        }
        Ok(())
    }

    /// Runs the search and returns a satisfying assignment over the input's
    /// variables, or `None` if there is none.
    pub fn search(&mut self) -> Result<Option<TiVec<Variable, bool>>, Error> {
        self.stats = Stats::default();
        self.check_cancel()?;

        let normalized = normalize(&self.formula).context(Normalization)?;
        if normalized.contains_empty_clause() {
            info!("UNSAT: the formula contains an empty clause");
            return Ok(None);
        }

        let num_original = normalized.num_original_variables();
        let num_variables = normalized.num_variables();
        self.stats.auxiliary_variables = normalized.num_auxiliary_variables();

        let clauses = normalized.into_clauses();
        let order = VecDeque::from(initial_order(&clauses, num_variables));
        debug!(
            "Solving {} clauses over {} variables ({} auxiliary), {} to expand",
            clauses.len(),
            num_variables,
            self.stats.auxiliary_variables,
            order.len(),
        );

        let true_literals = match self.eliminate(clauses, order, num_variables)? {
            Some(true_literals) => true_literals,
            None => return Ok(None),
        };

        // Variables never fixed true are free or were fixed false.
        let mut assignment = vec![false; num_variables];
        for literal in true_literals {
            assignment[literal.variable().as_index()] = literal.positive();
        }
        assignment.truncate(num_original);

        Ok(Some(assignment.into()))
    }

    fn eliminate(
        &mut self,
        clauses: Vec<TriClause>,
        mut order: VecDeque<Variable>,
        num_variables: usize,
    ) -> Result<Option<Vec<Literal>>, Error> {
        if clauses.is_empty() {
            info!("SAT: every clause is a tautology");
            return Ok(Some(Vec::new()));
        }

        let mut frontier = vec![PartialFormula::empty()];
        let mut untouched = clauses;

        while let Some(variable) = order.pop_front() {

            let (touched, still_untouched): (Vec<_>, Vec<_>) = untouched
                .into_iter()
                .partition(|clause| clause.contains_variable(variable));

            let frontier_in = frontier.len();
            let (next, units) = self.expand(frontier, variable, &touched, num_variables)?;

            self.stats.peak_frontier = self.stats.peak_frontier.max(next.len());
            self.stats.steps.push(StepStats {
                variable,
                candidates: next.candidates(),
                retained: next.len(),
            });
            trace!(
                "Step {}: expanded {}, pulled in {} clauses, frontier {} -> {} ({} candidates), {} clauses untouched",
                self.stats.steps.len(),
                variable,
                touched.len(),
                frontier_in,
                next.len(),
                next.candidates(),
                still_untouched.len(),
            );

            if still_untouched.is_empty() && next.has_satisfied() {
                info!(
                    "SAT after {} steps (peak frontier {})",
                    self.stats.steps.len(),
                    self.stats.peak_frontier
                );
                return Ok(next.into_satisfied().map(PartialFormula::into_true_literals));
            }

            if next.is_empty() {
                break;
            }

            self.check_cancel()?;

            order = reorder(order, &still_untouched, &units, num_variables);
            frontier = next.into_formulas();
            untouched = still_untouched;
        }

        info!(
            "UNSAT after {} steps (peak frontier {})",
            self.stats.steps.len(),
            self.stats.peak_frontier
        );
        Ok(None)
    }

    /// Splits every formula of the frontier on `variable`, after appending the
    /// freshly touched clauses to it. Also returns how many residual formulas
    /// hold each unit literal.
    fn expand(
        &self,
        frontier: Vec<PartialFormula>,
        variable: Variable,
        touched: &[TriClause],
        num_variables: usize,
    ) -> Result<(Frontier, PolarityTable), Error> {
        let mut next = Frontier::with_capacity(frontier.len() * 2);
        let mut units = PolarityTable::new(num_variables);
        let mut branch_units = Vec::new();

        for (index, formula) in frontier.into_iter().enumerate() {
            if index & (CANCEL_CHECK_STRIDE - 1) == 0 {
                self.check_cancel()?;
            }

            // `variable` does not matter here, pass the formula on as is
            if touched.is_empty() && !formula.mentions(variable) {
                next.insert(formula);
                continue;
            }

            branch_units.clear();
            let mut branches = Branches::with_capacity(formula.clauses().len() + touched.len());
            for &clause in touched.iter().chain(formula.clauses()) {
                split_clause(clause, variable, &mut branches, &mut branch_units)?;
            }
            for &literal in &branch_units {
                units.record(literal);
            }

            // When both residuals agree the value of `variable` is irrelevant;
            // only the `true` side is kept.
            let identical = branches.when_true == branches.when_false;
            let true_literals = formula.into_true_literals();

            if !branches.true_falsified {
                let mut extended = Vec::with_capacity(true_literals.len() + 1);
                extended.extend_from_slice(&true_literals);
                extended.push(variable.literal(true));
                next.insert(PartialFormula::new(branches.when_true, extended));
            }
            if !branches.false_falsified && !identical {
                next.insert(PartialFormula::new(branches.when_false, true_literals));
            }
        }

        Ok((next, units))
    }
}

impl Solver for SplitSolver {
    fn new(formula: Cnf, cancel: CancelToken) -> Self {
        SplitSolver {
            formula,
            cancel,
            stats: Stats::default(),
        }
    }

    fn solve(mut self) -> Result<Option<Model>, Error> {
        let assignment = self.search()?;
        Ok(assignment.map(|assignment| Model::new(self.formula, assignment)))
    }
}
