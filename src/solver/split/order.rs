//! Decides which variable the engine eliminates next.

use std::cmp::{Ordering, Reverse};
use std::collections::VecDeque;

use typed_index_collections::TiVec;

use crate::formula::{Literal, TriClause, Variable};

/// Positive and negative occurrence counts of one variable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Polarity {
    pub positive: usize,
    pub negative: usize,
}

impl Polarity {
    fn record(&mut self, literal: Literal) {
        if literal.positive() {
            self.positive += 1;
        } else {
            self.negative += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative
    }

    /// `|p - n| / (p + n)` as an exact fraction. A variable occurring in only
    /// one polarity has skew 1.
    pub fn skew(&self) -> Skew {
        Skew {
            numerator: (self.positive as i64 - self.negative as i64).unsigned_abs(),
            denominator: self.total() as u64,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Skew {
    numerator: u64,
    denominator: u64,
}

impl PartialEq for Skew {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Skew {}

impl PartialOrd for Skew {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Skew {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.numerator * other.denominator).cmp(&(other.numerator * self.denominator))
    }
}

/// Per-variable occurrence table.
#[derive(Debug)]
pub struct PolarityTable(TiVec<Variable, Polarity>);

impl PolarityTable {
    pub fn new(num_variables: usize) -> Self {
        PolarityTable(vec![Polarity::default(); num_variables].into())
    }

    pub fn record(&mut self, literal: Literal) {
        self.0[literal.variable()].record(literal);
    }

    pub fn get(&self, variable: Variable) -> Polarity {
        self.0.get(variable).copied().unwrap_or_default()
    }
}

/// Variables occurring in `clauses`, most skewed first, ties by id.
pub fn initial_order(clauses: &[TriClause], num_variables: usize) -> Vec<Variable> {
    let mut occurrences = PolarityTable::new(num_variables);
    for clause in clauses {
        for literal in clause.iter() {
            occurrences.record(literal);
        }
    }

    let mut order = (0..num_variables)
        .map(Variable::from)
        .filter(|&variable| occurrences.get(variable).total() > 0)
        .collect::<Vec<_>>();
    order.sort_by_key(|&variable| Reverse(occurrences.get(variable).skew()));
    order
}

/// Reorders the variables left to expand after a step:
///
/// 1. variables absent from every untouched clause, so expanding them pulls
///    in no new clauses;
/// 2. larger `min(positive, negative)` unit-clause count;
/// 3. larger total unit-clause count.
///
/// The sort is stable, so remaining ties keep their previous order.
pub fn reorder(
    mut remaining: VecDeque<Variable>,
    untouched: &[TriClause],
    units: &PolarityTable,
    num_variables: usize,
) -> VecDeque<Variable> {
    let mut pending: TiVec<Variable, bool> = vec![false; num_variables].into();
    for clause in untouched {
        for literal in clause.iter() {
            pending[literal.variable()] = true;
        }
    }

    remaining.make_contiguous().sort_by_key(|&variable| {
        let tally = units.get(variable);
        (
            pending[variable],
            Reverse(tally.positive.min(tally.negative)),
            Reverse(tally.total()),
        )
    });
    remaining
}
