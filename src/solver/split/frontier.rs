use std::collections::HashMap;

use crate::formula::{Literal, TriClause, Variable};

/// A residual clause list together with the literals fixed true on the way
/// to it, in decision order.
///
/// Invariant: no clause is empty. A branch producing an empty clause is
/// discarded before a `PartialFormula` is built for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialFormula {
    clauses: Vec<TriClause>,
    true_literals: Vec<Literal>,
}

impl PartialFormula {
    pub fn new(clauses: Vec<TriClause>, true_literals: Vec<Literal>) -> Self {
        debug_assert!(clauses.iter().all(|clause| !clause.is_empty()));
        PartialFormula {
            clauses,
            true_literals,
        }
    }

    pub fn empty() -> Self {
        Default::default()
    }

    pub fn clauses(&self) -> &[TriClause] {
        &self.clauses
    }

    pub fn true_literals(&self) -> &[Literal] {
        &self.true_literals
    }

    pub fn into_true_literals(self) -> Vec<Literal> {
        self.true_literals
    }

    /// No clauses remain, so every clause seen so far is satisfied.
    pub fn is_satisfied(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn mentions(&self, variable: Variable) -> bool {
        self.clauses
            .iter()
            .any(|clause| clause.contains_variable(variable))
    }

    fn fingerprint(&self) -> u64 {
        self.clauses.iter().fold(0u64, |hash, clause| {
            (hash ^ u64::from(clause.fingerprint())).rotate_left(1)
        })
    }
}

/// The formulas produced by one expansion step.
///
/// Insertion drops a formula whose clause list is identical, clause for
/// clause and in order, to one already kept; the first one inserted wins.
/// Candidates are bucketed by clause count, then compared by fingerprint,
/// then in full.
#[derive(Debug, Default)]
pub struct Frontier {
    formulas: Vec<PartialFormula>,
    buckets: HashMap<usize, Vec<(u64, usize)>>,
    candidates: usize,
    satisfied: Option<usize>,
}

impl Frontier {
    pub fn with_capacity(capacity: usize) -> Self {
        Frontier {
            formulas: Vec::with_capacity(capacity),
            ..Default::default()
        }
    }

    /// Keeps `formula` unless an identical one is present. Returns whether it
    /// was kept.
    pub fn insert(&mut self, formula: PartialFormula) -> bool {
        self.candidates += 1;

        let hash = formula.fingerprint();
        let bucket = self.buckets.entry(formula.clauses.len()).or_default();
        let formulas = &self.formulas;
        if bucket
            .iter()
            .any(|&(other, index)| other == hash && formulas[index].clauses == formula.clauses)
        {
            return false;
        }

        let index = self.formulas.len();
        bucket.push((hash, index));
        if formula.is_satisfied() {
            self.satisfied = Some(index);
        }
        self.formulas.push(formula);
        true
    }

    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }

    /// Number of formulas offered to `insert`, kept or not.
    pub fn candidates(&self) -> usize {
        self.candidates
    }

    pub fn has_satisfied(&self) -> bool {
        self.satisfied.is_some()
    }

    /// The formula without clauses, if one was inserted.
    pub fn into_satisfied(mut self) -> Option<PartialFormula> {
        let index = self.satisfied?;
        Some(self.formulas.swap_remove(index))
    }

    pub fn into_formulas(self) -> Vec<PartialFormula> {
        self.formulas
    }
}
