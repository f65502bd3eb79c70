/*!
Rewrites an input formula into clauses of at most three literals.

Within each clause repeated literals are dropped and tautologies (a literal
together with its negation) remove the clause altogether. Clauses wider than
three literals are then split by introducing auxiliary variables: `(l1 ∨ l2 ∨
... ∨ lk)` becomes `(l1 ∨ l2 ∨ a) ∧ (l3 ∨ ... ∨ lk ∨ ¬a)`, and the second half
is split again until it fits. The result is equisatisfiable with the input,
and any model of it restricted to the original variables is a model of the
input.
*/

use crate::formula::{Clause, ClauseError, Cnf, Literal, TriClause, Variable};
use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to build a three-literal clause"))]
    ClauseConstruction { source: ClauseError },
    #[snafu(display(
        "No variable id is left for an auxiliary variable after {} variables",
        num_variables
    ))]
    VariableIdsExhausted { num_variables: usize },
}

/// A formula whose clauses all fit into a [`TriClause`].
#[derive(Debug, Clone)]
pub struct Normalized {
    clauses: Vec<TriClause>,
    num_original_variables: usize,
    num_variables: usize,
    contains_empty_clause: bool,
}

impl Normalized {
    pub fn clauses(&self) -> &[TriClause] {
        &self.clauses
    }

    pub fn into_clauses(self) -> Vec<TriClause> {
        self.clauses
    }

    /// Variable count including auxiliary variables.
    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn num_original_variables(&self) -> usize {
        self.num_original_variables
    }

    pub fn num_auxiliary_variables(&self) -> usize {
        self.num_variables - self.num_original_variables
    }

    /// An input clause had no literals, so the formula is unsatisfiable.
    pub fn contains_empty_clause(&self) -> bool {
        self.contains_empty_clause
    }

    pub fn to_cnf(&self) -> Cnf {
        let mut cnf = Cnf::new(self.num_variables);
        for &clause in &self.clauses {
            cnf.add_clause(clause.into());
        }
        if self.contains_empty_clause {
            cnf.add_clause(Clause::new(Vec::new()));
        }
        cnf
    }
}

/// Owns the auxiliary variable counter for one normalization.
struct Normalizer {
    num_variables: usize,
}

impl Normalizer {
    fn fresh_variable(&mut self) -> Result<Variable, Error> {
        let variable = Variable::from_index(self.num_variables).context(VariableIdsExhausted {
            num_variables: self.num_variables,
        })?;
        self.num_variables += 1;
        Ok(variable)
    }

    fn split_wide(&mut self, clauses: &mut Vec<Vec<Literal>>) -> Result<(), Error> {
        let mut index = 0;
        while index < clauses.len() {
            if clauses[index].len() > TriClause::CAPACITY {
                let auxiliary = self.fresh_variable()?.literal(true);

                let mut rest = clauses[index].split_off(2);
                rest.push(!auxiliary);
                clauses[index].push(auxiliary);
                clauses.push(rest);
            }
            index += 1;
        }
        Ok(())
    }
}

/// Drops repeated literals, scanning from the back so the last occurrence
/// survives. Returns `None` for a tautology.
pub fn simplify_clause(literals: &[Literal]) -> Option<Vec<Literal>> {
    let mut kept = literals.to_vec();
    let mut seen = Vec::with_capacity(kept.len());

    for index in (0..kept.len()).rev() {
        let literal = kept[index];
        if seen.contains(&literal) {
            kept.remove(index);
        } else if seen.contains(&!literal) {
            return None;
        } else {
            seen.push(literal);
        }
    }

    Some(kept)
}

pub fn normalize(formula: &Cnf) -> Result<Normalized, Error> {
    let mut contains_empty_clause = false;
    let mut tautologies = 0;

    let mut simplified = Vec::with_capacity(formula.clauses().len());
    for clause in formula.clauses() {
        match simplify_clause(clause.literals()) {
            None => tautologies += 1,
            Some(literals) if literals.is_empty() => contains_empty_clause = true,
            Some(literals) => simplified.push(literals),
        }
    }

    let mut normalizer = Normalizer {
        num_variables: formula.num_variables(),
    };
    normalizer.split_wide(&mut simplified)?;

    let clauses = simplified
        .iter()
        .map(|literals| TriClause::from_literals(literals))
        .collect::<Result<Vec<_>, _>>()
        .context(ClauseConstruction)?;

    debug!(
        "Normalized {} clauses into {} ({} tautologies dropped, {} auxiliary variables)",
        formula.clauses().len(),
        clauses.len(),
        tautologies,
        normalizer.num_variables - formula.num_variables(),
    );

    Ok(Normalized {
        clauses,
        num_original_variables: formula.num_variables(),
        num_variables: normalizer.num_variables,
        contains_empty_clause,
    })
}
