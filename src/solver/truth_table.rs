use typed_index_collections::TiVec;

use crate::cancel::CancelToken;
use crate::formula::{Cnf, Model, Variable};
use crate::prelude::*;

use super::{Error, SolveTimedOut, Solver, TooManyVariables};

/// Enumerates every assignment. Only usable for small formulas, where it
/// serves as a reference to compare other solvers against.
#[derive(Debug)]
pub struct TruthTableSolver {
    formula: Cnf,
    cancel: CancelToken,
}

impl TruthTableSolver {
    pub const MAX_VARIABLES: usize = 24;
}

impl Solver for TruthTableSolver {
    fn new(formula: Cnf, cancel: CancelToken) -> Self {
        TruthTableSolver { formula, cancel }
    }

    fn solve(self) -> Result<Option<Model>, Error> {
        let num_variables = self.formula.num_variables();
        ensure!(
            num_variables <= Self::MAX_VARIABLES,
            TooManyVariables {
                count: num_variables,
                limit: Self::MAX_VARIABLES,
            }
        );

        let mut assignment: TiVec<Variable, bool> = vec![false; num_variables].into();
        for bits in 0u32..(1 << num_variables) {
            if bits & 0xFFF == 0 && self.cancel.is_cancelled() {
                return SolveTimedOut.fail();
            }

            for index in 0..num_variables {
                assignment[Variable::from(index)] = (bits >> index) & 1 == 1;
            }
            if self.formula.evaluate(&assignment) {
                return Ok(Some(Model::new(self.formula, assignment)));
            }
        }

        Ok(None)
    }
}
