use crate::cancel::CancelToken;
use crate::formula::{ClauseError, Cnf, Model};
use crate::normalize;
use crate::prelude::*;

pub mod split;
mod truth_table;

pub use split::SplitSolver;
pub use truth_table::TruthTableSolver;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("CNF solving has timed out"))]
    SolveTimedOut,
    #[snafu(display("A clause invariant was violated during solving"))]
    InvariantViolation { source: ClauseError },
    #[snafu(display("Failed to normalize the formula"))]
    Normalization { source: normalize::Error },
    #[snafu(display(
        "{} variables exceed the exhaustive search limit of {}",
        count,
        limit
    ))]
    TooManyVariables { count: usize, limit: usize },
}

pub trait Solver {
    /// Creates a new solver instance that polls `cancel` while it works.
    fn new(formula: Cnf, cancel: CancelToken) -> Self;

    /// Solves a CNF SAT problem with the solver.
    /// Returns `Ok(Some(Model))` if satisfiable, `Ok(None)` otherwise.
    fn solve(self) -> Result<Option<Model>, Error>;
}
