/*!
Entry points answering "is this formula satisfiable, and by which model".

Both return `(satisfiable, model)`. A timeout is an error, never a verdict.
*/

use std::collections::BTreeMap;

use crate::cancel::CancelToken;
use crate::formula::{Cnf, Model};
use crate::parser::{self, parse_dimacs_lines, parse_infix};
use crate::prelude::*;
use crate::solver::{self, Solver, SplitSolver};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Malformed CNF input"))]
    MalformedInput { source: parser::Error },
    #[snafu(display("Solving failed"))]
    Solve { source: solver::Error },
}

impl Error {
    pub fn is_timed_out(&self) -> bool {
        matches!(
            self,
            Error::Solve {
                source: solver::Error::SolveTimedOut
            }
        )
    }
}

fn solve(formula: Cnf, cancel: Option<&CancelToken>) -> Result<Option<Model>, Error> {
    let cancel = cancel.cloned().unwrap_or_else(CancelToken::none);
    SplitSolver::new(formula, cancel).solve().context(Solve)
}

/// Checks an infix CNF string such as `(a|b) & (!a|!b)`. Model keys are the
/// variable names of the input.
pub fn check_satisfiable(
    cnf: &str,
    cancel: Option<&CancelToken>,
) -> Result<(bool, Option<BTreeMap<String, bool>>), Error> {
    let (formula, names) = parse_infix(cnf).context(MalformedInput)?;

    let model = match solve(formula, cancel)? {
        Some(model) => model,
        None => return Ok((false, None)),
    };

    let values = names
        .iter()
        .filter_map(|(variable, name)| Some((name.to_owned(), model.value(variable)?)))
        .collect();
    Ok((true, Some(values)))
}

/// Checks DIMACS lines. Model keys are the DIMACS variable ids occurring in
/// some clause.
pub fn check_satisfiable_dimacs<I, S>(
    lines: I,
    cancel: Option<&CancelToken>,
) -> Result<(bool, Option<BTreeMap<u32, bool>>), Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let formula = parse_dimacs_lines(lines).context(MalformedInput)?;
    let mut occurring = formula
        .clauses()
        .iter()
        .flat_map(|clause| clause.iter().map(|literal| literal.variable()))
        .collect::<Vec<_>>();
    occurring.sort();
    occurring.dedup();

    let model = match solve(formula, cancel)? {
        Some(model) => model,
        None => return Ok((false, None)),
    };

    let values = occurring
        .into_iter()
        .filter_map(|variable| Some((variable.get(), model.value(variable)?)))
        .collect();
    Ok((true, Some(values)))
}
