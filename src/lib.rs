#[macro_use]
extern crate log;

pub mod cancel;
pub mod check;
pub mod formula;
pub mod generate;
pub mod normalize;
pub mod parser;
pub mod prelude;
pub mod report;
pub mod solver;

pub use check::{check_satisfiable, check_satisfiable_dimacs};

#[cfg(test)]
mod tests;
