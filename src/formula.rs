/*!
Variables, literals, clauses and formulas in conjunctive normal form.

Input formulas use [`Clause`], which may hold any number of literals.
The search engine only ever sees [`TriClause`]s, produced by the
[`normalize`](crate::normalize) module.
*/

use std::{
    collections::HashMap,
    convert::TryInto,
    fmt::Display,
    num::{NonZeroI32, NonZeroU32},
    str::FromStr,
};

use typed_index_collections::TiVec;

use crate::prelude::*;

mod tri_clause;

pub use tri_clause::{ClauseError, TriClause};

#[derive(Debug, Snafu)]
pub enum VariableParseError {
    #[snafu(display("Failed to parse Variable ID"))]
    ParseIntError { source: std::num::ParseIntError },
    #[snafu(display(
        "Variable ID {} is out of range (must be within 1 to {})",
        num,
        Variable::MAX_VARIABLE_ID
    ))]
    RangeError { num: u64 },
    #[snafu(display("Literal 0 is reserved as the clause terminator"))]
    ZeroLiteral,
}

/// Newtype wrapper for variable ID.
/// Invariant: 0 < ID <= MAX_VARIABLE_ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(NonZeroU32);

impl Variable {
    /// Literals are stored as `i32`, so the id must fit into one.
    pub const MAX_VARIABLE_ID: usize = std::i32::MAX as usize;
}

impl Variable {
    pub fn get(&self) -> u32 {
        self.0.get()
    }

    pub fn as_index(&self) -> usize {
        (self.0.get() - 1) as usize
    }

    /// Creates a variable from a raw index.
    /// Returns `None` if the index is invalid.
    pub fn from_index(index: usize) -> Option<Self> {
        let id = index.checked_add(1)?;
        if id > Variable::MAX_VARIABLE_ID {
            return None;
        }
        Some(Variable(NonZeroU32::new(id.try_into().ok()?)?))
    }

    pub fn literal(&self, positive: bool) -> Literal {
        Literal::new(*self, positive)
    }
}

/// Index conversion, used to key `TiVec` tables by variable.
impl From<usize> for Variable {
    fn from(index: usize) -> Self {
        Variable::from_index(index).expect("variable table outgrew the variable id range")
    }
}

impl From<Variable> for usize {
    fn from(variable: Variable) -> Self {
        variable.as_index()
    }
}

impl FromStr for Variable {
    type Err = VariableParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let num = s.parse::<u64>().context(ParseIntError)?;
        ensure!(num != 0, ZeroLiteral);
        let index: Option<usize> = (num - 1).try_into().ok();
        index
            .and_then(Variable::from_index)
            .context(RangeError { num })
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// A signed literal: the magnitude names the variable, the sign its polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal(NonZeroI32);

impl Literal {
    pub fn new(variable: Variable, positive: bool) -> Self {
        // MAX_VARIABLE_ID keeps every id inside i32
        let id = variable.get() as i32;
        let raw = if positive { id } else { -id };
        Literal(NonZeroI32::new(raw).expect("variable ids are non-zero"))
    }

    /// Wraps a raw signed literal, `None` for the 0 sentinel.
    pub fn from_raw(raw: i32) -> Option<Self> {
        if raw == std::i32::MIN {
            return None;
        }
        NonZeroI32::new(raw).map(Literal)
    }

    pub fn raw(&self) -> i32 {
        self.0.get()
    }

    pub fn variable(&self) -> Variable {
        Variable(NonZeroU32::new(self.0.get().unsigned_abs()).expect("literals are non-zero"))
    }

    pub fn positive(&self) -> bool {
        self.0.get() > 0
    }

    /// Evaluates the literal under a full assignment indexed by variable.
    pub fn evaluate(&self, assignment: &TiVec<Variable, bool>) -> bool {
        assignment[self.variable()] == self.positive()
    }
}

impl FromStr for Literal {
    type Err = VariableParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (positive, variable) = if let Some(rest) = s.strip_prefix('-') {
            (false, rest.parse::<Variable>()?)
        } else {
            (true, s.parse::<Variable>()?)
        };

        Ok(Literal::new(variable, positive))
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.positive() {
            write!(f, "!")?;
        }
        write!(f, "{}", self.variable())
    }
}

/// Writes literals in the infix clause syntax, `(x1|!x2)`.
pub(crate) fn write_disjunction(
    f: &mut std::fmt::Formatter<'_>,
    literals: impl Iterator<Item = Literal>,
) -> std::fmt::Result {
    write!(f, "(")?;
    for (i, literal) in literals.enumerate() {
        if i > 0 {
            write!(f, "|")?;
        }
        write!(f, "{}", literal)?;
    }
    write!(f, ")")
}

impl std::ops::Not for Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        Literal::new(self.variable(), !self.positive())
    }
}

/// Disjunction of any number of literals, as read from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    literals: Vec<Literal>,
}

impl Clause {
    pub fn new(literals: Vec<Literal>) -> Self {
        Self { literals }
    }

    pub fn num_literals(&self) -> usize {
        self.literals.len()
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn iter(&self) -> impl Iterator<Item = Literal> + '_ {
        self.literals.iter().copied()
    }

    pub fn evaluate(&self, assignment: &TiVec<Variable, bool>) -> bool {
        self.iter().any(|literal| literal.evaluate(assignment))
    }
}

impl From<TriClause> for Clause {
    fn from(clause: TriClause) -> Self {
        Clause::new(clause.iter().collect())
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_disjunction(f, self.iter())
    }
}

/// Conjunction of input clauses. `num_variables` covers every literal.
#[derive(Debug, Clone)]
pub struct Cnf {
    num_variables: usize,
    clauses: Vec<Clause>,
}

impl Cnf {
    pub fn new(num_variables: usize) -> Self {
        assert!(num_variables <= Variable::MAX_VARIABLE_ID);

        Cnf {
            num_variables,
            clauses: Vec::new(),
        }
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn clauses(&self) -> &Vec<Clause> {
        &self.clauses
    }

    /// Grows the variable count to at least `num_variables`.
    pub fn declare_variables(&mut self, num_variables: usize) {
        assert!(num_variables <= Variable::MAX_VARIABLE_ID);
        self.num_variables = self.num_variables.max(num_variables);
    }

    /// Adds a clause, growing the variable count to cover its literals.
    pub fn add_clause(&mut self, clause: Clause) {
        if let Some(max) = clause.iter().map(|l| l.variable().get() as usize).max() {
            self.num_variables = self.num_variables.max(max);
        }
        self.clauses.push(clause);
    }

    /// Evaluates every clause under a full assignment.
    ///
    /// # Panics
    ///
    /// Panics if `assignment` does not cover `num_variables` variables.
    pub fn evaluate(&self, assignment: &TiVec<Variable, bool>) -> bool {
        assert!(assignment.len() >= self.num_variables);
        self.clauses.iter().all(|clause| clause.evaluate(assignment))
    }
}

impl Display for Cnf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                write!(f, " & ")?;
            }
            write!(f, "{}", clause)?;
        }
        Ok(())
    }
}

/// Bidirectional map between textual variable names and dense ids.
#[derive(Debug, Clone, Default)]
pub struct VariableNames {
    ids: HashMap<String, Variable>,
    names: TiVec<Variable, String>,
}

impl VariableNames {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the id of `name`, minting the next dense id on first sight.
    pub fn intern(&mut self, name: &str) -> Variable {
        if let Some(&variable) = self.ids.get(name) {
            return variable;
        }

        let variable = Variable::from(self.names.len());
        self.names.push(name.to_owned());
        self.ids.insert(name.to_owned(), variable);
        variable
    }

    pub fn get(&self, name: &str) -> Option<Variable> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, variable: Variable) -> Option<&str> {
        self.names.get(variable).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Variable, &str)> + '_ {
        self.names
            .iter_enumerated()
            .map(|(variable, name)| (variable, name.as_str()))
    }
}

/// Represents a satisfying assignment for a formula.
#[derive(Debug)]
pub struct Model {
    formula: Cnf,
    assignment: TiVec<Variable, bool>,
}

impl Model {
    /// Creates a new model from a formula and an assignment.
    ///
    /// # Panics
    ///
    /// Panics when `assignment` is invalid (e.g., length mismatch, unsatisfying).
    pub fn new(formula: Cnf, assignment: TiVec<Variable, bool>) -> Self {
        assert!(assignment.len() == formula.num_variables());
        assert!(
            formula.evaluate(&assignment),
            "assignment does not satisfy the formula"
        );

        Model {
            formula,
            assignment,
        }
    }

    pub fn formula(&self) -> &Cnf {
        &self.formula
    }

    pub fn assignment(&self) -> &TiVec<Variable, bool> {
        &self.assignment
    }

    pub fn value(&self, variable: Variable) -> Option<bool> {
        self.assignment.get(variable).copied()
    }

    /// Checks the model against another clause list over the same variables.
    pub fn satisfies(&self, formula: &Cnf) -> bool {
        formula.num_variables() <= self.assignment.len() && formula.evaluate(&self.assignment)
    }
}

/// Prints the assignment as a DIMACS solution line, e.g. `v 1 -2 3 0`.
impl Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v")?;
        for (variable, &value) in self.assignment.iter_enumerated() {
            write!(f, " {}", variable.literal(value).raw())?;
        }
        write!(f, " 0")
    }
}
