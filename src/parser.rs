/*!
Text front ends producing a [`Cnf`].

Two notations are accepted:

* infix CNF, `(a | !b) & (c)`, where a literal is a variable name optionally
  prefixed with `!`;
* DIMACS, one clause per line as signed integers terminated by `0`, with `c`
  comment lines and an optional `p cnf <variables> <clauses>` header.
*/

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::formula::{Clause, Cnf, Literal, Variable, VariableNames, VariableParseError};
use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("I/O error occurred while parsing CNF file '{}'", path.display()))]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("The formula contains no clauses"))]
    EmptyFormula,
    #[snafu(display("Unbalanced parentheses in clause '{}'", clause))]
    UnbalancedParentheses { clause: String },
    #[snafu(display("Invalid literal '{}' in clause '{}'", literal, clause))]
    MalformedLiteral { clause: String, literal: String },
    #[snafu(display("Failed to parse '{}' as clause", clause))]
    MalformedClause { clause: String },
    #[snafu(display("Invalid variable found in clause '{}'", clause))]
    MalformedVariable {
        clause: String,
        source: VariableParseError,
    },
    #[snafu(display(
        "Problem line '{}' does not match 'p cnf <num_variables> <num_clauses>'",
        line
    ))]
    MalformedProblemDefinition { line: String },
    #[snafu(display(
        "Clause '{}' uses a variable beyond the {} declared in the problem line",
        clause,
        declared
    ))]
    VariableOutOfRange { clause: String, declared: usize },
}

const FORBIDDEN_NAME_CHARS: &[char] = &['|', '&', '(', ')', '!'];

fn parse_infix_literal(
    clause: &str,
    token: &str,
    names: &mut VariableNames,
) -> Result<Literal, Error> {
    let (positive, name) = match token.strip_prefix('!') {
        Some(name) => (false, name),
        None => (true, token),
    };

    ensure!(
        !name.is_empty() && !name.contains(FORBIDDEN_NAME_CHARS),
        MalformedLiteral {
            clause: clause.to_owned(),
            literal: token.to_owned(),
        }
    );

    Ok(names.intern(name).literal(positive))
}

/// Parses an infix CNF string such as `(a|b) & (!a|!b)`.
///
/// Whitespace is ignored anywhere. Variables are numbered in order of first
/// appearance, and the returned [`VariableNames`] maps them back to names.
pub fn parse_infix(text: &str) -> Result<(Cnf, VariableNames), Error> {
    let stripped: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    ensure!(!stripped.is_empty(), EmptyFormula);

    let mut names = VariableNames::new();
    let mut clauses = Vec::new();

    for raw_clause in stripped.split('&') {
        ensure!(
            !raw_clause.is_empty(),
            MalformedClause {
                clause: raw_clause.to_owned(),
            }
        );

        let body = match raw_clause.strip_prefix('(') {
            Some(inner) => inner.strip_suffix(')').context(UnbalancedParentheses {
                clause: raw_clause.to_owned(),
            })?,
            None => raw_clause,
        };
        ensure!(
            !body.contains(&['(', ')'][..]),
            UnbalancedParentheses {
                clause: raw_clause.to_owned(),
            }
        );

        // `()` is a clause without literals
        let literals = if body.is_empty() {
            Vec::new()
        } else {
            body.split('|')
                .map(|token| parse_infix_literal(raw_clause, token, &mut names))
                .collect::<Result<Vec<_>, _>>()?
        };
        clauses.push(Clause::new(literals));
    }

    let mut cnf = Cnf::new(names.len());
    for clause in clauses {
        cnf.add_clause(clause);
    }

    Ok((cnf, names))
}

/// Lines that carry no clause: comments, the header, and the `%` / lone `0`
/// trailer found in SATLIB benchmark files.
fn is_clause_line(trimmed: &str) -> bool {
    !trimmed.starts_with('c') && !trimmed.starts_with('p') && trimmed.len() > 1
}

/// Parse a line to a clause
fn parse_line(line: &str) -> Result<Clause, Error> {
    let splitted = line.split_whitespace().collect::<Vec<_>>();

    ensure!(
        splitted.last() == Some(&"0"),
        MalformedClause {
            clause: line.to_owned(),
        }
    );

    let mut literals = Vec::with_capacity(splitted.len() - 1);
    for s in &splitted[..splitted.len() - 1] {
        literals.push(s.parse::<Literal>().with_context(|| MalformedVariable {
            clause: line.to_owned(),
        })?);
    }

    Ok(Clause::new(literals))
}

fn parse_problem_line(line: &str) -> Result<usize, Error> {
    let splitted = line.split_whitespace().collect::<Vec<_>>();
    let malformed = || MalformedProblemDefinition {
        line: line.to_owned(),
    };

    ensure!(
        splitted.len() == 4 && splitted[0] == "p" && splitted[1] == "cnf",
        malformed()
    );

    match (splitted[2].parse::<usize>(), splitted[3].parse::<usize>()) {
        (Ok(num_variables), Ok(_num_clauses)) => {
            ensure!(num_variables <= Variable::MAX_VARIABLE_ID, malformed());
            Ok(num_variables)
        }
        _ => malformed().fail(),
    }
}

/// Parses DIMACS lines. Variable ids are kept as written.
///
/// Ids should be dense: solving allocates per-variable tables sized by the
/// largest id. After a `p cnf` header, clauses may only use ids up to the
/// declared count.
pub fn parse_dimacs_lines<I, S>(lines: I) -> Result<Cnf, Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cnf = Cnf::new(0);
    let mut declared = None;

    for line in lines {
        let trimmed = line.as_ref().trim();
        if trimmed.starts_with('p') {
            let num_variables = parse_problem_line(trimmed)?;
            cnf.declare_variables(num_variables);
            declared = Some(num_variables);
        } else if is_clause_line(trimmed) {
            let clause = parse_line(trimmed)?;
            if let Some(declared) = declared {
                ensure!(
                    clause.iter().all(|l| l.variable().get() as usize <= declared),
                    VariableOutOfRange {
                        clause: trimmed.to_owned(),
                        declared,
                    }
                );
            }
            cnf.add_clause(clause);
        }
    }

    ensure!(!cnf.clauses().is_empty(), EmptyFormula);

    Ok(cnf)
}

/// Parses CNF formula from a DIMACS file
pub fn parse_file(path: impl AsRef<Path>) -> Result<Cnf, Error> {
    let path = path.as_ref();
    let file = BufReader::new(File::open(path).context(IoError {
        path: path.to_owned(),
    })?);

    let lines = file
        .lines()
        .collect::<Result<Vec<_>, _>>()
        .context(IoError {
            path: path.to_owned(),
        })?;

    parse_dimacs_lines(lines)
}

/// Rewrites DIMACS lines as an infix CNF string whose variable names are the
/// DIMACS ids, e.g. `1 -2 0` becomes `(1|!2)`.
pub fn dimacs_to_infix<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let clauses = lines
        .into_iter()
        .filter_map(|line| {
            let trimmed = line.as_ref().trim();
            if !is_clause_line(trimmed) {
                return None;
            }

            let mut tokens = trimmed.split_whitespace().collect::<Vec<_>>();
            if tokens.last() == Some(&"0") {
                tokens.pop();
            }
            let literals = tokens
                .iter()
                .map(|token| token.replace('-', "!"))
                .collect::<Vec<_>>();
            Some(format!("({})", literals.join("|")))
        })
        .collect::<Vec<_>>();

    clauses.join("&")
}
