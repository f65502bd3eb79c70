use std::{env::args, path::Path, time::Duration};

use pretty_env_logger::formatted_builder;
use splitsat::{
    cancel::CancelToken,
    formula::{Cnf, Model},
    generate::random_ksat,
    parser::{self, parse_file, parse_infix},
    prelude::*,
    report::Report,
    solver::{self, Solver, SplitSolver, TruthTableSolver},
};

fn usage_string() -> String {
    format!(
        "Usage: {} [--timeout <seconds>] <solver_name> <command>

solver_name: split, truth-table

command:
    check <file_name> - solve the given DIMACS file
    formula <cnf> - solve an infix formula such as '(a|!b)&(b)'
    random <num_variables> <num_clauses> <seed> - solve a random 3-SAT instance",
        args().next().unwrap_or_else(|| "splitsat".to_owned())
    )
}

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Unknown solver '{}'\n\n{}", name, usage_string()))]
    UnknownSolver { name: String },
    #[snafu(display("Unknown command '{}'\n\n{}", name, usage_string()))]
    UnknownCommand { name: String },
    #[snafu(display("Failed to parse CNF"))]
    ParserError { source: parser::Error },
    #[snafu(display("Failed to solve CNF"))]
    SolverError { source: solver::Error },
    #[snafu(display("Required argument does not exist\n\n{}", usage_string()))]
    MissingArgument,
    #[snafu(display("Random 3-SAT needs at least 3 variables, got {}", count))]
    TooFewVariables { count: usize },
    #[snafu(display("Argument '{}' is not a number\n\n{}", value, usage_string()))]
    InvalidNumber {
        value: String,
        source: std::num::ParseIntError,
    },
}

fn number_arg<T>(args: &[String], index: usize) -> Result<T, Error>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    let value = args.get(index).context(MissingArgument)?;
    value.parse().context(InvalidNumber {
        value: value.to_owned(),
    })
}

fn load_formula(args: &[String]) -> Result<Cnf, Error> {
    match args.get(0).map(|s| s.as_str()) {
        Some("check") => {
            let path = args.get(1).context(MissingArgument)?;
            parse_file(Path::new(path)).context(ParserError)
        }
        Some("formula") => {
            let text = args.get(1).context(MissingArgument)?;
            let (cnf, _names) = parse_infix(text).context(ParserError)?;
            Ok(cnf)
        }
        Some("random") => {
            let num_variables: usize = number_arg(args, 1)?;
            ensure!(
                num_variables >= 3,
                TooFewVariables {
                    count: num_variables
                }
            );
            let num_clauses: usize = number_arg(args, 2)?;
            let seed: u64 = number_arg(args, 3)?;
            Ok(random_ksat(num_variables, num_clauses, 3, seed))
        }
        Some(name) => UnknownCommand {
            name: name.to_owned(),
        }
        .fail(),
        None => MissingArgument.fail(),
    }
}

fn dispatch_command<T: Solver>(args: Vec<String>, cancel: CancelToken) -> Result<(), Error> {
    let formula = load_formula(&args)?;
    let result: Option<Model> = T::new(formula.clone(), cancel)
        .solve()
        .context(SolverError)?;

    if let Some(model) = result {
        println!("SAT");
        println!("{}", model);
        println!("Verified: {}", model.satisfies(&formula));
    } else {
        println!("UNSAT");
    }

    Ok(())
}

fn init_logger() {
    let mut builder = formatted_builder();

    if let Ok(s) = ::std::env::var("RUST_LOG") {
        builder.parse_filters(&s);
    } else if cfg!(debug_assertions) {
        builder.parse_filters("splitsat=debug");
    } else {
        builder.parse_filters("splitsat=warn");
    }

    builder.try_init().expect("Failed to initialize the logger");
}

fn main() -> Result<(), Report> {
    init_logger();

    let mut args = args().skip(1).peekable();

    let mut cancel = CancelToken::none();
    if args.peek().map(|s| s.as_str()) == Some("--timeout") {
        args.next();
        let seconds = args.next().context(MissingArgument)?;
        let seconds = seconds.parse::<u64>().context(InvalidNumber {
            value: seconds.clone(),
        })?;
        cancel = CancelToken::with_timeout(Duration::from_secs(seconds));
    }

    // solver name
    let solver_name = args.next();
    let remaining: Vec<_> = args.collect();

    match solver_name.as_deref() {
        Some("split") => dispatch_command::<SplitSolver>(remaining, cancel)?,
        Some("truth-table") => dispatch_command::<TruthTableSolver>(remaining, cancel)?,
        Some(name) => UnknownSolver {
            name: name.to_owned(),
        }
        .fail()?,
        None => {
            println!("{}", usage_string());
        }
    }

    Ok(())
}
