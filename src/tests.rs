use paste::paste;

use crate::{
    cancel::CancelToken,
    check::{check_satisfiable, check_satisfiable_dimacs, Error},
    formula::{Clause, Cnf},
    generate::random_ksat,
    normalize::normalize,
    parser::{dimacs_to_infix, parse_file, parse_infix},
    solver::{self, Solver, SplitSolver, TruthTableSolver},
};

/// The SATLIB uf20-91 instance used across the test suite, with letters for
/// variable names.
const UF20_91_LETTERS: &str = "(!k|i|l)&(!g|!q|!r)&(!m|!q|t)&(!d|!p|l)&(h|b|n)&(!i|!s|n)&(g|d|r)&(!s|!p|e)&(!a|!p|q)&(!b|t|!k)&(!t|i|!q)&(!n|!o|!q)&(s|!r|o)&(f|o|!b)&(l|h|!n)&(!a|!b|!c)&(k|!h|e)&(f|r|!a)&(g|!k|h)&(a|e|o)&(d|j|l)&(k|f|r)&(g|j|c)&(n|!p|!q)&(d|r|m)&(!k|!o|!m)&(!b|!i|t)&(b|!e|s)&(n|f|!s)&(!h|!m|t)&(!i|h|m)&(b|!n|!g)&(c|p|!o)&(!b|m|q)&(!r|!m|p)&(!r|a|!p)&(r|b|n)&(!t|f|!n)&(o|!s|!h)&(d|l|!k)&(s|c|!n)&(f|e|!g)&(j|m|!k)&(o|!a|!c)&(i|f|j)&(!k|!a|p)&(r|!a|l)&(r|!b|!d)&(e|m|!t)&(s|!l|!f)&(o|k|m)&(l|b|!g)&(c|e|!s)&(c|m|!j)&(a|h|!f)&(!b|r|!k)&(!c|f|!i)&(!r|!n|!c)&(!d|!s|!q)&(g|e|!n)&(m|s|!l)&(!l|!g|!c)&(i|g|!s)&(f|b|j)&(k|f|!l)&(o|a|!q)&(t|!a|!d)&(!r|a|e)&(i|r|n)&(o|!q|i)&(!c|k|i)&(n|l|i)&(e|n|b)&(q|!j|!h)&(n|!o|i)&(!f|!t|m)&(a|f|m)&(!p|o|!q)&(!h|s|g)&(!g|c|!a)&(!r|j|q)&(l|!d|n)&(g|j|s)&(t|o|s)&(!m|!q|!i)&(j|!i|c)&(o|!k|j)&(l|a|!m)&(k|c|o)&(p|!b|!a)&(!q|!e|!a)";

/// Solves an infix formula and checks any model against every input clause.
fn assert_infix_verdict(text: &str, expected: bool) {
    let (sat, model) = check_satisfiable(text, None).unwrap();
    assert_eq!(sat, expected, "wrong verdict for {}", text);

    let model = match model {
        Some(model) => model,
        None => {
            assert!(!sat);
            return;
        }
    };

    let (formula, names) = parse_infix(text).unwrap();
    assert_eq!(model.len(), names.len());
    for clause in formula.clauses() {
        assert!(
            clause.iter().any(|literal| {
                let name = names.name(literal.variable()).unwrap();
                model[name] == literal.positive()
            }),
            "model {:?} falsifies {}",
            model,
            clause
        );
    }
}

macro_rules! infix_testcase {
    ($name:ident, $formula:expr, $expected:expr) => {
        paste! {
            #[test]
            fn [< infix_ $name >]() {
                assert_infix_verdict($formula, $expected);
            }
        }
    };
}

infix_testcase!(xor_contradiction, "(a|b) & (!a|!b) & (!a|b) & (a|!b)", false);
infix_testcase!(unit_forces_c, "(a|b|!c) & (a|!b|c) & (c)", true);
infix_testcase!(direct_contradiction, "(a) & (!a)", false);
infix_testcase!(single_unit, "(x)", true);
infix_testcase!(uf20_91, UF20_91_LETTERS, true);
infix_testcase!(only_tautologies, "(a|!a) & (b|c|!b)", true);
infix_testcase!(empty_clause, "(a|b) & ()", false);
infix_testcase!(duplicate_literals, "(a|a|a) & (!a|b|!a) & (!b|!b)", false);
infix_testcase!(wide_clause_sat, "(a|b|c|d|e|f) & (!a) & (!b) & (!c) & (!d) & (!e)", true);
infix_testcase!(wide_clause_unsat, "(a|b|c|d|e) & (!a) & (!b) & (!c) & (!d) & (!e)", false);
infix_testcase!(
    long_names,
    "(alpha | !beta_2 | gamma.x) & (!alpha) & (beta_2 | !gamma.x) & (beta_2)",
    true
);

macro_rules! sat_testcase_with_solver {
    ($solver:ident, $dir:ident, $name: ident) => {
        paste! {
            #[test]
            fn [< $solver:snake _ $dir _ $name >]() {
                let formula = parse_file(
                    concat!("testcases/", stringify!($dir), "/", stringify!($name), ".cnf")
                ).unwrap();
                let solver = $solver::new(formula.clone(), CancelToken::none());
                let model = solver.solve().unwrap().expect("formula is satisfiable");
                assert!(model.satisfies(&formula));
            }
        }
    };
}

macro_rules! unsat_testcase_with_solver {
    ($solver:ident, $dir:ident, $name:ident) => {
        paste! {
            #[test]
            fn [< $solver:snake _ $dir _ $name >]() {
                let formula = parse_file(
                    concat!("testcases/", stringify!($dir), "/", stringify!($name), ".cnf")
                ).unwrap();
                let solver = $solver::new(formula, CancelToken::none());
                assert!(solver.solve().unwrap().is_none());
            }
        }
    };
}

macro_rules! sat_testcase {
    ($dir:ident, $name:ident) => {
        sat_testcase_with_solver!(SplitSolver, $dir, $name);
    };
}

macro_rules! unsat_testcase {
    ($dir:ident, $name:ident) => {
        unsat_testcase_with_solver!(SplitSolver, $dir, $name);
    };
}

sat_testcase!(small, uf20_91);
sat_testcase!(small, wide);
sat_testcase!(small, chain);
unsat_testcase!(small, xor2);
unsat_testcase!(small, ph3);
unsat_testcase!(small, wide_unsat);

sat_testcase_with_solver!(TruthTableSolver, small, wide);
sat_testcase_with_solver!(TruthTableSolver, small, chain);
unsat_testcase_with_solver!(TruthTableSolver, small, ph3);
unsat_testcase_with_solver!(TruthTableSolver, small, wide_unsat);

#[test]
fn dimacs_lines_are_solved_with_integer_keys() {
    let lines = ["c comment", "p cnf 2 2", "1 2 0", "-1 -2 0"];
    assert_eq!(dimacs_to_infix(&lines), "(1|2)&(!1|!2)");

    let (sat, model) = check_satisfiable_dimacs(&lines, None).unwrap();
    assert!(sat);
    let model = model.unwrap();
    assert_eq!(model.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    assert_ne!(model[&1], model[&2]);

    let (sat, model) = check_satisfiable(&dimacs_to_infix(&lines), None).unwrap();
    assert!(sat);
    assert_ne!(model.as_ref().unwrap()["1"], model.as_ref().unwrap()["2"]);
}

#[test]
fn dimacs_model_skips_unused_ids() {
    let (sat, model) = check_satisfiable_dimacs(&["p cnf 9 2", "3 0", "-7 3 0"], None).unwrap();
    assert!(sat);
    let model = model.unwrap();
    assert_eq!(model.keys().copied().collect::<Vec<_>>(), vec![3, 7]);
    assert!(model[&3]);
}

#[test]
fn expired_token_times_out() {
    let expired = CancelToken::with_timeout(std::time::Duration::from_secs(0));

    let err = check_satisfiable(UF20_91_LETTERS, Some(&expired)).unwrap_err();
    assert!(err.is_timed_out());

    let err = check_satisfiable_dimacs(&["1 2 0", "-1 0"], Some(&expired)).unwrap_err();
    assert!(err.is_timed_out());

    let cancelled = CancelToken::new();
    cancelled.cancel();
    let (formula, _) = parse_infix("(a|b) & (!a)").unwrap();
    assert!(matches!(
        TruthTableSolver::new(formula, cancelled).solve(),
        Err(solver::Error::SolveTimedOut)
    ));
}

#[test]
fn timeout_is_not_a_verdict() {
    let cancelled = CancelToken::new();
    cancelled.cancel();
    // an unsatisfiable formula must still report the timeout
    match check_satisfiable("(a) & (!a)", Some(&cancelled)) {
        Err(Error::Solve {
            source: solver::Error::SolveTimedOut,
        }) => {}
        other => panic!("expected a timeout, got {:?}", other),
    }
}

#[test]
fn malformed_input_is_reported_before_solving() {
    assert!(matches!(
        check_satisfiable("", None),
        Err(Error::MalformedInput { .. })
    ));
    assert!(matches!(
        check_satisfiable("(a|b", None),
        Err(Error::MalformedInput { .. })
    ));
    assert!(matches!(
        check_satisfiable_dimacs(&["c only a comment"], None),
        Err(Error::MalformedInput { .. })
    ));
}

#[test]
fn out_of_range_dimacs_ids_are_errors() {
    assert!(matches!(
        check_satisfiable_dimacs(&["p cnf 3000000000 1", "1 0"], None),
        Err(Error::MalformedInput { .. })
    ));
    assert!(matches!(
        check_satisfiable_dimacs(&["p cnf 2 1", "1 2000000000 0"], None),
        Err(Error::MalformedInput { .. })
    ));

    // a wide clause over the largest id leaves no room for auxiliary ids
    let result = check_satisfiable_dimacs(&["1 2 3 2147483647 0"], None);
    assert!(matches!(
        result,
        Err(Error::Solve {
            source: solver::Error::Normalization { .. }
        })
    ));
}

#[test]
fn truth_table_refuses_large_formulas() {
    let formula = random_ksat(30, 10, 3, 1);
    assert!(matches!(
        TruthTableSolver::new(formula, CancelToken::none()).solve(),
        Err(solver::Error::TooManyVariables { count: 30, .. })
    ));
}

/// Random formulas of mixed clause width, including wide clauses that need
/// auxiliary variables.
fn mixed_formula(seed: u64) -> Cnf {
    let num_variables = 3 + (seed % 7) as usize;
    let mut formula = Cnf::new(num_variables);
    for (k, count) in &[(1, seed % 2), (2, 3 + seed % 5), (3, 4 + seed % 13), (5, seed % 3)] {
        if *k > num_variables {
            continue;
        }
        let part = random_ksat(num_variables, *count as usize, *k, seed * 31 + *k as u64);
        for clause in part.clauses() {
            formula.add_clause(clause.clone());
        }
    }
    formula
}

#[test]
fn agrees_with_truth_table() {
    for seed in 0..300 {
        let formula = mixed_formula(seed);

        let expected = TruthTableSolver::new(formula.clone(), CancelToken::none())
            .solve()
            .unwrap()
            .is_some();
        let found = SplitSolver::new(formula.clone(), CancelToken::none())
            .solve()
            .unwrap();

        assert_eq!(found.is_some(), expected, "seed {}: {}", seed, formula);
        if let Some(model) = found {
            assert!(model.satisfies(&formula), "seed {}: {}", seed, model);
        }
    }
}

#[test]
fn random_3sat_models_are_sound() {
    for seed in 0..20 {
        let formula = random_ksat(40, 150, 3, seed);
        let mut solver = SplitSolver::new(formula.clone(), CancelToken::none());
        if let Some(assignment) = solver.search().unwrap() {
            assert!(formula.evaluate(&assignment), "seed {}", seed);
        }
    }
}

#[test]
fn width_reduction_preserves_satisfiability() {
    for seed in 0..100 {
        let mut formula = random_ksat(8, 6 + (seed % 10) as usize, 3, seed);
        for clause in random_ksat(8, 2, 6, seed + 1000).clauses() {
            formula.add_clause(clause.clone());
        }

        let normalized = normalize(&formula).unwrap();
        assert!(normalized.clauses().iter().all(|clause| clause.len() <= 3));
        assert!(normalized.num_auxiliary_variables() > 0);

        let original = TruthTableSolver::new(formula.clone(), CancelToken::none())
            .solve()
            .unwrap();
        let reduced = TruthTableSolver::new(normalized.to_cnf(), CancelToken::none())
            .solve()
            .unwrap();
        assert_eq!(original.is_some(), reduced.is_some(), "seed {}", seed);

        // auxiliary variables sit past the original ones and are ignored
        if let Some(model) = reduced {
            assert!(formula.evaluate(model.assignment()), "seed {}", seed);
        }
    }
}

#[test]
fn normalization_is_idempotent() {
    for seed in 0..50 {
        let formula = mixed_formula(seed);
        let once = normalize(&formula).unwrap();
        let twice = normalize(&once.to_cnf()).unwrap();

        assert_eq!(once.clauses(), twice.clauses(), "seed {}", seed);
        assert_eq!(twice.num_auxiliary_variables(), 0);
        assert_eq!(once.contains_empty_clause(), twice.contains_empty_clause());
    }
}

#[test]
fn deduplication_never_grows_the_frontier() {
    for seed in 0..30 {
        let formula = random_ksat(25, 100, 3, seed);
        let mut solver = SplitSolver::new(formula, CancelToken::none());
        solver.search().unwrap();

        let stats = solver.stats();
        assert!(!stats.steps.is_empty());
        for step in &stats.steps {
            assert!(step.retained <= step.candidates, "seed {}: {:?}", seed, step);
        }
        assert!(stats.steps.iter().all(|step| step.retained <= stats.peak_frontier));
    }
}

#[test]
fn first_empty_residual_wins() {
    // `a` is expanded first and satisfies both clauses on its true branch
    let (formula, names) = parse_infix("(a|b) & (a|!b)").unwrap();
    let model = SplitSolver::new(formula, CancelToken::none())
        .solve()
        .unwrap()
        .unwrap();
    assert_eq!(model.value(names.get("a").unwrap()), Some(true));
}

#[test]
fn model_reports_every_input_variable() {
    let mut formula = Cnf::new(4);
    formula.add_clause(Clause::new(vec!["2".parse().unwrap()]));
    let model = SplitSolver::new(formula, CancelToken::none())
        .solve()
        .unwrap()
        .unwrap();
    assert_eq!(model.assignment().len(), 4);
    assert_eq!(model.value("2".parse().unwrap()), Some(true));
}

#[test]
fn formulas_print_in_infix_syntax() {
    let (formula, _) = parse_infix("(a | !b) & (b)").unwrap();
    assert_eq!(formula.to_string(), "(x1|!x2) & (x2)");

    let model = TruthTableSolver::new(formula, CancelToken::none())
        .solve()
        .unwrap()
        .unwrap();
    assert_eq!(model.to_string(), "v 1 2 0");
}
