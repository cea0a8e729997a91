#![allow(clippy::float_cmp)]

use ssp_arcflow::{check_patterns, solve, Formulation, SolveOptions};
use ssp_core::{Instance, Pattern, Tolerance};
use ssp_highs::HighsSolver;
use ssp_model::{Bounds, ComparisonSense, Expr, Model, Solver, SolverConfig, SolverStatus, Variable};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Test: minimize 2x + 3y subject to x + y >= 5, x,y >= 0
#[test]
fn test_simple_lp() {
    init_tracing();
    let mut model = Model::new();
    let x = model
        .add_variable(Variable::continuous(Bounds::non_negative()))
        .unwrap();
    let y = model
        .add_variable(Variable::continuous(Bounds::non_negative()))
        .unwrap();
    model
        .add_constraint_expr(Expr::sum([x, y]).compare_scalar(5.0, ComparisonSense::GreaterEqual))
        .unwrap();
    model
        .minimize(Expr::term(x, 2.0).add(&Expr::term(y, 3.0)))
        .unwrap();

    let solution = HighsSolver::new().solve(&model).expect("Failed to solve");

    assert_eq!(solution.status, SolverStatus::Optimal);
    assert!((solution.objective_value - 10.0).abs() < 1e-6);
    assert!((solution.primal_values[0] - 5.0).abs() < 1e-6);
}

/// Test: maximize integer x subject to x <= 1.5
#[test]
fn test_integer_variable_solution() {
    let mut model = Model::new();
    let x = model
        .add_variable(Variable::integer(Bounds::new(0.0, 10.0)))
        .unwrap();
    model.add_constraint_expr(Expr::var(x).at_most(1.5)).unwrap();
    model.maximize(Expr::var(x)).unwrap();

    let solution = HighsSolver::new().solve(&model).unwrap();
    assert_eq!(solution.status, SolverStatus::Optimal);
    assert!((solution.primal_values[0] - 1.0).abs() < 1e-6);
}

#[test]
fn test_infeasible_model_reports_status() {
    let mut model = Model::new();
    let x = model
        .add_variable(Variable::continuous(Bounds::new(2.0, 4.0)))
        .unwrap();
    model.add_constraint_expr(Expr::var(x).at_most(1.0)).unwrap();
    model.maximize(Expr::var(x)).unwrap();

    let solution = HighsSolver::new().solve(&model).unwrap();
    assert_eq!(solution.status, SolverStatus::Infeasible);
    assert!(solution.primal_values.is_empty());
}

fn instance() -> Instance {
    Instance::new(10, vec![6, 5, 4, 3], vec![1, 1, 2, 4]).unwrap()
}

#[test]
fn test_every_formulation_reaches_the_same_optimum() {
    init_tracing();
    let inst = instance();
    for formulation in Formulation::ALL {
        let mut solver = HighsSolver::with_config(SolverConfig::new().with_threads(1));
        let solution = solve(&inst, formulation, &mut solver, &SolveOptions::new())
            .unwrap_or_else(|err| panic!("{formulation}: {err}"));

        assert!(
            (solution.objective_value - 3.0).abs() < 1e-6,
            "{formulation}: objective {}",
            solution.objective_value
        );
        let decoded: f64 = solution.patterns.iter().map(|p| p.multiplicity).sum();
        assert!((decoded - 3.0).abs() < 1e-6, "{formulation}: decoded {decoded}");
        for pattern in &solution.patterns {
            assert!(pattern.length >= inst.threshold(), "{formulation}: {pattern:?}");
        }
        assert!(check_patterns(&inst, &solution.patterns, Tolerance::default()).is_ok());
    }
}

#[test]
fn test_warm_started_solve_keeps_optimum() {
    let inst = instance();
    let patterns = vec![
        Pattern::from_items([0, 2]),
        Pattern::from_items([1, 3, 3]),
        Pattern::from_items([2, 3, 3]),
    ];
    for formulation in Formulation::ALL {
        let options = SolveOptions::new().with_warm_start(patterns.clone());
        let solution = solve(&inst, formulation, &mut HighsSolver::new(), &options)
            .unwrap_or_else(|err| panic!("{formulation}: {err}"));
        assert!((solution.objective_value - 3.0).abs() < 1e-6, "{formulation}");
    }
}

#[test]
fn test_relaxation_bounds_the_integer_optimum() {
    let inst = instance();
    for formulation in Formulation::ALL {
        let options = SolveOptions::new().with_relaxed(true);
        let solution = solve(&inst, formulation, &mut HighsSolver::new(), &options)
            .unwrap_or_else(|err| panic!("{formulation}: {err}"));
        assert!(solution.objective_value >= 3.0 - 1e-6, "{formulation}");
    }
}
