//! Gauss–Seidel power flow tests

use dnet_algo::{gauss_seidel, Convergence, ConvergenceCriterion, GaussSeidelSolver};
use dnet_core::{
    inspect_admittance, AdmittanceMatrix, Complex64, DnetError, LoadScaling, LoadVector,
    NetworkCase, VoltageState,
};

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

/// Helper: two-bus feeder with Y = [[10-5j, -5+2j], [-5+2j, 8-3j]]
fn two_bus_ybus() -> AdmittanceMatrix {
    AdmittanceMatrix::from_rows(vec![
        vec![c(10.0, -5.0), c(-5.0, 2.0)],
        vec![c(-5.0, 2.0), c(8.0, -3.0)],
    ])
    .expect("square matrix")
}

/// 200 kW / 100 kVAR at bus 1, scaled to the MW base
fn two_bus_loads(scaling: LoadScaling) -> LoadVector {
    LoadVector::from_kw_kvar(&[0.0, 200.0], &[0.0, 100.0], scaling).expect("matching lengths")
}

fn two_bus_initial() -> VoltageState {
    VoltageState::new(vec![c(1.02, 0.0), c(0.97, 0.03)])
}

/// Helper: three-bus meshed network, every row strictly diagonally dominant
fn three_bus_case() -> NetworkCase {
    let ybus = AdmittanceMatrix::from_rows(vec![
        vec![c(20.0, -10.0), c(-10.0, 5.0), c(-8.0, 4.0)],
        vec![c(-10.0, 5.0), c(24.0, -12.0), c(-9.0, 4.5)],
        vec![c(-8.0, 4.0), c(-9.0, 4.5), c(21.0, -10.5)],
    ])
    .unwrap();
    let loads = LoadVector::from_per_unit(vec![c(0.0, 0.0), c(0.15, 0.05), c(0.25, 0.12)]);
    NetworkCase::new("three-bus", ybus, loads, VoltageState::flat(3)).unwrap()
}

#[test]
fn two_bus_converges_with_scaled_loads() {
    let ybus = two_bus_ybus();
    let loads = two_bus_loads(LoadScaling::KW_TO_MW);
    let v0 = two_bus_initial();

    let result = gauss_seidel(&ybus, &loads, &v0, 1e-6, 1000).expect("valid inputs");

    assert_eq!(result.convergence, Convergence::Converged { iterations: 6 });
    assert_eq!(result.iterations_run, 6);
    assert!(result.max_delta < 1e-6);

    let v1 = result.voltages.get(1);
    assert!(
        (v1 - c(0.680_826_3, -0.019_063_1)).norm() < 1e-6,
        "unexpected bus 1 voltage {v1}"
    );

    let polar = result.voltages.polar();
    assert!((polar[1].magnitude.value() - 0.681_093).abs() < 1e-5);
    assert!((polar[1].angle.value() - (-1.603_86)).abs() < 1e-4);
}

#[test]
fn two_bus_is_deterministic() {
    let ybus = two_bus_ybus();
    let loads = two_bus_loads(LoadScaling::KW_TO_MW);
    let v0 = two_bus_initial();

    let first = gauss_seidel(&ybus, &loads, &v0, 1e-6, 1000).unwrap();
    let second = gauss_seidel(&ybus, &loads, &v0, 1e-6, 1000).unwrap();

    assert_eq!(first.voltages, second.voltages);
    assert_eq!(first.convergence, second.convergence);
    assert_eq!(first.max_delta.to_bits(), second.max_delta.to_bits());
}

#[test]
fn all_close_criterion_stops_one_pass_earlier() {
    let result = GaussSeidelSolver::new()
        .with_criterion(ConvergenceCriterion::all_close())
        .solve(
            &two_bus_ybus(),
            &two_bus_loads(LoadScaling::KW_TO_MW),
            &two_bus_initial(),
        )
        .unwrap();

    assert_eq!(result.convergence.iterations(), Some(5));
}

#[test]
fn load_scaling_changes_the_operating_point() {
    let ybus = two_bus_ybus();
    let v0 = two_bus_initial();

    let scaled_loads = two_bus_loads(LoadScaling::KW_TO_MW);
    let unscaled_loads = two_bus_loads(LoadScaling::IDENTITY);
    let scaled = gauss_seidel(&ybus, &scaled_loads, &v0, 1e-6, 50).unwrap();
    let unscaled = gauss_seidel(&ybus, &unscaled_loads, &v0, 1e-6, 50).unwrap();

    assert!(scaled.converged());
    // Raw kW against a per-unit matrix converges far more slowly.
    assert!(!unscaled.converged());
    assert!((scaled.voltages.get(1) - unscaled.voltages.get(1)).norm() > 1.0);
}

#[test]
fn exact_fixed_point_converges_in_one_iteration() {
    let ybus = two_bus_ybus();
    let v_ref = c(1.02, 0.0);
    let v_pq = c(0.95, -0.02);

    // Choose S so that V0 already satisfies the update equation at bus 1.
    let s = (v_pq.conj() * (ybus.get(1, 1) * v_pq + ybus.get(1, 0) * v_ref)).conj();
    let loads = LoadVector::from_per_unit(vec![c(0.0, 0.0), s]);
    let v0 = VoltageState::new(vec![v_ref, v_pq]);

    let result = gauss_seidel(&ybus, &loads, &v0, 1e-6, 1000).unwrap();

    assert_eq!(result.convergence, Convergence::Converged { iterations: 1 });
    assert!((result.voltages.get(1) - v_pq).norm() < 1e-12);
}

#[test]
fn reference_bus_is_never_modified() {
    let ybus = two_bus_ybus();
    let v0 = two_bus_initial();

    for (loads, max_iter) in [
        (two_bus_loads(LoadScaling::KW_TO_MW), 1000),
        (two_bus_loads(LoadScaling::IDENTITY), 3),
    ] {
        let result = gauss_seidel(&ybus, &loads, &v0, 1e-6, max_iter).unwrap();
        assert_eq!(result.voltages.get(0), v0.get(0));
    }

    let case = three_bus_case();
    let result = GaussSeidelSolver::new().solve_case(&case).unwrap();
    assert_eq!(result.voltages.get(0), case.initial_voltages.get(0));
}

#[test]
fn diagonally_dominant_network_converges() {
    let case = three_bus_case();
    assert_eq!(inspect_admittance(&case.ybus).warning_count(), 0);

    let solver = GaussSeidelSolver::new()
        .with_tolerance(1e-9)
        .with_max_iterations(200);
    let result = solver.solve_case(&case).unwrap();

    assert!(result.converged());
    let iterations = result.convergence.iterations().unwrap();
    assert!(iterations <= 200);
    assert_eq!(iterations, result.iterations_run);
}

#[test]
fn pass_cap_reports_non_convergence_with_best_estimate() {
    let result = gauss_seidel(
        &two_bus_ybus(),
        &two_bus_loads(LoadScaling::KW_TO_MW),
        &two_bus_initial(),
        1e-6,
        2,
    )
    .expect("non-convergence is not an error");

    assert_eq!(result.convergence, Convergence::NotConverged);
    assert_eq!(result.convergence.iterations(), None);
    assert_eq!(result.iterations_run, 2);
    assert!(result.max_delta > 1e-6);
    assert!((result.voltages.get(1) - c(0.681_488, -0.018_988)).norm() < 1e-5);
}

#[test]
fn load_length_mismatch_is_invalid_argument() {
    let loads = LoadVector::from_per_unit(vec![c(0.0, 0.0), c(0.2, 0.1), c(0.1, 0.0)]);
    let err = gauss_seidel(&two_bus_ybus(), &loads, &two_bus_initial(), 1e-6, 1000).unwrap_err();
    assert!(matches!(err, DnetError::InvalidArgument(_)), "got {err:?}");

    let short_v0 = VoltageState::flat(1);
    let err = gauss_seidel(
        &two_bus_ybus(),
        &two_bus_loads(LoadScaling::KW_TO_MW),
        &short_v0,
        1e-6,
        1000,
    )
    .unwrap_err();
    assert!(matches!(err, DnetError::InvalidArgument(_)));
}

#[test]
fn zero_self_admittance_is_degenerate_network() {
    let ybus = AdmittanceMatrix::from_rows(vec![
        vec![c(10.0, -5.0), c(-5.0, 2.0), c(0.0, 0.0)],
        vec![c(-5.0, 2.0), c(8.0, -3.0), c(-1.0, 0.5)],
        vec![c(0.0, 0.0), c(-1.0, 0.5), c(0.0, 0.0)],
    ])
    .unwrap();
    let loads = LoadVector::from_per_unit(vec![c(0.0, 0.0), c(0.2, 0.1), c(0.1, 0.05)]);

    let err = gauss_seidel(&ybus, &loads, &VoltageState::flat(3), 1e-6, 1000).unwrap_err();
    assert!(matches!(err, DnetError::DegenerateNetwork { bus: 2 }), "got {err:?}");
}

#[test]
fn non_finite_voltage_stops_the_solve() {
    let ybus = AdmittanceMatrix::from_rows(vec![
        vec![c(1.0, 0.0), c(-1.0, 0.0)],
        vec![c(-1.0, 0.0), c(1.0, 0.0)],
    ])
    .unwrap();
    let loads = LoadVector::from_per_unit(vec![c(0.0, 0.0), c(1e308, 0.0)]);
    let v0 = VoltageState::new(vec![c(1.0, 0.0), c(1e-10, 0.0)]);

    let result = gauss_seidel(&ybus, &loads, &v0, 1e-6, 1000).unwrap();

    assert!(!result.converged());
    assert_eq!(result.iterations_run, 1);
    assert_eq!(result.voltages.get(0), c(1.0, 0.0));
}

#[test]
fn history_records_every_pass_without_changing_results() {
    let ybus = two_bus_ybus();
    let loads = two_bus_loads(LoadScaling::KW_TO_MW);
    let v0 = two_bus_initial();

    let plain = GaussSeidelSolver::new().solve(&ybus, &loads, &v0).unwrap();
    let traced = GaussSeidelSolver::new()
        .with_history(true)
        .solve(&ybus, &loads, &v0)
        .unwrap();

    assert!(plain.history.is_none());
    let history = traced.history.as_ref().expect("history requested");
    assert_eq!(history.len(), traced.iterations_run);
    assert_eq!(history.last(), Some(&traced.voltages));
    assert_eq!(plain.voltages, traced.voltages);
    assert_eq!(plain.convergence, traced.convergence);
}

#[test]
fn batch_solve_keeps_order_and_isolates_failures() {
    let good = NetworkCase::new(
        "ULP Semarang Timur",
        two_bus_ybus(),
        two_bus_loads(LoadScaling::KW_TO_MW),
        two_bus_initial(),
    )
    .unwrap();
    let degenerate = NetworkCase::new(
        "degenerate",
        AdmittanceMatrix::from_rows(vec![
            vec![c(1.0, 0.0), c(-1.0, 0.0)],
            vec![c(-1.0, 0.0), c(0.0, 0.0)],
        ])
        .unwrap(),
        LoadVector::from_per_unit(vec![c(0.0, 0.0), c(0.1, 0.0)]),
        VoltageState::flat(2),
    )
    .unwrap();

    let solver = GaussSeidelSolver::new();
    let results = solver.solve_batch(&[good.clone(), degenerate, three_bus_case()]);

    assert_eq!(results.len(), 3);
    let first = results[0].as_ref().expect("good case solves");
    assert_eq!(first.voltages, solver.solve_case(&good).unwrap().voltages);
    assert!(matches!(
        results[1],
        Err(DnetError::DegenerateNetwork { bus: 1 })
    ));
    assert!(results[2].as_ref().unwrap().converged());
}
