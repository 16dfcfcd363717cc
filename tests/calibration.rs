//! Calibration tests: under an A/A configuration every battery test's
//! p-values should be approximately uniform on [0, 1].
//!
//! Each test simulates 1000 independent replications of a null experiment
//! and checks the fraction of p-values below 0.05 against 0.05 ± 0.02
//! (three standard errors at n = 1000). Seeds are fixed, so these are
//! deterministic regression checks, not flaky statistical assertions.
//!
//! Expected runtime: tens of seconds in debug mode, dominated by the
//! bootstrap test.

use absim::{generate, BatteryTest, EmpiricalCdf, ExperimentConfig, SimulatedBatch};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

const N_RUNS: usize = 1000;
const ALPHA: f64 = 0.05;
const TOLERANCE: f64 = 0.02;

fn null_batch(num_users: usize, seed: u64) -> SimulatedBatch {
    let config = ExperimentConfig::new(0.05, 0.0, 500.0, 1.0).unwrap();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    generate(&config, num_users, N_RUNS, &mut rng).unwrap()
}

fn assert_calibrated(name: &str, p_vals: &[f64]) {
    assert_eq!(p_vals.len(), N_RUNS);

    let rejection_rate = EmpiricalCdf::new(p_vals).fraction_significant(ALPHA);
    eprintln!("[{name}] null rejection rate at {ALPHA}: {rejection_rate:.3}");
    assert!(
        (rejection_rate - ALPHA).abs() <= TOLERANCE,
        "[{name}] rejection rate {rejection_rate:.3} outside {ALPHA} ± {TOLERANCE}"
    );

    // Coarse uniformity across the rest of the unit interval.
    let cdf = EmpiricalCdf::new(p_vals);
    for q in [0.25, 0.5, 0.75] {
        let observed = cdf.query(q);
        assert!(
            (observed - q).abs() < 0.06,
            "[{name}] CDF at {q} is {observed:.3}"
        );
    }
}

#[test]
fn click_t_test_is_calibrated_under_the_null() {
    let batch = null_batch(200, 101);
    let p_vals = BatteryTest::ClickTTest.run(&batch).unwrap();
    assert_calibrated("t_test_clicks", &p_vals);
}

#[test]
fn ctr_t_test_is_calibrated_under_the_null() {
    let batch = null_batch(200, 102);
    let p_vals = BatteryTest::CtrTTest.run(&batch).unwrap();
    assert_calibrated("t_test_ctr", &p_vals);
}

#[test]
fn mann_whitney_is_calibrated_under_the_null() {
    let batch = null_batch(200, 103);
    let p_vals = BatteryTest::MannWhitney.run(&batch).unwrap();
    assert_calibrated("mann_whitney", &p_vals);
}

#[test]
fn pooled_z_is_calibrated_under_the_null() {
    let batch = null_batch(200, 104);
    let p_vals = BatteryTest::PooledZ.run(&batch).unwrap();
    assert_calibrated("two_proportion_z", &p_vals);
}

#[test]
fn poisson_bootstrap_is_calibrated_under_the_null() {
    // Smaller per-run cost: the bootstrap multiplies a fresh weight matrix
    // per run, so this is by far the most expensive battery member.
    let batch = null_batch(100, 105);
    let p_vals = BatteryTest::PoissonBootstrap {
        n_bootstrap: 400,
        seed: 105,
    }
    .run(&batch)
    .unwrap();
    assert_calibrated("poisson_bootstrap", &p_vals);
}
