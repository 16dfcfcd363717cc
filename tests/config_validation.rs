//! Validation behavior of the public configuration surface.
//!
//! Every range violation must surface synchronously, before any sampling,
//! and name the offending field.

use absim::{design_sample_size, generate, ConfigError, ExperimentConfig};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

#[test]
fn config_rejects_out_of_range_probabilities() {
    assert!(ExperimentConfig::new(0.0, 0.0, 200.0, 2.0).is_err());
    assert!(ExperimentConfig::new(1.0, 0.0, 200.0, 2.0).is_err());
    assert!(ExperimentConfig::new(0.5, 0.5, 200.0, 2.0).is_err());
    assert!(ExperimentConfig::new(0.5, -0.5, 200.0, 2.0).is_err());
    assert!(ExperimentConfig::new(0.5, 0.0, 200.0, 2.0).is_ok());
}

#[test]
fn config_errors_name_the_field() {
    let err = ExperimentConfig::new(0.02, 0.0, -3.0, 2.0).unwrap_err();
    assert!(err.to_string().contains("concentration"), "{err}");

    let err = ExperimentConfig::new(0.9, 0.2, 200.0, 2.0).unwrap_err();
    assert!(err.to_string().contains("base_ctr + uplift"), "{err}");
}

#[test]
fn generator_rejects_zero_counts_without_sampling() {
    let config = ExperimentConfig::new(0.02, 0.0, 200.0, 2.0).unwrap();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
    assert!(matches!(
        generate(&config, 0, 10, &mut rng),
        Err(ConfigError::ZeroCount { .. })
    ));
    assert!(matches!(
        generate(&config, 10, 0, &mut rng),
        Err(ConfigError::ZeroCount { .. })
    ));
}

#[test]
fn designer_rejects_invalid_inputs() {
    assert!(matches!(
        design_sample_size(0.0, 0.2, 0.05, 0.2),
        Err(ConfigError::ZeroMde)
    ));
    for (p0, alpha, beta_error) in [(0.0, 0.05, 0.2), (0.2, 1.0, 0.2), (0.2, 0.05, 0.0)] {
        assert!(
            design_sample_size(0.05, p0, alpha, beta_error).is_err(),
            "accepted p0={p0}, alpha={alpha}, beta_error={beta_error}"
        );
    }
}

#[test]
fn designer_reference_value() {
    assert_eq!(design_sample_size(0.05, 0.2, 0.05, 0.2).unwrap(), 1031);
}
