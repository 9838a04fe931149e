use std::time::Duration;

use aggreblend_gradation::{Band, OptimizerConfig};
use integration_tests::MixFile;

fn parse_config(text: &str) -> Result<OptimizerConfig, toml::de::Error> {
    toml::from_str(text)
}

#[test]
fn empty_table_gives_defaults() {
    assert_eq!(parse_config("").unwrap(), OptimizerConfig::default());
}

#[test]
fn reads_every_field() {
    let config = parse_config(
        r"
        lambda = 1.5
        enable_shilstone_constraints = true
        max_iterations = 50
        tolerance = 1e-8
        time_budget_secs = 0.25
        initial_guess = [0.25, 0.75]
        bounds = [
            { lower = 0.1, upper = 0.4 },
            { lower = 0.0, upper = 1.0 },
        ]
        ",
    )
    .unwrap();

    assert_eq!(config.lambda(), 1.5);
    assert!(config.shilstone_constraints());
    assert_eq!(config.max_iterations(), 50);
    assert_eq!(config.tolerance(), 1e-8);
    assert_eq!(config.time_budget(), Some(Duration::from_millis(250)));
    assert_eq!(
        config.initial_guess().map(|g| g.as_slice().to_vec()),
        Some(vec![0.25, 0.75])
    );
    assert_eq!(
        config.bounds(),
        Some(&[Band::new(0.1, 0.4), Band::new(0.0, 1.0)][..])
    );
}

#[test]
fn invalid_values_are_rejected() {
    for text in [
        "lambda = -1.0",
        "tolerance = 0.0",
        "time_budget_secs = -2.0",
        "initial_guess = [0.5, 0.6]",
        "bounds = [{ lower = 0.7, upper = 0.2 }]",
        "lamda = 0.5",
    ] {
        assert!(parse_config(text).is_err(), "accepted: {text}");
    }
}

#[test]
fn mix_file_without_optimizer_table_uses_defaults() {
    let mix = MixFile::parse(
        r"
        [context]
        max_size_mm = 19.0
        cement_kg_m3 = 300.0

        [[aggregates]]
        name = 'sand'
        passing = [100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 96.0, 80.0, 62.0, 40.0, 17.0, 5.0, 1.5]
        ",
    )
    .unwrap();

    assert_eq!(mix.optimizer, OptimizerConfig::default());
    assert_eq!(mix.context.max_size_mm, 19.0);
    assert!(mix.curves().is_ok());
}

#[test]
fn mix_file_reports_bad_curves() {
    let mix = MixFile::parse(
        r"
        [context]
        max_size_mm = 19.0
        cement_kg_m3 = 300.0

        [[aggregates]]
        name = 'short'
        passing = [100.0, 90.0]
        ",
    )
    .unwrap();

    assert!(mix.curves().is_err());
}
