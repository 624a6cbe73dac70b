//! # Headless Run Integration Test
//!
//! Loads a config file from disk and runs a whole generation through the driver.

use std::path::PathBuf;

use pipeworks::{AppConfig, AppError, DriverOptions, HeadlessDriver};

fn shipped_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/pipeworks.toml")
}

/// Test: the shipped config parses to the documented defaults.
#[test]
fn test_shipped_config_loads() {
    let config = AppConfig::load(shipped_config()).expect("shipped config");
    let defaults = AppConfig::default();
    assert_eq!(config.world.bounds, defaults.world.bounds);
    assert_eq!(config.world.max_pipes, defaults.world.max_pipes);
    assert_eq!(config.render, defaults.render);
}

/// Test: a config file on disk drives a full generation.
#[test]
fn test_run_from_file() {
    let path = std::env::temp_dir().join(format!("pipeworks_test_{}.toml", std::process::id()));
    std::fs::write(
        &path,
        "[world]\nbounds = [8, 8, 8]\nmax_pipes = 4\nseed = 2024\n\n[render]\ninitial_capacity = 8\n",
    )
    .expect("write config");

    let config = AppConfig::load(&path).expect("load");
    std::fs::remove_file(&path).ok();

    let mut driver = HeadlessDriver::new(config, DriverOptions::default()).expect("driver");
    let summary = driver.run().expect("run");

    assert!(summary.complete);
    assert_eq!(summary.pipes, 4);
    assert_eq!(summary.used_voxels, driver.world().grid().used());

    // Every pipe ended capped, and no store outgrew what doubling can reach.
    let bridge = driver.render_loop().bridge();
    for pipe_id in 0..summary.pipes {
        let state = bridge.pipe(pipe_id).expect("render state");
        assert!(state.is_capped());
        assert!(state.store().capacity().is_power_of_two());
    }
}

/// Test: invalid sections surface as typed errors.
#[test]
fn test_invalid_config_rejected() {
    let err = AppConfig::from_toml_str("[world]\nbounds = [0, 4, 4]\n").unwrap_err();
    assert!(matches!(err, AppError::Simulation(_)));
}
