//! Environment-driven configuration
//!
//! These tests mutate process environment variables, so they run serially.

use std::path::PathBuf;

use grover_bench::bench::{
    DEFAULT_SIZES, DEFAULT_TRIALS, ENV_MEMORY_LIMIT, ENV_SIZES, ENV_THREADS, ENV_TRIALS,
};
use grover_bench::kernel::max_threads;
use grover_bench::report::{results_path, DEFAULT_RESULTS_PATH, ENV_OUTPUT};
use grover_bench::{GroverError, SweepConfig};
use serial_test::serial;

const ALL_VARS: [&str; 5] = [ENV_TRIALS, ENV_THREADS, ENV_SIZES, ENV_MEMORY_LIMIT, ENV_OUTPUT];

fn clear_env() {
    for key in ALL_VARS {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();
    let config = SweepConfig::from_env().unwrap();
    assert_eq!(config.sizes, DEFAULT_SIZES.to_vec());
    assert_eq!(config.trials, DEFAULT_TRIALS);
    assert_eq!(config.parallel_threads, vec![max_threads()]);
    assert!(!config.budget.is_limited());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_env();
    std::env::set_var(ENV_TRIALS, "5");
    std::env::set_var(ENV_THREADS, "1,2,4");
    std::env::set_var(ENV_SIZES, "64,256");
    std::env::set_var(ENV_MEMORY_LIMIT, "1048576");

    let config = SweepConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.trials, 5);
    assert_eq!(config.parallel_threads, vec![1, 2, 4]);
    assert_eq!(config.sizes, vec![64, 256]);
    assert_eq!(config.budget.max_bytes, Some(1_048_576));
    assert_eq!(config.total_trials(), 2 * 5 * 4);
}

#[test]
#[serial]
fn test_from_env_threads_max() {
    clear_env();
    std::env::set_var(ENV_THREADS, "max");
    let config = SweepConfig::from_env().unwrap();
    clear_env();
    assert_eq!(config.parallel_threads, vec![max_threads()]);
}

#[test]
#[serial]
fn test_from_env_rejects_garbage() {
    clear_env();
    std::env::set_var(ENV_TRIALS, "three");
    let err = SweepConfig::from_env().unwrap_err();
    clear_env();
    assert!(matches!(
        err,
        GroverError::InvalidConfiguration { ref key, .. } if key == ENV_TRIALS
    ));
}

#[test]
#[serial]
fn test_results_path_default_and_override() {
    clear_env();
    assert_eq!(results_path(), PathBuf::from(DEFAULT_RESULTS_PATH));

    std::env::set_var(ENV_OUTPUT, "/tmp/grover/out.csv");
    assert_eq!(results_path(), PathBuf::from("/tmp/grover/out.csv"));

    std::env::set_var(ENV_OUTPUT, "");
    assert_eq!(results_path(), PathBuf::from(DEFAULT_RESULTS_PATH));
    clear_env();
}
