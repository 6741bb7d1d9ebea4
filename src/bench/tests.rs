use crate::bench::*;
use crate::error::GroverError;
use crate::kernel::{RunMode, TargetPolicy};
use crate::memory::MemoryBudget;

fn small_sweep() -> SweepConfig {
    SweepConfig::new()
        .with_sizes(vec![16, 64, 256])
        .with_trials(2)
        .with_parallel_threads(vec![2, 4])
}

// -------------------------------------------------------------------------
// SweepConfig
// -------------------------------------------------------------------------

#[test]
fn test_default_sweep() {
    let config = SweepConfig::default();
    assert_eq!(
        config.sizes,
        vec![4096, 16384, 65536, 262_144, 1_048_576, 4_194_304, 16_777_216]
    );
    assert_eq!(config.trials, 3);
    assert_eq!(config.parallel_threads.len(), 1);
    assert!(config.parallel_threads[0] >= 1);
    assert_eq!(config.target, TargetPolicy::OneThird);
    assert!(!config.budget.is_limited());
    assert_eq!(config.total_trials(), 7 * 3 * 2);
}

#[test]
fn test_from_lookup_overrides() {
    let config = SweepConfig::from_lookup(|key| match key {
        ENV_TRIALS => Some("5".to_string()),
        ENV_THREADS => Some("1, 2,4,8".to_string()),
        ENV_SIZES => Some("256,1024".to_string()),
        ENV_MEMORY_LIMIT => Some("4096".to_string()),
        _ => None,
    })
    .unwrap();

    assert_eq!(config.trials, 5);
    assert_eq!(config.parallel_threads, vec![1, 2, 4, 8]);
    assert_eq!(config.sizes, vec![256, 1024]);
    assert_eq!(config.budget, MemoryBudget::with_max_bytes(4096));
}

#[test]
fn test_from_lookup_empty_is_default() {
    let config = SweepConfig::from_lookup(|_| None).unwrap();
    assert_eq!(config, SweepConfig::default());
}

#[test]
fn test_from_lookup_max_threads_keyword() {
    let config = SweepConfig::from_lookup(|key| {
        (key == ENV_THREADS).then(|| "MAX".to_string())
    })
    .unwrap();
    assert_eq!(config.parallel_threads, vec![crate::kernel::max_threads()]);
}

#[test]
fn test_from_lookup_rejects_garbage() {
    for (bad_key, bad_value) in [
        (ENV_TRIALS, "0"),
        (ENV_TRIALS, "three"),
        (ENV_THREADS, "2,,4"),
        (ENV_THREADS, "-1"),
        (ENV_SIZES, ""),
        (ENV_MEMORY_LIMIT, "1GB"),
    ] {
        let err = SweepConfig::from_lookup(|key| {
            (key == bad_key).then(|| bad_value.to_string())
        })
        .unwrap_err();
        assert!(
            matches!(err, GroverError::InvalidConfiguration { ref key, .. } if key == bad_key),
            "{bad_key}={bad_value} gave {err:?}"
        );
    }
}

#[test]
fn test_validate() {
    assert!(small_sweep().validate().is_ok());
    assert!(matches!(
        small_sweep().with_sizes(vec![16, 0]).validate(),
        Err(GroverError::InvalidSize { .. })
    ));
    assert!(matches!(
        small_sweep().with_parallel_threads(vec![0]).validate(),
        Err(GroverError::InvalidThreadCount { threads: 0 })
    ));
    assert!(matches!(
        small_sweep().with_trials(0).validate(),
        Err(GroverError::InvalidConfiguration { .. })
    ));
    assert!(small_sweep().with_sizes(vec![]).validate().is_err());
    assert!(small_sweep().with_parallel_threads(vec![]).validate().is_err());
}

#[test]
fn test_validate_requires_ascending_sizes() {
    for sizes in [vec![1024, 64, 16], vec![64, 64], vec![16, 256, 64]] {
        let err = small_sweep().with_sizes(sizes.clone()).validate().unwrap_err();
        assert!(
            matches!(err, GroverError::InvalidConfiguration { ref key, .. } if key == "sizes"),
            "{sizes:?} gave {err:?}"
        );
    }
    assert!(small_sweep().with_sizes(vec![4096]).validate().is_ok());
}

#[test]
fn test_descending_env_sizes_run_nothing() {
    let config = SweepConfig::from_lookup(|key| {
        (key == ENV_SIZES).then(|| "1024,64,16".to_string())
    })
    .unwrap()
    .with_trials(1);

    let mut sink = RecordingSink::default();
    let err = BenchmarkHarness::new(config).run(&mut sink).unwrap_err();
    assert!(matches!(err, GroverError::InvalidConfiguration { .. }));
    assert_eq!(sink.trials, 0);
}

// -------------------------------------------------------------------------
// Harness
// -------------------------------------------------------------------------

#[test]
fn test_sweep_order_and_count() {
    let harness = BenchmarkHarness::new(small_sweep());
    let mut collected: Vec<TrialResult> = Vec::new();
    let results = harness.run(&mut collected).unwrap();

    assert_eq!(results.len(), harness.config().total_trials());
    assert_eq!(results, collected);

    // Per size: 2 serial, 2 parallel@2, 2 parallel@4
    let expected: Vec<(RunMode, usize, usize)> = [16, 64, 256]
        .iter()
        .flat_map(|&n| {
            [
                (RunMode::Serial, n, 1),
                (RunMode::Serial, n, 1),
                (RunMode::Parallel, n, 2),
                (RunMode::Parallel, n, 2),
                (RunMode::Parallel, n, 4),
                (RunMode::Parallel, n, 4),
            ]
        })
        .collect();
    let actual: Vec<(RunMode, usize, usize)> = results
        .iter()
        .map(|r| (r.mode, r.size, r.threads))
        .collect();
    assert_eq!(actual, expected);

    for r in &results {
        assert_eq!(r.iterations, crate::kernel::iteration_count(r.size));
        assert!(r.elapsed_seconds >= 0.0);
    }
}

#[derive(Default)]
struct RecordingSink {
    trials: usize,
    completed: Vec<usize>,
}

impl ResultSink for RecordingSink {
    fn on_trial(&mut self, _result: &TrialResult) -> crate::error::Result<()> {
        self.trials += 1;
        Ok(())
    }

    fn on_size_complete(&mut self, size: usize) -> crate::error::Result<()> {
        self.completed.push(size);
        Ok(())
    }
}

#[test]
fn test_sink_sees_size_completion_in_order() {
    let mut sink = RecordingSink::default();
    BenchmarkHarness::new(small_sweep()).run(&mut sink).unwrap();
    assert_eq!(sink.trials, 18);
    assert_eq!(sink.completed, vec![16, 64, 256]);
}

#[test]
fn test_allocation_failure_aborts_sweep() {
    // 64 amplitudes = 512 bytes fits; 256 amplitudes = 2048 bytes does not
    let config = small_sweep().with_budget(MemoryBudget::with_max_bytes(1024));
    let mut sink = RecordingSink::default();
    let err = BenchmarkHarness::new(config).run(&mut sink).unwrap_err();

    assert!(err.is_allocation());
    assert_eq!(sink.completed, vec![16, 64]);
    assert_eq!(sink.trials, 12);
}

struct FailingSink;

impl ResultSink for FailingSink {
    fn on_trial(&mut self, _result: &TrialResult) -> crate::error::Result<()> {
        Err(GroverError::IoError {
            message: "disk full".to_string(),
        })
    }
}

#[test]
fn test_sink_error_aborts_sweep() {
    let err = BenchmarkHarness::new(small_sweep())
        .run(&mut FailingSink)
        .unwrap_err();
    assert!(matches!(err, GroverError::IoError { .. }));
}

#[test]
fn test_invalid_config_runs_nothing() {
    let mut sink = RecordingSink::default();
    let config = small_sweep().with_sizes(vec![16, 0]);
    assert!(BenchmarkHarness::new(config).run(&mut sink).is_err());
    assert_eq!(sink.trials, 0);
}

#[test]
fn test_out_of_range_fixed_target_aborts() {
    let config = small_sweep().with_target(TargetPolicy::Fixed(32));
    let err = BenchmarkHarness::new(config).run(&mut NullSink).unwrap_err();
    assert_eq!(err, GroverError::IndexOutOfRange { index: 32, len: 16 });
}

#[test]
fn test_trial_result_json_round_trip() {
    let result = TrialResult {
        mode: RunMode::Parallel,
        size: 4096,
        iterations: 50,
        threads: 8,
        elapsed_seconds: 0.25,
    };
    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"mode\":\"parallel\""), "{json}");

    let back: TrialResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
}

// -------------------------------------------------------------------------
// Single runs
// -------------------------------------------------------------------------

#[test]
fn test_run_single_serial() {
    let result = run_single(RunMode::Serial, 4096, 8, TargetPolicy::Random { seed: Some(7) })
        .unwrap();
    assert_eq!(result.mode, RunMode::Serial);
    assert_eq!(result.size, 4096);
    assert_eq!(result.iterations, 50);
    assert_eq!(result.threads, 1);
    assert!(result.elapsed_seconds >= 0.0);
}

#[test]
fn test_run_single_parallel() {
    let result = run_single(RunMode::Parallel, 4096, 4, TargetPolicy::OneThird).unwrap();
    assert_eq!(result.mode, RunMode::Parallel);
    assert_eq!(result.threads, 4);
}

#[test]
fn test_run_single_errors() {
    assert!(matches!(
        run_single(RunMode::Serial, 0, 1, TargetPolicy::OneThird),
        Err(GroverError::InvalidSize { .. })
    ));
    assert!(matches!(
        run_single(RunMode::Parallel, 64, 0, TargetPolicy::OneThird),
        Err(GroverError::InvalidThreadCount { .. })
    ));
}

#[test]
fn test_run_trial_respects_budget() {
    let config = crate::kernel::KernelConfig::new(1024);
    let err = run_trial(&config, &MemoryBudget::with_max_bytes(8)).unwrap_err();
    assert!(err.is_allocation());
}
