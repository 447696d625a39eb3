//! Batch runner binary for the legaltime pipeline.
//!
//! Wires together configuration, the boundary store, override tables, the
//! transition calculator, and the worker pool, then resolves every event in
//! the input file and writes one output line per event.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `legaltime.yaml` (or the path in argv)
//! 3. Load the boundary store (cache-or-fetch, once, before workers start)
//! 4. Load the override tables
//! 5. Read the NDJSON event input
//! 6. Resolve all events over the fixed worker pool
//! 7. Write the NDJSON output and log the summary

mod batch;
mod config;
mod error;
mod input;

use std::path::{Path, PathBuf};

use legaltime_boundaries::BoundaryStore;
use legaltime_resolve::{LookupCache, OverrideTables, TransitionCalculator};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::batch::{BatchContext, OutputRecord, process_events, write_outputs};
use crate::config::RunnerConfig;
use crate::input::read_events;

/// Application entry point for the batch runner.
///
/// # Errors
///
/// Returns an error if configuration, reference data, override tables, or
/// batch I/O fail. Per-event failures do not abort the run; they surface as
/// `Failed` output records.
fn main() -> anyhow::Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("legaltime-runner starting");

    // 2. Load configuration.
    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("legaltime.yaml"), PathBuf::from);
    let config = load_config(&config_path)?;
    info!(
        input = %config.input_path.display(),
        output = %config.output_path.display(),
        workers = config.effective_workers(),
        batch_size = config.batch_size,
        "configuration loaded"
    );

    // 3. Load reference data, once, before any worker starts.
    let store = BoundaryStore::load(&config.datasets)?;

    // 4. Load override tables.
    let tables = OverrideTables::load(
        &config.overrides.place_overrides,
        &config.overrides.region_names,
    )?;
    info!("override tables loaded");

    // 5. Read the event input.
    let batch = read_events(&config.input_path)?;
    info!(
        events = batch.events.len(),
        skipped = batch.skipped,
        "event input read"
    );

    // 6. Resolve everything over the worker pool.
    let calculator = TransitionCalculator::new();
    let cache = LookupCache::new();
    let context = BatchContext {
        store: &store,
        tables: &tables,
        calculator: &calculator,
        cache: &cache,
    };
    let outcomes = process_events(
        &context,
        batch.events,
        config.effective_workers(),
        config.batch_size,
    );

    // 7. Write the output and summarize.
    write_outputs(&config.output_path, &outcomes)?;
    let failed = outcomes
        .iter()
        .filter(|o| matches!(o, OutputRecord::Failed { .. }))
        .count();
    info!(
        total = outcomes.len(),
        failed,
        output = %config.output_path.display(),
        "batch complete"
    );

    Ok(())
}

/// Load configuration, falling back to defaults when no file exists.
fn load_config(path: &Path) -> Result<RunnerConfig, error::RunnerError> {
    if path.is_file() {
        Ok(RunnerConfig::from_file(path)?)
    } else {
        info!(path = %path.display(), "no config file, using defaults");
        Ok(RunnerConfig::default())
    }
}
