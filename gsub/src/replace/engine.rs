use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

use super::processor::{FileProcessor, RewriteOptions};
use super::rules::RuleSet;
use crate::errors::{GsubError, GsubResult};
use crate::results::{FileOutcome, RunReport};

/// Rewrites every candidate path on a bounded worker pool.
///
/// The pool has `max_concurrency` threads (`0` lets rayon pick one per CPU).
/// Each worker owns a file from stat to rename, and only takes another path
/// once the previous outcome has been recorded, so at most `max_concurrency`
/// files are in flight at once. A failing file never cancels the others; the
/// call returns after every path has been processed.
///
/// Paths are processed in no particular order. Two files renamed onto the
/// same target race, and whichever move lands last wins.
pub fn run(
    rules: &RuleSet,
    options: &RewriteOptions,
    paths: &[String],
    max_concurrency: usize,
) -> GsubResult<RunReport> {
    let candidates = unique_candidates(paths);
    info!(
        "Rewriting {} files with {} rules (max concurrency {})",
        candidates.len(),
        rules.len(),
        max_concurrency
    );

    let pool = worker_pool(max_concurrency)?;
    let processor = FileProcessor::new(rules, options);
    let outcomes: Vec<FileOutcome> =
        process_in_pool(&pool, &candidates, |path| processor.process_file(Path::new(path)));

    let report = RunReport::from_outcomes(outcomes);
    info!(
        "Run complete. {} rewritten, {} renamed, {} failed of {} files",
        report.files_rewritten,
        report.files_renamed,
        report.failures.len(),
        report.files_processed
    );
    Ok(report)
}

/// A pool of `max_concurrency` workers; `0` lets rayon pick one per CPU
fn worker_pool(max_concurrency: usize) -> GsubResult<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(max_concurrency)
        .thread_name(|index| format!("gsub-worker-{}", index))
        .build()
        .map_err(|e| GsubError::config_error(format!("Failed to start worker pool: {}", e)))
}

/// Runs `process` once per candidate on `pool`, one candidate per task, and
/// returns the results in candidate order
fn process_in_pool<T, F>(pool: &ThreadPool, candidates: &[&str], process: F) -> Vec<T>
where
    T: Send,
    F: Fn(&str) -> T + Sync,
{
    pool.install(|| {
        candidates
            .par_iter()
            .with_max_len(1)
            .map(|path| process(path))
            .collect()
    })
}

/// Drops empty entries and repeats, keeping first-seen order
fn unique_candidates(paths: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let candidates: Vec<&str> = paths
        .iter()
        .map(String::as_str)
        .filter(|path| !path.is_empty() && seen.insert(*path))
        .collect();
    if candidates.len() != paths.len() {
        debug!(
            "Dropped {} empty or repeated paths",
            paths.len() - candidates.len()
        );
    }
    candidates
}
