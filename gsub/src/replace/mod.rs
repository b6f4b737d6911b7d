//! This module implements the substitution and rename engine.
//!
//! # Pipeline
//!
//! 1. **Rules**: `RuleSet::build` compiles the base search/replace pair and
//!    one pair per requested case style, de-duplicated by pattern text.
//! 2. **Per file**: `FileProcessor` reads a file, runs every rule over the
//!    content in order, writes the result back if anything matched, then
//!    runs the same rules over the path and moves the file if it changed.
//! 3. **Fan out**: `run` hands each candidate path to a worker on a bounded
//!    rayon pool and folds the outcomes into a `RunReport`.
//!
//! ```rust,ignore
//! let rules = RuleSet::build("GitGsub", "SvnGsub", false, &[CaseStyle::Snake])?;
//! let options = RewriteOptions { rename: true, ..RewriteOptions::default() };
//! let report = run(&rules, &options, &paths, 100)?;
//! for line in report.failure_lines() {
//!     eprintln!("{}", line);
//! }
//! ```
//!
//! # Rule Ordering
//!
//! Rules are applied sequentially and cumulatively: the second rule sees the
//! output of the first. The base rule always runs first, then case-derived
//! rules in `CaseStyle` declaration order, so repeated runs with the same
//! arguments behave identically.
//!
//! # Concurrency
//!
//! The rule set is immutable and shared by reference between workers. Files
//! are independent: there is no ordering between them and no locking around
//! the filesystem, so two files renamed onto one target race.

pub mod engine;
pub mod processor;
pub mod rules;

pub use engine::run;
pub use processor::{FileProcessor, RewriteOptions};
pub use rules::{Rule, RuleSet};
