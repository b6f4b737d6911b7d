//! Per-file outcomes and the aggregated report of a run.
//!
//! Every candidate file produces exactly one `FileOutcome`. Successful
//! outcomes say what happened to the file; failed ones carry the path and
//! the error that stopped it. `RunReport` folds the outcomes of a whole run
//! together without dropping any failure, and decides whether the run as a
//! whole failed.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::GsubError;

/// Before/after content of a file, kept only for dry runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub before: String,
    pub after: String,
}

impl Preview {
    pub fn new(before: &[u8], after: &[u8]) -> Self {
        Self {
            before: String::from_utf8_lossy(before).into_owned(),
            after: String::from_utf8_lossy(after).into_owned(),
        }
    }
}

/// What happened to a file that was processed successfully
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Unchanged,
    Rewritten,
    Renamed,
    RewrittenAndRenamed,
}

/// A successfully processed file
#[derive(Debug, Clone)]
pub struct FileChange {
    /// The candidate path as it was handed to the rewriter
    pub path: PathBuf,
    /// Whether any rule matched the content
    pub rewritten: bool,
    /// The new path, if the file was (or in a dry run, would be) moved
    pub renamed_to: Option<PathBuf>,
    /// Content before and after, only in dry runs
    pub preview: Option<Preview>,
}

impl FileChange {
    pub fn unchanged(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            rewritten: false,
            renamed_to: None,
            preview: None,
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match (self.rewritten, self.renamed_to.is_some()) {
            (false, false) => ChangeKind::Unchanged,
            (true, false) => ChangeKind::Rewritten,
            (false, true) => ChangeKind::Renamed,
            (true, true) => ChangeKind::RewrittenAndRenamed,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        self.kind() == ChangeKind::Unchanged
    }
}

/// A file that could not be processed
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: GsubError,
}

impl FileFailure {
    pub fn new(path: impl Into<PathBuf>, error: GsubError) -> Self {
        Self {
            path: path.into(),
            error,
        }
    }
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // File operation errors already name their path
        match self.error.path() {
            Some(_) => write!(f, "{}", self.error),
            None => write!(f, "{}: {}", self.path.display(), self.error),
        }
    }
}

impl std::error::Error for FileFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// The result of processing one candidate file
pub type FileOutcome = Result<FileChange, FileFailure>;

/// Aggregated outcome of a run
#[derive(Debug, Default)]
pub struct RunReport {
    /// Files that were processed without error, in candidate order
    pub changes: Vec<FileChange>,
    /// Every per-file failure
    pub failures: Vec<FileFailure>,
    /// Total number of files processed, failed ones included
    pub files_processed: usize,
    /// Number of files whose content was rewritten
    pub files_rewritten: usize,
    /// Number of files that were moved
    pub files_renamed: usize,
}

impl RunReport {
    /// Creates a new empty report
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_outcomes(outcomes: impl IntoIterator<Item = FileOutcome>) -> Self {
        let mut report = Self::new();
        for outcome in outcomes {
            report.add_outcome(outcome);
        }
        report
    }

    /// Adds one file's outcome to the report
    pub fn add_outcome(&mut self, outcome: FileOutcome) {
        self.files_processed += 1;
        match outcome {
            Ok(change) => {
                if change.rewritten {
                    self.files_rewritten += 1;
                }
                if change.renamed_to.is_some() {
                    self.files_renamed += 1;
                }
                self.changes.push(change);
            }
            Err(failure) => self.failures.push(failure),
        }
    }

    /// True if any file failed; the process must then exit non-zero
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// One user-facing line per failure
    pub fn failure_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.failures.iter().map(|failure| failure.to_string())
    }

    /// Files whose content or path changed
    pub fn modified(&self) -> impl Iterator<Item = &FileChange> {
        self.changes.iter().filter(|change| !change.is_unchanged())
    }

    /// Looks up the successful outcome for a candidate path
    pub fn change_for(&self, path: &Path) -> Option<&FileChange> {
        self.changes.iter().find(|change| change.path == path)
    }
}
