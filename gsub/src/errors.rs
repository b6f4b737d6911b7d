//! Error types for gsub.
//!
//! Errors fall into two groups. Pattern, configuration and enumeration
//! errors are fatal: they are raised before any file is touched and abort
//! the invocation. File operation and encoding errors belong to a single
//! path: the engine records them in the run report and keeps going with the
//! remaining files.
//!
//! ```rust,ignore
//! match RuleSet::build("Foo(", "Bar", false, &[]) {
//!     Ok(rules) => // run the engine,
//!     Err(GsubError::InvalidPattern(msg)) => // report and exit 1,
//!     Err(e) => // other fatal error
//! }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for gsub operations
pub type GsubResult<T> = Result<T, GsubError>;

/// The filesystem step that failed while processing a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    Stat,
    Read,
    Write,
    CreateDir,
    Rename,
}

impl fmt::Display for FileOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            FileOperation::Stat => "stat",
            FileOperation::Read => "read",
            FileOperation::Write => "write",
            FileOperation::CreateDir => "create directory for",
            FileOperation::Rename => "rename",
        };
        f.write_str(verb)
    }
}

/// Errors that can occur while building rules, enumerating or rewriting files
#[derive(Error, Debug)]
pub enum GsubError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Configuration error: {0}")]
    Settings(#[from] config::ConfigError),
    #[error("Failed to list files: {0}")]
    Enumeration(String),
    #[error("Failed to {operation} {path}: {source}")]
    FileOperation {
        path: PathBuf,
        operation: FileOperation,
        source: std::io::Error,
    },
    #[error("Invalid UTF-8 in renamed path {path}: {source}")]
    EncodingError {
        path: PathBuf,
        source: std::string::FromUtf8Error,
    },
}

impl GsubError {
    pub fn invalid_pattern(pattern: impl Into<String>) -> Self {
        Self::InvalidPattern(pattern.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn enumeration(msg: impl Into<String>) -> Self {
        Self::Enumeration(msg.into())
    }

    pub fn file_operation(
        path: impl Into<PathBuf>,
        operation: FileOperation,
        source: std::io::Error,
    ) -> Self {
        Self::FileOperation {
            path: path.into(),
            operation,
            source,
        }
    }

    pub fn encoding_error(path: impl Into<PathBuf>, source: std::string::FromUtf8Error) -> Self {
        Self::EncodingError {
            path: path.into(),
            source,
        }
    }

    /// The path a per-file error refers to
    pub fn path(&self) -> Option<&Path> {
        match self {
            GsubError::FileOperation { path, .. } | GsubError::EncodingError { path, .. } => {
                Some(path)
            }
            _ => None,
        }
    }
}
