use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::env::{self, VarError};
use std::path::{Path, PathBuf};

use crate::case::CaseStyle;
use crate::errors::{GsubError, GsubResult};
use crate::replace::{RewriteOptions, RuleSet};

/// Environment variable overriding the worker pool size
pub const MAX_CONCURRENCY_ENV: &str = "GIT_GSUB_MAX_CONCURRENCY";

/// Worker pool size when nothing else is configured
pub const DEFAULT_MAX_CONCURRENCY: usize = 100;

/// Configuration for one gsub invocation.
///
/// # Configuration Locations
///
/// Settings are layered, later sources winning:
/// 1. Global `$HOME/.config/git-gsub/config.yaml`
/// 2. Local `.git-gsub.yaml` in the current directory
/// 3. Custom config file specified via `--config`
/// 4. The `GIT_GSUB_MAX_CONCURRENCY` environment variable
///
/// ```yaml
/// # Upper bound on files rewritten at the same time (0 = one per CPU)
/// max_concurrency: 32
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
/// ```
///
/// The search/replace pair, path filters and flags always come from the
/// command line; see `merge_with_cli`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GsubConfig {
    /// Search pattern (regex unless `fixed_string`)
    #[serde(default)]
    pub search: String,

    /// Replacement template, may reference capture groups (`$1`)
    #[serde(default)]
    pub replacement: String,

    /// Path filters handed to git
    #[serde(default)]
    pub paths: Vec<PathBuf>,

    /// Match `search` literally
    #[serde(default)]
    pub fixed_string: bool,

    /// Case styles to derive extra rules for
    #[serde(default)]
    pub case_styles: Vec<CaseStyle>,

    /// Rename files whose path matches
    #[serde(default)]
    pub rename: bool,

    /// Compute changes without touching the filesystem
    #[serde(default)]
    pub dry_run: bool,

    /// Upper bound on concurrently processed files
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for GsubConfig {
    fn default() -> Self {
        Self {
            search: String::new(),
            replacement: String::new(),
            paths: Vec::new(),
            fixed_string: false,
            case_styles: Vec::new(),
            rename: false,
            dry_run: false,
            max_concurrency: default_max_concurrency(),
            log_level: default_log_level(),
        }
    }
}

impl GsubConfig {
    /// Loads configuration from the default locations and the process environment
    pub fn load(config_path: Option<&Path>) -> GsubResult<Self> {
        let max_concurrency = match env::var(MAX_CONCURRENCY_ENV) {
            Ok(value) => Some(value),
            Err(VarError::NotPresent) => None,
            Err(VarError::NotUnicode(raw)) => {
                return Err(GsubError::config_error(format!(
                    "{} must be a non-negative integer, got {:?}",
                    MAX_CONCURRENCY_ENV, raw
                )))
            }
        };
        Self::load_from(config_path, max_concurrency.as_deref())
    }

    /// Loads configuration from the default locations, a specific file, and
    /// an explicit max-concurrency override
    pub fn load_from(config_path: Option<&Path>, max_concurrency: Option<&str>) -> GsubResult<Self> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("git-gsub/config.yaml")),
            Some(PathBuf::from(".git-gsub.yaml")),
        ];
        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicitly requested file must exist
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        if let Some(raw) = max_concurrency {
            let value = parse_max_concurrency(raw)?;
            let value = i64::try_from(value).map_err(|_| {
                GsubError::config_error(format!("{} is out of range: {}", MAX_CONCURRENCY_ENV, raw))
            })?;
            builder = builder.set_override("max_concurrency", value)?;
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Takes every invocation field from the command line; file and
    /// environment settings are kept
    pub fn merge_with_cli(mut self, cli_config: GsubConfig) -> Self {
        self.search = cli_config.search;
        self.replacement = cli_config.replacement;
        self.paths = cli_config.paths;
        self.fixed_string = cli_config.fixed_string;
        self.case_styles = cli_config.case_styles;
        self.rename = cli_config.rename;
        self.dry_run = cli_config.dry_run;
        if cli_config.log_level != default_log_level() {
            self.log_level = cli_config.log_level;
        }
        self
    }

    /// Compiles the rule set for this invocation
    pub fn rule_set(&self) -> GsubResult<RuleSet> {
        RuleSet::build(
            &self.search,
            &self.replacement,
            self.fixed_string,
            &self.case_styles,
        )
    }

    pub fn rewrite_options(&self) -> RewriteOptions {
        RewriteOptions {
            rename: self.rename,
            dry_run: self.dry_run,
            base_dir: None,
        }
    }
}

/// Parses a max-concurrency setting; anything but a non-negative integer is rejected
pub fn parse_max_concurrency(raw: &str) -> GsubResult<usize> {
    raw.parse::<usize>().map_err(|e| {
        GsubError::config_error(format!(
            "{} must be a non-negative integer, got {:?}: {}",
            MAX_CONCURRENCY_ENV, raw, e
        ))
    })
}
