use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

use crate::errors::{GsubError, GsubResult};
use crate::replace::RuleSet;

/// Exit status git uses for "nothing matched"
const NO_MATCH_STATUS: i32 = 1;

/// Lists candidate files from git's tracked state
#[derive(Debug, Clone, Default)]
pub struct GitFiles {
    work_dir: Option<PathBuf>,
}

impl GitFiles {
    /// Runs git in the process working directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs git in `dir`; returned paths are relative to it
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: Some(dir.into()),
        }
    }

    /// All tracked files under the path filters (`git ls-files`)
    pub fn tracked_files(&self, paths: &[PathBuf]) -> GsubResult<Vec<String>> {
        let mut args = vec!["ls-files".to_string(), "-z".to_string(), "--".to_string()];
        args.extend(paths.iter().map(|p| p.to_string_lossy().into_owned()));
        self.list(&args)
    }

    /// Tracked files containing any of the literals (`git grep -l -F`)
    pub fn grep_files(&self, literals: &[&str], paths: &[PathBuf]) -> GsubResult<Vec<String>> {
        let mut args = vec![
            "grep".to_string(),
            "-l".to_string(),
            "-z".to_string(),
            "-F".to_string(),
        ];
        for literal in literals {
            args.push("-e".to_string());
            args.push(literal.to_string());
        }
        args.push("--".to_string());
        args.extend(paths.iter().map(|p| p.to_string_lossy().into_owned()));
        self.list(&args)
    }

    /// Files the engine should visit.
    ///
    /// `git grep -F` only agrees with the engine's matching when the search
    /// is literal, and it never looks at paths, so the prefilter is used only
    /// for fixed-string runs without renaming. Every other run visits all
    /// tracked files.
    pub fn candidates(
        &self,
        rules: &RuleSet,
        fixed_string: bool,
        rename: bool,
        paths: &[PathBuf],
    ) -> GsubResult<Vec<String>> {
        let files = if fixed_string && !rename {
            self.grep_files(&rules.literals(), paths)?
        } else {
            self.tracked_files(paths)?
        };
        debug!("Found {} candidate files", files.len());
        Ok(files)
    }

    fn list(&self, args: &[String]) -> GsubResult<Vec<String>> {
        let mut command = Command::new("git");
        command.args(args);
        if let Some(dir) = &self.work_dir {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .map_err(|e| GsubError::enumeration(format!("failed to run git: {}", e)))?;

        if !output.status.success() {
            if output.status.code() == Some(NO_MATCH_STATUS) && output.stderr.is_empty() {
                return Ok(Vec::new());
            }
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GsubError::enumeration(format!(
                "git {} exited with {}: {}",
                args.first().map(String::as_str).unwrap_or_default(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(split_paths(&output.stdout))
    }
}

/// Splits NUL-separated git output, dropping empty and non UTF-8 entries
fn split_paths(stdout: &[u8]) -> Vec<String> {
    stdout
        .split(|&b| b == 0)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match std::str::from_utf8(entry) {
            Ok(path) => Some(path.to_string()),
            Err(_) => {
                warn!(
                    "Skipping non UTF-8 path: {}",
                    String::from_utf8_lossy(entry)
                );
                None
            }
        })
        .collect()
}
