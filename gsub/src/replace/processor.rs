use std::fs;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

use super::rules::RuleSet;
use crate::errors::{FileOperation, GsubError, GsubResult};
use crate::results::{FileChange, FileFailure, FileOutcome, Preview};

/// How the rewriter treats each file
#[derive(Debug, Clone, Default)]
pub struct RewriteOptions {
    /// Also apply the rules to the file's path and move it
    pub rename: bool,
    /// Compute changes without writing or moving anything
    pub dry_run: bool,
    /// Directory candidate paths are relative to; the process working
    /// directory if unset. Rules see the candidate path, never this prefix.
    pub base_dir: Option<PathBuf>,
}

/// Applies a rule set to one file at a time
#[derive(Debug)]
pub struct FileProcessor<'a> {
    rules: &'a RuleSet,
    options: &'a RewriteOptions,
}

impl<'a> FileProcessor<'a> {
    pub fn new(rules: &'a RuleSet, options: &'a RewriteOptions) -> Self {
        Self { rules, options }
    }

    /// Rewrites and optionally renames one file.
    ///
    /// Content is written back to the original location before the file is
    /// moved, so a renamed file always carries its rewritten content. An
    /// existing file at the rename target is replaced.
    pub fn process_file(&self, path: &Path) -> FileOutcome {
        trace!("Processing file: {}", path.display());
        self.rewrite(path).map_err(|error| FileFailure::new(path, error))
    }

    fn rewrite(&self, path: &Path) -> GsubResult<FileChange> {
        let location = self.resolve(path);

        let metadata = fs::metadata(&location)
            .map_err(|e| GsubError::file_operation(path, FileOperation::Stat, e))?;
        // A rename elsewhere in the run can leave a directory where a file was listed
        if metadata.is_dir() {
            trace!("Skipping directory: {}", path.display());
            return Ok(FileChange::unchanged(path));
        }

        let content = fs::read(&location)
            .map_err(|e| GsubError::file_operation(path, FileOperation::Read, e))?;

        let mut change = FileChange::unchanged(path);
        if let Some(rewritten) = self.rules.apply(&content) {
            change.rewritten = true;
            if self.options.dry_run {
                change.preview = Some(Preview::new(&content, &rewritten));
            } else {
                fs::write(&location, &rewritten)
                    .map_err(|e| GsubError::file_operation(path, FileOperation::Write, e))?;
                trace!("Rewrote {}", path.display());
            }
        }

        if self.options.rename {
            if let Some(new_path) = self.renamed_path(path)? {
                if !self.options.dry_run {
                    self.move_file(path, &new_path)?;
                    trace!("Renamed {} to {}", path.display(), new_path.display());
                }
                change.renamed_to = Some(new_path);
            }
        }

        Ok(change)
    }

    /// Applies the rules to the path text; `None` if the path stays put
    fn renamed_path(&self, path: &Path) -> GsubResult<Option<PathBuf>> {
        let Some(original) = path.to_str() else {
            warn!("Not renaming non UTF-8 path: {}", path.display());
            return Ok(None);
        };

        let Some(renamed) = self.rules.apply(original.as_bytes()) else {
            return Ok(None);
        };
        let renamed = String::from_utf8(renamed).map_err(|e| GsubError::encoding_error(path, e))?;

        Ok((renamed != original).then(|| PathBuf::from(renamed)))
    }

    fn move_file(&self, from: &Path, to: &Path) -> GsubResult<()> {
        let target = self.resolve(to);
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| GsubError::file_operation(to, FileOperation::CreateDir, e))?;
        }
        fs::rename(self.resolve(from), &target)
            .map_err(|e| GsubError::file_operation(from, FileOperation::Rename, e))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.options.base_dir {
            Some(base) => base.join(path),
            None => path.to_path_buf(),
        }
    }
}
