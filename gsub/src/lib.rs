pub mod case;
pub mod config;
pub mod errors;
pub mod git;
pub mod replace;
pub mod results;

pub use case::CaseStyle;
pub use config::GsubConfig;
pub use errors::{GsubError, GsubResult};
pub use git::GitFiles;
pub use replace::{run, FileProcessor, RewriteOptions, Rule, RuleSet};
pub use results::{ChangeKind, FileChange, FileFailure, FileOutcome, RunReport};
