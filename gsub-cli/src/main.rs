use anyhow::{Context, Result};
use clap::{error::ErrorKind, ArgAction, Parser};
use colored::Colorize;
use gsub::{CaseStyle, GitFiles, GsubConfig, RunReport};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod diff_utils;

/// Substitute text and rename files across a git repository
#[derive(Parser)]
#[command(name = "git-gsub", author, version, about, long_about = None, disable_version_flag = true)]
struct Cli {
    /// Pattern to search for (regular expression unless --fgrep)
    search: String,

    /// Replacement text; $1, $2, ... refer to capture groups
    replace: String,

    /// Only consider tracked files under these paths
    paths: Vec<PathBuf>,

    /// Also substitute snake_case variants
    #[arg(long)]
    snake: bool,

    /// Also substitute kebab-case variants
    #[arg(long)]
    kebab: bool,

    /// Also substitute CamelCase variants (same as --upper-camel)
    #[arg(long)]
    camel: bool,

    /// Also substitute UpperCamelCase variants
    #[arg(long)]
    upper_camel: bool,

    /// Also substitute lowerCamelCase variants
    #[arg(long)]
    lower_camel: bool,

    /// Also substitute SCREAMING_SNAKE_CASE variants
    #[arg(long)]
    screaming_snake: bool,

    /// Also substitute Ruby module paths (foo_bar/baz) and names (FooBar::Baz)
    #[arg(long)]
    ruby: bool,

    /// Shorthand for --snake --kebab --camel
    #[arg(long)]
    all: bool,

    /// Rename files whose path matches
    #[arg(short = 'r', long)]
    rename: bool,

    /// Interpret the search pattern as a fixed string
    #[arg(short = 'F', long = "fgrep")]
    fixed_string: bool,

    /// Show what would change without modifying anything
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,
}

impl Cli {
    fn case_styles(&self) -> Vec<CaseStyle> {
        let mut styles = Vec::new();
        if self.all {
            styles.extend(CaseStyle::ALL);
        }
        if self.ruby {
            styles.extend(CaseStyle::MODULE);
        }
        let flags = [
            (self.snake, CaseStyle::Snake),
            (self.kebab, CaseStyle::Kebab),
            (self.camel, CaseStyle::Camel),
            (self.upper_camel, CaseStyle::UpperCamel),
            (self.lower_camel, CaseStyle::LowerCamel),
            (self.screaming_snake, CaseStyle::ScreamingSnake),
        ];
        styles.extend(
            flags
                .into_iter()
                .filter(|(enabled, _)| *enabled)
                .map(|(_, style)| style),
        );
        styles
    }

    fn to_config(&self) -> GsubConfig {
        GsubConfig {
            search: self.search.clone(),
            replacement: self.replace.clone(),
            paths: self.paths.clone(),
            fixed_string: self.fixed_string,
            case_styles: self.case_styles(),
            rename: self.rename,
            dry_run: self.dry_run,
            ..GsubConfig::default()
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let printed = err.print();
            return ExitCode::from(parse_error_exit_code(err.kind(), &printed));
        }
    };

    match run(&cli) {
        Ok(report) if !report.has_failures() => ExitCode::SUCCESS,
        Ok(report) => {
            for line in report.failure_lines() {
                eprintln!("{} {}", "error:".red().bold(), line);
            }
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

/// Help and version exit 0 once printed; usage errors, and output that
/// could not be written, exit 1
fn parse_error_exit_code(kind: ErrorKind, printed: &io::Result<()>) -> u8 {
    match (kind, printed) {
        (ErrorKind::DisplayHelp | ErrorKind::DisplayVersion, Ok(())) => 0,
        _ => 1,
    }
}

fn run(cli: &Cli) -> Result<RunReport> {
    let config = GsubConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?
        .merge_with_cli(cli.to_config());
    init_tracing(&config.log_level);
    debug!("Using configuration: {:?}", config);

    let rules = config.rule_set()?;
    let files = GitFiles::new().candidates(
        &rules,
        config.fixed_string,
        config.rename,
        &config.paths,
    )?;
    let report = gsub::run(
        &rules,
        &config.rewrite_options(),
        &files,
        config.max_concurrency,
    )?;

    if config.dry_run {
        print_dry_run(&report);
    }
    Ok(report)
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_dry_run(report: &RunReport) {
    println!("{}", "Dry run - no changes will be made".yellow());
    for change in report.modified() {
        let new_path = change.renamed_to.as_deref().unwrap_or(change.path.as_path());
        if let Some(preview) = &change.preview {
            diff_utils::print_unified_diff(&change.path, new_path, &preview.before, &preview.after);
        }
        if change.renamed_to.is_some() {
            diff_utils::print_rename(&change.path, new_path);
        }
    }
    println!(
        "\n{} files would be rewritten, {} renamed",
        report.files_rewritten, report.files_renamed
    );
}
