use colored::Colorize;
use similar::{ChangeTag, DiffOp, TextDiff};
use std::path::Path;

/// Prints a unified diff between the old and new content of a file.
///
/// `new_path` differs from `old_path` when the file is also being renamed.
pub fn print_unified_diff(old_path: &Path, new_path: &Path, old_content: &str, new_content: &str) {
    let diff = TextDiff::from_lines(old_content, new_content);

    println!("{}", format!("--- a/{}", old_path.display()).bold());
    println!("{}", format!("+++ b/{}", new_path.display()).bold());

    for group in diff.grouped_ops(3) {
        let (mut old_count, mut new_count) = (0, 0);
        let (old_start, new_start) = match group[0] {
            DiffOp::Equal {
                old_index,
                new_index,
                ..
            }
            | DiffOp::Delete {
                old_index,
                new_index,
                ..
            }
            | DiffOp::Insert {
                old_index,
                new_index,
                ..
            }
            | DiffOp::Replace {
                old_index,
                new_index,
                ..
            } => (old_index, new_index),
        };

        for op in &group {
            match *op {
                DiffOp::Delete { old_len, .. } => old_count += old_len,
                DiffOp::Insert { new_len, .. } => new_count += new_len,
                DiffOp::Replace {
                    old_len, new_len, ..
                } => {
                    old_count += old_len;
                    new_count += new_len;
                }
                DiffOp::Equal { len, .. } => {
                    old_count += len;
                    new_count += len;
                }
            }
        }

        println!(
            "{}",
            format!(
                "@@ -{},{} +{},{} @@",
                old_start + 1,
                old_count,
                new_start + 1,
                new_count
            )
            .cyan()
        );

        for op in &group {
            for change in diff.iter_changes(op) {
                let line = change.value().trim_end_matches('\n');
                match change.tag() {
                    ChangeTag::Delete => println!("{}", format!("-{}", line).red()),
                    ChangeTag::Insert => println!("{}", format!("+{}", line).green()),
                    ChangeTag::Equal => println!(" {}", line),
                }
                if change.missing_newline() {
                    println!("\\ No newline at end of file");
                }
            }
        }
    }
}

/// Prints a planned move
pub fn print_rename(old_path: &Path, new_path: &Path) {
    println!(
        "rename {} -> {}",
        old_path.display().to_string().red(),
        new_path.display().to_string().green()
    );
}
