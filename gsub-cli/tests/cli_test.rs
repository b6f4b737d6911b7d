use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process;
use tempfile::{tempdir, TempDir};

/// Creates a repository with the given files tracked (nothing committed)
fn create_repo(files: &[(&str, &str)]) -> Result<TempDir> {
    let dir = tempdir()?;
    git(dir.path(), &["init", "-q"])?;
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
    }
    git(dir.path(), &["add", "."])?;
    Ok(dir)
}

fn git(dir: &Path, args: &[&str]) -> Result<()> {
    let status = process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()?;
    anyhow::ensure!(status.success(), "git {:?} failed", args);
    Ok(())
}

fn git_gsub(dir: &TempDir) -> Result<Command> {
    let mut cmd = Command::cargo_bin("git-gsub")?;
    cmd.current_dir(dir.path())
        .env_remove("GIT_GSUB_MAX_CONCURRENCY")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .env("XDG_CONFIG_HOME", dir.path().join(".config"));
    Ok(cmd)
}

fn read(dir: &TempDir, name: &str) -> Result<String> {
    Ok(fs::read_to_string(dir.path().join(name))?)
}

#[test]
fn test_simple_substitution() -> Result<()> {
    let dir = create_repo(&[("README.md", "Git Subversion Bzr")])?;

    git_gsub(&dir)?.args(["Bzr", "Mercurial"]).assert().success();

    assert_eq!(read(&dir, "README.md")?, "Git Subversion Mercurial");
    Ok(())
}

#[test]
fn test_snake_rename() -> Result<()> {
    let dir = create_repo(&[("README-git_gsub.md", "GitGsub git_gsub git-gsub")])?;

    git_gsub(&dir)?
        .args(["--snake", "--rename", "GitGsub", "SvnGsub"])
        .assert()
        .success();

    assert!(!dir.path().join("README-git_gsub.md").exists());
    assert_eq!(read(&dir, "README-svn_gsub.md")?, "SvnGsub svn_gsub git-gsub");
    Ok(())
}

#[test]
fn test_options_after_arguments() -> Result<()> {
    let dir = create_repo(&[("README-git_gsub.md", "GitGsub git_gsub git-gsub")])?;

    git_gsub(&dir)?
        .args(["GitGsub", "SvnGsub", "--snake", "-r"])
        .assert()
        .success();

    assert_eq!(read(&dir, "README-svn_gsub.md")?, "SvnGsub svn_gsub git-gsub");
    Ok(())
}

#[test]
fn test_capture_groups() -> Result<()> {
    let dir = create_repo(&[("README.md", "git-foo-1 git-bar-22 git-baz-3")])?;

    git_gsub(&dir)?
        .args(["git-([a-z]+)-([0-9]{1,2})", "$2-$1"])
        .assert()
        .success();

    assert_eq!(read(&dir, "README.md")?, "1-foo 22-bar 3-baz");
    Ok(())
}

#[test]
fn test_fixed_string() -> Result<()> {
    let dir = create_repo(&[("hello.rb", "puts('hello')"), ("other.rb", "puts 1")])?;

    git_gsub(&dir)?.args(["--fgrep", "(", " "]).assert().success();

    assert_eq!(read(&dir, "hello.rb")?, "puts 'hello')");
    assert_eq!(read(&dir, "other.rb")?, "puts 1");
    Ok(())
}

#[test]
fn test_concurrency_does_not_change_results() -> Result<()> {
    let files: Vec<(String, String)> = (0..6)
        .map(|i| {
            (
                format!("lib/git_gsub_{}.rb", i),
                format!("class GitGsub{} # git_gsub {}", i, i),
            )
        })
        .collect();
    let files: Vec<(&str, &str)> = files
        .iter()
        .map(|(name, content)| (name.as_str(), content.as_str()))
        .collect();

    let mut results = Vec::new();
    for concurrency in ["1", "100"] {
        let dir = create_repo(&files)?;
        git_gsub(&dir)?
            .env("GIT_GSUB_MAX_CONCURRENCY", concurrency)
            .args(["--snake", "--rename", "GitGsub", "SvnGsub"])
            .assert()
            .success();

        let mut tree = Vec::new();
        for entry in fs::read_dir(dir.path().join("lib"))? {
            let path = entry?.path();
            tree.push((
                path.file_name().unwrap().to_string_lossy().into_owned(),
                fs::read_to_string(&path)?,
            ));
        }
        tree.sort();
        results.push(tree);
    }

    assert_eq!(results[0].len(), 6);
    assert_eq!(results[0], results[1]);
    assert!(results[0]
        .iter()
        .all(|(name, content)| name.starts_with("svn_gsub_") && content.contains("svn_gsub")));
    Ok(())
}

#[test]
fn test_invalid_max_concurrency() -> Result<()> {
    let dir = create_repo(&[("README.md", "Git Subversion Bzr")])?;

    git_gsub(&dir)?
        .env("GIT_GSUB_MAX_CONCURRENCY", "lots")
        .args(["Bzr", "Mercurial"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("GIT_GSUB_MAX_CONCURRENCY"));

    assert_eq!(read(&dir, "README.md")?, "Git Subversion Bzr");
    Ok(())
}

#[test]
fn test_ruby_rename() -> Result<()> {
    let dir = create_repo(&[(
        "foo_bar/baz.rb",
        "module FooBar::Baz; foo_bar baz # foo_bar/baz; end",
    )])?;

    git_gsub(&dir)?
        .args(["--ruby", "--rename", "FooBar::Baz", "QuxQuux::Quuz"])
        .assert()
        .success();

    assert!(!dir.path().join("foo_bar/baz.rb").exists());
    assert_eq!(
        read(&dir, "qux_quux/quuz.rb")?,
        "module QuxQuux::Quuz; foo_bar baz # qux_quux/quuz; end"
    );
    Ok(())
}

#[test]
fn test_all_leaves_module_paths_alone() -> Result<()> {
    let dir = create_repo(&[(
        "foo_bar/baz.rb",
        "module FooBar::Baz; foo_bar baz # foo_bar/baz; end",
    )])?;

    git_gsub(&dir)?
        .args(["--all", "--rename", "FooBar::Baz", "QuxQuux::Quuz"])
        .assert()
        .success();

    assert_eq!(
        read(&dir, "foo_bar/baz.rb")?,
        "module QuxQuux::Quuz; foo_bar baz # foo_bar/baz; end"
    );
    Ok(())
}

#[test]
fn test_all_plus_ruby_leaves_screaming_snake_alone() -> Result<()> {
    let dir = create_repo(&[(
        "foo_bar/baz.rb",
        "FOO_BAR_BAZ=1; module FooBar::Baz; foo_bar baz # foo_bar/baz; end",
    )])?;

    git_gsub(&dir)?
        .args(["--all", "--ruby", "--rename", "FooBar::Baz", "QuxQuux::Quuz"])
        .assert()
        .success();

    assert!(!dir.path().join("foo_bar/baz.rb").exists());
    assert_eq!(
        read(&dir, "qux_quux/quuz.rb")?,
        "FOO_BAR_BAZ=1; module QuxQuux::Quuz; foo_bar baz # qux_quux/quuz; end"
    );
    Ok(())
}

#[test]
fn test_braces_outside_repetition_are_literal() -> Result<()> {
    let dir = create_repo(&[("README.md", "{git{svn}}")])?;

    git_gsub(&dir)?
        .args(["{git{svn}}", "{hg{svn}}"])
        .assert()
        .success();

    assert_eq!(read(&dir, "README.md")?, "{hg{svn}}");
    Ok(())
}

#[test]
fn test_repeated_derivations_apply_once() -> Result<()> {
    let dir = create_repo(&[("README.md", "activerecord")])?;

    git_gsub(&dir)?
        .args(["--all", "activerecord", "inactiverecord"])
        .assert()
        .success();

    assert_eq!(read(&dir, "README.md")?, "inactiverecord");
    Ok(())
}

#[test]
fn test_submatch_rename() -> Result<()> {
    let dir = create_repo(&[
        ("git/lib.rb", "puts 'Git'"),
        ("svn/lib.rb", "puts 'Subversion'"),
        ("bzr/lib.rb", "puts 'Bazaar'"),
    ])?;

    git_gsub(&dir)?
        .args(["--rename", "(git|svn|bzr)/lib", "lib/$1"])
        .assert()
        .success();

    assert_eq!(read(&dir, "lib/git.rb")?, "puts 'Git'");
    assert_eq!(read(&dir, "lib/svn.rb")?, "puts 'Subversion'");
    assert_eq!(read(&dir, "lib/bzr.rb")?, "puts 'Bazaar'");
    Ok(())
}

#[test]
fn test_paths_with_spaces_and_utf8() -> Result<()> {
    let dir = create_repo(&[
        ("git gsub.txt", "Git Gsub"),
        ("日本語/git.txt", "Git 日本語"),
    ])?;

    git_gsub(&dir)?
        .args(["--rename", "git", "svn"])
        .assert()
        .success();

    assert_eq!(read(&dir, "svn gsub.txt")?, "Git Gsub");
    assert_eq!(read(&dir, "日本語/svn.txt")?, "Git 日本語");
    Ok(())
}

#[test]
fn test_path_filter() -> Result<()> {
    let dir = create_repo(&[("lib/a.rb", "Bzr"), ("spec/a.rb", "Bzr")])?;

    git_gsub(&dir)?.args(["Bzr", "Hg", "lib"]).assert().success();

    assert_eq!(read(&dir, "lib/a.rb")?, "Hg");
    assert_eq!(read(&dir, "spec/a.rb")?, "Bzr");
    Ok(())
}

#[test]
fn test_untracked_files_are_ignored() -> Result<()> {
    let dir = create_repo(&[("tracked.txt", "Bzr")])?;
    fs::write(dir.path().join("untracked.txt"), "Bzr")?;

    git_gsub(&dir)?.args(["Bzr", "Hg"]).assert().success();

    assert_eq!(read(&dir, "tracked.txt")?, "Hg");
    assert_eq!(read(&dir, "untracked.txt")?, "Bzr");
    Ok(())
}

#[test]
fn test_dry_run() -> Result<()> {
    let dir = create_repo(&[("git.rb", "puts 'git'\n")])?;

    git_gsub(&dir)?
        .args(["--dry-run", "--rename", "git", "svn"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-puts 'git'"))
        .stdout(predicate::str::contains("+puts 'svn'"))
        .stdout(predicate::str::contains("rename"));

    assert_eq!(read(&dir, "git.rb")?, "puts 'git'\n");
    assert!(!dir.path().join("svn.rb").exists());
    Ok(())
}

#[test]
fn test_failed_file_does_not_stop_others() -> Result<()> {
    let dir = create_repo(&[("gone.txt", "Bzr"), ("kept.txt", "Bzr")])?;
    fs::remove_file(dir.path().join("gone.txt"))?;

    git_gsub(&dir)?
        .args(["Bzr", "Hg"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("gone.txt"));

    assert_eq!(read(&dir, "kept.txt")?, "Hg");
    Ok(())
}

#[test]
fn test_invalid_pattern() -> Result<()> {
    let dir = create_repo(&[("README.md", "Bzr")])?;

    git_gsub(&dir)?
        .args(["(unclosed", "x"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid pattern"));

    assert_eq!(read(&dir, "README.md")?, "Bzr");
    Ok(())
}

#[test]
fn test_outside_repository() -> Result<()> {
    let dir = tempdir()?;
    fs::write(dir.path().join("README.md"), "Bzr")?;

    git_gsub(&dir)?
        .env("GIT_CEILING_DIRECTORIES", dir.path())
        .args(["Bzr", "Hg"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to list files"));

    assert_eq!(read(&dir, "README.md")?, "Bzr");
    Ok(())
}

#[test]
fn test_missing_arguments_print_usage() -> Result<()> {
    let dir = tempdir()?;

    git_gsub(&dir)?
        .arg("only-search")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Usage"));
    Ok(())
}

#[test]
fn test_version() -> Result<()> {
    let dir = tempdir()?;

    for flag in ["-v", "--version"] {
        git_gsub(&dir)?
            .arg(flag)
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }
    Ok(())
}

#[test]
fn test_config_file() -> Result<()> {
    let dir = create_repo(&[("README.md", "Bzr")])?;
    fs::write(dir.path().join("gsub.yaml"), "max_concurrency: 1\n")?;

    git_gsub(&dir)?
        .args(["--config", "gsub.yaml", "Bzr", "Hg"])
        .assert()
        .success();

    assert_eq!(read(&dir, "README.md")?, "Hg");
    Ok(())
}
