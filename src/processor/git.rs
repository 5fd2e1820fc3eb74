use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};

/// Stage `files` and commit them in one transaction.
///
/// The commit is limited to `files`; anything else already staged stays staged.
///
/// Paths are passed relative to the repository when they live inside it.
pub fn commit_files(repo: &Path, files: &[PathBuf], message: &str) -> Result<()> {
    if files.is_empty() {
        return Ok(());
    }

    let relative: Vec<&Path> =
        files.iter().map(|f| f.strip_prefix(repo).unwrap_or(f.as_path())).collect();

    let mut add = Command::new("git");
    add.arg("add").arg("--").args(&relative);
    run(add, repo, "git add")?;

    let mut commit = Command::new("git");
    commit.args(["commit", "-m", message, "--"]).args(&relative);
    run(commit, repo, "git commit")?;

    Ok(())
}

fn run(mut command: Command, repo: &Path, what: &str) -> Result<()> {
    let output = command
        .current_dir(repo)
        .output()
        .with_context(|| format!("Failed to run {} in {}", what, repo.display()))?;

    if !output.status.success() {
        bail!(
            "{} failed ({}): {}",
            what,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}
