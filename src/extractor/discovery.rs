use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::warn;
use walkdir::WalkDir;

const LOG_EXTENSION: &str = "jsonl";

/// Find every conversation log (`*.jsonl`) below the projects directory
///
/// The walk is recursive, does not follow symlinks, and yields paths sorted by
/// file name at each level so extraction order is stable between runs.
/// Returns an empty Vec if the directory doesn't exist (not an error).
/// Unreadable directory entries are logged and skipped.
pub fn discover_log_files(projects_dir: &Path) -> Result<Vec<PathBuf>> {
    if !projects_dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(projects_dir).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", projects_dir.display(), e);
                continue;
            }
        };

        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().is_some_and(|ext| ext == LOG_EXTENSION)
        {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}
