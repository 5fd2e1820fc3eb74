use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::models::LogRecord;

/// A parsed log file: records tagged with their 1-based line numbers
#[derive(Debug, Default)]
pub struct ParsedLog {
    pub records: Vec<(usize, LogRecord)>,
    pub skipped: usize,
}

/// Parse a conversation JSONL file into log records
///
/// Blank lines are ignored. Lines that are not UTF-8, not valid JSON, or whose
/// fields have the wrong shape, are logged and skipped: one bad line never
/// aborts the file. Only failing to open or read the file is an error.
pub fn parse_log_file(path: &Path) -> Result<ParsedLog> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let mut reader = BufReader::new(file);
    let mut parsed = ParsedLog::default();
    let mut buf = Vec::new();
    let mut line_num = 0;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if read == 0 {
            break;
        }
        line_num += 1;

        let bytes = buf.strip_suffix(b"\n").unwrap_or(&buf);
        let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);

        let line = match std::str::from_utf8(bytes) {
            Ok(line) => line,
            Err(e) => {
                debug!("Skipping line {} in {}: {}", line_num, path.display(), e);
                parsed.skipped += 1;
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<LogRecord>(line) {
            Ok(record) => parsed.records.push((line_num, record)),
            Err(e) => {
                debug!("Skipping line {} in {}: {}", line_num, path.display(), e);
                parsed.skipped += 1;
            }
        }
    }

    if parsed.skipped > 0 {
        warn!(
            "Parsed {}: {} records ({} malformed lines skipped)",
            path.display(),
            parsed.records.len(),
            parsed.skipped
        );
    }

    Ok(parsed)
}
