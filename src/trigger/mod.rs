//! Once-per-day run guard
//!
//! The last run date is kept as `YYYY-MM-DD` in `last_run.txt` under the state
//! directory. Dates are local-calendar dates.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

const STATE_FILE: &str = "last_run.txt";

#[derive(Debug, Clone)]
pub struct DailyTrigger {
    state_dir: PathBuf,
}

impl DailyTrigger {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self { state_dir: state_dir.into() }
    }

    pub fn state_file(&self) -> PathBuf {
        self.state_dir.join(STATE_FILE)
    }

    pub fn should_run_today(&self) -> Result<bool> {
        self.should_run_on(Local::now().date_naive())
    }

    pub fn should_run_on(&self, today: NaiveDate) -> Result<bool> {
        Ok(self.last_run_date()? != Some(today))
    }

    pub fn mark_as_run(&self) -> Result<NaiveDate> {
        let today = Local::now().date_naive();
        self.mark_run_on(today)?;
        Ok(today)
    }

    pub fn mark_run_on(&self, date: NaiveDate) -> Result<()> {
        fs::create_dir_all(&self.state_dir).with_context(|| {
            format!("Failed to create state directory: {}", self.state_dir.display())
        })?;
        let path = self.state_file();
        fs::write(&path, date.format("%Y-%m-%d").to_string())
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// `None` when never run. An unparseable marker is treated as never run.
    pub fn last_run_date(&self) -> Result<Option<NaiveDate>> {
        let path = self.state_file();
        if !path.exists() {
            return Ok(None);
        }
        let content =
            fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(parse_marker(&content))
    }
}

fn parse_marker(content: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(content.trim(), "%Y-%m-%d").ok()
}
