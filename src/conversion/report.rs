//! Run report: what a command wrote and what it had to skip.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Summary of one command run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunReport {
    /// Command name, e.g. `coco`.
    pub task: String,
    /// Files written, in write order.
    pub outputs: Vec<PathBuf>,
    /// Images included across all outputs.
    pub images: usize,
    /// Annotations (boxes) written across all outputs.
    pub annotations: usize,
    /// Items that were skipped or failed.
    pub issues: Vec<RunIssue>,
}

impl RunReport {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            ..Default::default()
        }
    }

    pub fn add_output(&mut self, path: impl Into<PathBuf>) {
        self.outputs.push(path.into());
    }

    /// Records an item skipped because its input was missing or unreadable.
    pub fn skip(&mut self, path: &Path, message: impl Into<String>) {
        self.issues
            .push(RunIssue::new(RunSeverity::Skipped, path, message));
    }

    /// Records an item whose output could not be produced.
    pub fn fail(&mut self, path: &Path, message: impl Into<String>) {
        self.issues
            .push(RunIssue::new(RunSeverity::Failed, path, message));
    }

    /// Folds another report's counts and issues into this one.
    pub fn merge(&mut self, other: RunReport) {
        self.outputs.extend(other.outputs);
        self.images += other.images;
        self.annotations += other.annotations;
        self.issues.extend(other.issues);
    }

    pub fn skipped_count(&self) -> usize {
        self.count(RunSeverity::Skipped)
    }

    pub fn failure_count(&self) -> usize {
        self.count(RunSeverity::Failed)
    }

    /// True when nothing failed; skips do not count.
    pub fn is_ok(&self) -> bool {
        self.failure_count() == 0
    }

    fn count(&self, severity: RunSeverity) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .count()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} file(s) written, {} image(s), {} annotation(s)",
            self.task,
            self.outputs.len(),
            self.images,
            self.annotations
        )?;

        if !self.issues.is_empty() {
            writeln!(
                f,
                "  {} skipped, {} failed:",
                self.skipped_count(),
                self.failure_count()
            )?;
            for issue in &self.issues {
                writeln!(f, "    {}", issue)?;
            }
        }

        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunSeverity {
    Skipped,
    Failed,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunIssue {
    pub severity: RunSeverity,
    pub path: PathBuf,
    pub message: String,
}

impl RunIssue {
    pub fn new(severity: RunSeverity, path: &Path, message: impl Into<String>) -> Self {
        Self {
            severity,
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

impl fmt::Display for RunIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            RunSeverity::Skipped => "skipped",
            RunSeverity::Failed => "FAILED",
        };
        write!(f, "[{}] {}: {}", tag, self.path.display(), self.message)
    }
}
