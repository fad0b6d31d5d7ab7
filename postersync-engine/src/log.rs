//! Per-run sync log: one entry per target, a summary, and a timestamped
//! file written at the end of a sweep.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use postersync_core::MediaKind;

use crate::error::SyncError;
use crate::reconcile::{SyncOutcome, SyncReport};

#[derive(Debug, Clone)]
pub struct SyncLogEntry {
    pub server: String,
    pub target: String,
    pub kind: MediaKind,
    pub outcome: Option<SyncOutcome>,
    pub uploaded: u32,
    pub failed: u32,
    pub sets_used: Vec<String>,
    pub error: Option<String>,
}

/// Rolled-up counts for the end-of-run summary line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub complete: usize,
    pub already_complete: usize,
    pub partial: usize,
    pub no_candidates: usize,
    pub errors: usize,
    pub uploaded: u32,
    pub failed: u32,
}

impl SyncSummary {
    /// True when anything went wrong, for exit-code purposes.
    pub fn had_errors(&self) -> bool {
        self.errors > 0 || self.failed > 0
    }
}

#[derive(Debug)]
pub struct SyncLog {
    started: DateTime<Local>,
    entries: Vec<SyncLogEntry>,
}

impl Default for SyncLog {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncLog {
    pub fn new() -> Self {
        Self {
            started: Local::now(),
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, server: &str, report: SyncReport) {
        self.entries.push(SyncLogEntry {
            server: server.to_owned(),
            target: report.title,
            kind: report.kind,
            outcome: Some(report.outcome),
            uploaded: report.uploaded,
            failed: report.failed,
            sets_used: report.sets_used,
            error: None,
        });
    }

    pub fn record_error(&mut self, server: &str, target: &str, kind: MediaKind, err: &SyncError) {
        self.entries.push(SyncLogEntry {
            server: server.to_owned(),
            target: target.to_owned(),
            kind,
            outcome: None,
            uploaded: 0,
            failed: 0,
            sets_used: Vec::new(),
            error: Some(err.to_string()),
        });
    }

    pub fn entries(&self) -> &[SyncLogEntry] {
        &self.entries
    }

    pub fn summary(&self) -> SyncSummary {
        let mut summary = SyncSummary::default();
        for entry in &self.entries {
            summary.uploaded += entry.uploaded;
            summary.failed += entry.failed;
            match &entry.outcome {
                Some(SyncOutcome::Complete) => summary.complete += 1,
                Some(SyncOutcome::AlreadyComplete) => summary.already_complete += 1,
                Some(SyncOutcome::Partial { .. }) => summary.partial += 1,
                Some(SyncOutcome::NoCandidates) => summary.no_candidates += 1,
                None => summary.errors += 1,
            }
        }
        summary
    }

    /// Write the log into `dir` with a timestamped name, returning the
    /// path of the file written.
    pub fn write_to_file(&self, dir: &Path) -> std::io::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let filename = format!("postersync-{}.log", self.started.format("%Y%m%d-%H%M%S"));
        let path = dir.join(filename);
        let mut file = fs::File::create(&path)?;

        writeln!(file, "postersync run {}", self.started.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(file)?;
        for entry in &self.entries {
            let status = match (&entry.outcome, &entry.error) {
                (Some(outcome), _) => outcome.display_name().to_owned(),
                (None, Some(err)) => format!("error: {err}"),
                (None, None) => "unknown".to_owned(),
            };
            writeln!(
                file,
                "[{}] {} '{}': {} ({} uploaded, {} failed)",
                entry.server, entry.kind, entry.target, status, entry.uploaded, entry.failed
            )?;
            for set in &entry.sets_used {
                writeln!(file, "    used {set}")?;
            }
            if let Some(SyncOutcome::Partial { missing }) = &entry.outcome {
                for image in missing {
                    writeln!(file, "    missing {image}")?;
                }
            }
        }

        let summary = self.summary();
        writeln!(file)?;
        writeln!(
            file,
            "{} complete, {} already complete, {} partial, {} without candidates, {} errors",
            summary.complete,
            summary.already_complete,
            summary.partial,
            summary.no_candidates,
            summary.errors
        )?;
        writeln!(
            file,
            "{} images uploaded, {} failed",
            summary.uploaded, summary.failed
        )?;
        Ok(path)
    }
}
