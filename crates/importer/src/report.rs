use chrono::NaiveDate;
use serde::Serialize;
use storage::models::RatingCategory;
use tracing::{error, info, warn};

use crate::canonical::transformer::ImportStats;
use crate::error::Result;

/// Non-fatal findings attached to a file. None of these stop a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    UnmappedSheet {
        sheet: String,
    },
    UnrecognizedLayout {
        sheet: String,
        category: RatingCategory,
    },
    MissingCategories {
        missing: Vec<RatingCategory>,
        available_sheets: Vec<String>,
    },
    UndatedFile {
        filename: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Imported { stats: ImportStats },
    AlreadyRecorded,
    Skipped { reason: String },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub outcome: FileOutcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl FileReport {
    pub fn new(filename: impl Into<String>, rating_date: Option<NaiveDate>, outcome: FileOutcome) -> Self {
        Self {
            filename: filename.into(),
            rating_date,
            outcome,
            diagnostics: Vec::new(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    FetchRemote,
    ImportDirectory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunTotals {
    pub files_seen: usize,
    pub files_imported: usize,
    pub files_already_recorded: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub stats: ImportStats,
}

/// Per-file outcomes of one ingestion run plus their aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub mode: RunMode,
    pub dry_run: bool,
    pub files: Vec<FileReport>,
    pub totals: RunTotals,
}

impl RunReport {
    /// Pretty-printed JSON for `--json` output.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn new(mode: RunMode, dry_run: bool) -> Self {
        Self {
            mode,
            dry_run,
            files: Vec::new(),
            totals: RunTotals::default(),
        }
    }

    pub fn push(&mut self, file: FileReport) {
        self.totals.files_seen += 1;
        match &file.outcome {
            FileOutcome::Imported { stats } => {
                self.totals.files_imported += 1;
                self.totals.stats.absorb(stats);
            }
            FileOutcome::AlreadyRecorded => self.totals.files_already_recorded += 1,
            FileOutcome::Skipped { .. } => self.totals.files_skipped += 1,
            FileOutcome::Failed { .. } => self.totals.files_failed += 1,
        }
        self.files.push(file);
    }

    pub fn has_failures(&self) -> bool {
        self.totals.files_failed > 0
    }

    pub fn log_summary(&self) {
        for file in &self.files {
            if let FileOutcome::Failed { error } = &file.outcome {
                error!("  ✗ {}: {}", file.filename, error);
            }
        }

        let totals = &self.totals;
        info!(
            "Summary{}: {} file(s) seen, {} imported, {} already recorded, {} skipped, {} failed",
            if self.dry_run { " (dry run)" } else { "" },
            totals.files_seen,
            totals.files_imported,
            totals.files_already_recorded,
            totals.files_skipped,
            totals.files_failed
        );
        info!(
            "Players: {} created, {} updated. Snapshots: {} created, {} skipped ({} records read)",
            totals.stats.players_created,
            totals.stats.players_updated,
            totals.stats.snapshots_created,
            totals.stats.snapshots_skipped,
            totals.stats.records_seen
        );
        if self.has_failures() {
            warn!("{} file(s) failed; re-running the job is safe", totals.files_failed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_follow_outcomes() {
        let mut report = RunReport::new(RunMode::ImportDirectory, false);
        let stats = ImportStats {
            players_created: 2,
            snapshots_created: 3,
            records_seen: 3,
            ..ImportStats::default()
        };
        report.push(FileReport::new("a.xlsx", None, FileOutcome::Imported { stats }));
        report.push(FileReport::new("b.xlsx", None, FileOutcome::Imported { stats }));
        report.push(FileReport::new("c.xlsx", None, FileOutcome::AlreadyRecorded));
        report.push(FileReport::new(
            "d.xlsx",
            None,
            FileOutcome::Failed { error: "boom".into() },
        ));

        assert_eq!(report.totals.files_seen, 4);
        assert_eq!(report.totals.files_imported, 2);
        assert_eq!(report.totals.files_already_recorded, 1);
        assert_eq!(report.totals.stats.players_created, 4);
        assert_eq!(report.totals.stats.snapshots_created, 6);
        assert!(report.has_failures());
    }

    #[test]
    fn test_report_serializes_with_tags() {
        let mut report = RunReport::new(RunMode::FetchRemote, true);
        report.push(
            FileReport::new(
                "rating_2024-03-01.xlsx",
                NaiveDate::from_ymd_opt(2024, 3, 1),
                FileOutcome::Skipped { reason: "already applied".into() },
            )
            .with_diagnostics(vec![Diagnostic::UnmappedSheet { sheet: "Лист1".into() }]),
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "fetch_remote");
        assert_eq!(json["files"][0]["status"], "skipped");
        assert_eq!(json["files"][0]["rating_date"], "2024-03-01");
        assert_eq!(json["files"][0]["diagnostics"][0]["kind"], "unmapped_sheet");

        let text = report.to_json().unwrap();
        assert!(text.contains("\"status\": \"skipped\""));
    }
}
