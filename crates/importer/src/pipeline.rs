//! The two ingestion entry points: remote catalog fetch and local
//! directory import. Files are processed one at a time; a failing file is
//! reported and the run moves on.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Utc;
use storage::RatingStore;
use tracing::{debug, info, warn};

use crate::canonical::transformer::{ExistingFilePolicy, FileImport, RatingImporter, SourceDescriptor};
use crate::report::{Diagnostic, FileOutcome, FileReport, RunMode, RunReport};
use crate::sources::catalog::{CatalogEntry, CatalogFetcher};
use crate::sources::directory::{LocalRatingFile, list_rating_files};
use crate::sources::download::{FileDownloader, fingerprint_file};
use crate::spreadsheet::extract_file;
use crate::Result;

#[derive(Debug, Clone)]
pub struct RemoteFetchOptions {
    pub download_dir: PathBuf,
    /// Maximum number of files to download and import.
    pub limit: Option<usize>,
    /// Re-import files the store has already applied.
    pub force: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct DirectoryImportOptions {
    pub directory: PathBuf,
    pub dry_run: bool,
}

/// Catalog, download, parse and import in oldest-first order. Only a
/// catalog failure aborts the run.
pub async fn fetch_remote(
    store: &dyn RatingStore,
    catalog: &CatalogFetcher,
    downloader: &FileDownloader,
    options: &RemoteFetchOptions,
) -> Result<RunReport> {
    let mut entries = catalog.fetch_entries().await?;
    entries.sort_by(|a, b| {
        a.rating_date
            .cmp(&b.rating_date)
            .then_with(|| a.filename.cmp(&b.filename))
    });

    let mut report = RunReport::new(RunMode::FetchRemote, options.dry_run);
    let importer = RatingImporter::new(store).dry_run(options.dry_run);
    let mut seen = HashSet::new();
    let mut processed = 0;

    for entry in &entries {
        if !seen.insert(entry.filename.as_str()) {
            debug!("Catalog lists {} more than once, ignoring duplicate", entry.filename);
            continue;
        }

        if !options.force {
            match store.find_source_file(&entry.filename).await {
                Ok(Some(file)) if file.is_applied() => {
                    debug!("{} already applied, skipping", entry.filename);
                    report.push(FileReport::new(
                        entry.filename.clone(),
                        Some(entry.rating_date),
                        FileOutcome::Skipped {
                            reason: "already applied".to_string(),
                        },
                    ));
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    report.push(failed(entry, e));
                    continue;
                }
            }
        }

        if options.limit.is_some_and(|limit| processed >= limit) {
            info!("Reached file limit of {}", processed);
            break;
        }
        processed += 1;

        info!(
            "[{}] Processing {} ({})",
            processed, entry.filename, entry.rating_date
        );
        let file_report = process_remote_entry(&importer, downloader, entry, &options.download_dir).await;
        report.push(file_report);
    }

    report.log_summary();
    Ok(report)
}

async fn process_remote_entry(
    importer: &RatingImporter<'_>,
    downloader: &FileDownloader,
    entry: &CatalogEntry,
    download_dir: &Path,
) -> FileReport {
    let dest = download_dir.join(&entry.filename);
    let downloaded_at = Utc::now();

    let Some(fingerprint) = downloader.download_with_fingerprint(&entry.url, &dest).await else {
        return FileReport::new(
            entry.filename.clone(),
            Some(entry.rating_date),
            FileOutcome::Failed {
                error: format!("download of {} failed", entry.url),
            },
        );
    };

    let extraction = match extract_file(dest).await {
        Ok(extraction) => extraction,
        Err(e) => return failed(entry, e),
    };

    let source = SourceDescriptor {
        filename: entry.filename.clone(),
        source_url: entry.url.clone(),
        rating_date: entry.rating_date,
        downloaded_at: Some(downloaded_at),
        fingerprint: Some(fingerprint),
    };

    let outcome = match importer
        .import_file(&source, &extraction.records, ExistingFilePolicy::Reprocess)
        .await
    {
        Ok(import) => import.into(),
        Err(e) => FileOutcome::Failed {
            error: e.to_string(),
        },
    };

    FileReport::new(entry.filename.clone(), Some(entry.rating_date), outcome)
        .with_diagnostics(extraction.diagnostics)
}

/// Imports every dated spreadsheet under `directory`, oldest first,
/// leaving already recorded filenames untouched.
pub async fn import_directory(
    store: &dyn RatingStore,
    options: &DirectoryImportOptions,
) -> Result<RunReport> {
    info!("Scanning {} for rating files", options.directory.display());
    let files = list_rating_files(&options.directory).await?;
    if files.is_empty() {
        warn!("No rating files found in {}", options.directory.display());
    } else {
        info!("Found {} rating file(s)", files.len());
    }

    let mut report = RunReport::new(RunMode::ImportDirectory, options.dry_run);
    let importer = RatingImporter::new(store).dry_run(options.dry_run);

    for (idx, file) in files.iter().enumerate() {
        info!("[{}/{}] Processing {}", idx + 1, files.len(), file.path.display());
        report.push(process_local_file(&importer, file).await);
    }

    report.log_summary();
    Ok(report)
}

async fn process_local_file(importer: &RatingImporter<'_>, file: &LocalRatingFile) -> FileReport {
    let Some(rating_date) = file.rating_date else {
        warn!("Cannot derive a rating date from {}, skipping", file.filename);
        return FileReport::new(
            file.filename.clone(),
            None,
            FileOutcome::Skipped {
                reason: "no rating date in filename".to_string(),
            },
        )
        .with_diagnostics(vec![Diagnostic::UndatedFile {
            filename: file.filename.clone(),
        }]);
    };

    let fingerprint = match fingerprint_file(&file.path).await {
        Ok(fingerprint) => Some(fingerprint),
        Err(e) => {
            warn!("Cannot fingerprint {}: {}", file.path.display(), e);
            None
        }
    };

    let extraction = match extract_file(file.path.clone()).await {
        Ok(extraction) => extraction,
        Err(e) => {
            return FileReport::new(
                file.filename.clone(),
                Some(rating_date),
                FileOutcome::Failed {
                    error: e.to_string(),
                },
            );
        }
    };

    let source = SourceDescriptor {
        filename: file.filename.clone(),
        source_url: file.path.display().to_string(),
        rating_date,
        downloaded_at: None,
        fingerprint,
    };

    let outcome = match importer
        .import_file(&source, &extraction.records, ExistingFilePolicy::Skip)
        .await
    {
        Ok(import) => import.into(),
        Err(e) => FileOutcome::Failed {
            error: e.to_string(),
        },
    };

    FileReport::new(file.filename.clone(), Some(rating_date), outcome)
        .with_diagnostics(extraction.diagnostics)
}

fn failed(entry: &CatalogEntry, error: impl std::fmt::Display) -> FileReport {
    FileReport::new(
        entry.filename.clone(),
        Some(entry.rating_date),
        FileOutcome::Failed {
            error: error.to_string(),
        },
    )
}

impl From<FileImport> for FileOutcome {
    fn from(import: FileImport) -> Self {
        match import {
            FileImport::Imported(stats) => FileOutcome::Imported { stats },
            FileImport::AlreadyRecorded => FileOutcome::AlreadyRecorded,
        }
    }
}
