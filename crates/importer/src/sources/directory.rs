use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::Result;
use crate::dates::extract_rating_date;
use crate::spreadsheet::SpreadsheetFormat;

/// A spreadsheet found on disk, dated from its filename when possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRatingFile {
    pub path: PathBuf,
    pub filename: String,
    pub rating_date: Option<NaiveDate>,
}

/// Lists rating spreadsheets in `directory` and its immediate
/// subdirectories, oldest rating date first. Undated files sort last.
pub async fn list_rating_files(directory: &Path) -> Result<Vec<LocalRatingFile>> {
    let mut paths = Vec::new();
    let mut entries = tokio::fs::read_dir(directory).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_dir() {
            let mut sub_entries = match tokio::fs::read_dir(&path).await {
                Ok(sub_entries) => sub_entries,
                Err(e) => {
                    warn!("Cannot read {}: {}", path.display(), e);
                    continue;
                }
            };
            while let Some(sub_entry) = sub_entries.next_entry().await? {
                let sub_path = sub_entry.path();
                if is_rating_file(&sub_path) {
                    paths.push(sub_path);
                }
            }
        } else if is_rating_file(&path) {
            paths.push(path);
        }
    }

    let mut files: Vec<LocalRatingFile> = paths
        .into_iter()
        .filter_map(|path| {
            let filename = path.file_name()?.to_str()?.to_string();
            let rating_date = extract_rating_date(&filename);
            if rating_date.is_none() {
                debug!("No rating date in filename {}", filename);
            }
            Some(LocalRatingFile {
                path,
                filename,
                rating_date,
            })
        })
        .collect();

    files.sort_by(|a, b| {
        (a.rating_date.is_none(), a.rating_date, &a.filename)
            .cmp(&(b.rating_date.is_none(), b.rating_date, &b.filename))
    });

    Ok(files)
}

fn is_rating_file(path: &Path) -> bool {
    path.is_file()
        && SpreadsheetFormat::from_path(path).is_some()
        && !path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("~$"))
}
