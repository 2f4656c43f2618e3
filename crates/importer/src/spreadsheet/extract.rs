use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;
use storage::models::RatingCategory;
use tracing::{debug, warn};

use super::layout::{Layout, detect_layout};
use super::parser::parse_sheet;
use super::workbook::Workbook;
use crate::canonical::models::PlayerRecord;
use crate::canonical::validator::RecordValidator;
use crate::category_router::{CategoryRouter, KnownSheetNames, missing_categories};
use crate::report::Diagnostic;
use crate::{ImporterError, Result};

#[derive(Debug, Clone, Serialize)]
pub struct SheetSummary {
    pub sheet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<RatingCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_row: Option<usize>,
    pub records: usize,
    pub discarded: usize,
}

/// Everything read out of one workbook.
#[derive(Debug, Default)]
pub struct FileExtraction {
    pub records: Vec<PlayerRecord>,
    pub sheets: Vec<SheetSummary>,
    pub categories_found: BTreeSet<RatingCategory>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Routes each sheet to its category, parses the recognized ones and
/// reports the categories the workbook does not cover.
pub fn extract_records(workbook: &Workbook, router: &dyn CategoryRouter) -> FileExtraction {
    let mut extraction = FileExtraction::default();

    for named in workbook.sheets() {
        let name = named.name.trim().to_string();
        let mut summary = SheetSummary {
            sheet: name.clone(),
            category: None,
            layout: None,
            header_row: None,
            records: 0,
            discarded: 0,
        };

        let Some(category) = router.route(&name) else {
            debug!("Sheet '{}' is not a rating category, skipping", name);
            extraction
                .diagnostics
                .push(Diagnostic::UnmappedSheet { sheet: name });
            extraction.sheets.push(summary);
            continue;
        };
        summary.category = Some(category);

        let Some(detected) = detect_layout(named.sheet.as_ref()) else {
            warn!(
                "Sheet '{}' ({}) has no recognizable header, skipping",
                name, category
            );
            extraction
                .diagnostics
                .push(Diagnostic::UnrecognizedLayout { sheet: name, category });
            extraction.sheets.push(summary);
            continue;
        };

        let parse = parse_sheet(named.sheet.as_ref(), &detected, category);
        debug!(
            "Sheet '{}' ({}): header row {}, {} records, {} discarded",
            name,
            category,
            detected.header_row,
            parse.records.len(),
            parse.discarded
        );

        summary.layout = Some(detected.layout);
        summary.header_row = Some(detected.header_row);
        summary.records = parse.records.len();
        summary.discarded = parse.discarded;
        extraction.categories_found.insert(category);
        extraction.records.extend(parse.records);
        extraction.sheets.push(summary);
    }

    let missing = missing_categories(&extraction.categories_found);
    if !missing.is_empty() {
        let available_sheets = workbook.sheet_names();
        warn!(
            "Missing categories {:?}; available sheets: {:?}",
            missing.iter().map(|c| c.code()).collect::<Vec<_>>(),
            available_sheets
        );
        extraction.diagnostics.push(Diagnostic::MissingCategories {
            missing,
            available_sheets,
        });
    }

    RecordValidator::validate(&extraction.records).log_warnings();

    extraction
}

/// Opens and extracts a workbook on the blocking pool.
pub async fn extract_file(path: PathBuf) -> Result<FileExtraction> {
    tokio::task::spawn_blocking(move || {
        let workbook = Workbook::open(&path)?;
        Ok(extract_records(&workbook, &KnownSheetNames))
    })
    .await
    .map_err(|e| ImporterError::ImportError(format!("Spreadsheet task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::sheet::GridSheet;
    use crate::spreadsheet::workbook::NamedSheet;

    fn rating_sheet(ids: &[&str]) -> GridSheet {
        let mut rows: Vec<Vec<&str>> = vec![vec!["Место", "ID", "Фамилия", "Имя", "Очки"]];
        for (idx, id) in ids.iter().enumerate() {
            let rank = if idx == 0 { "1" } else { "2" };
            rows.push(vec![rank, id, "Иванов", "Иван", "1000"]);
        }
        let slices: Vec<&[&str]> = rows.iter().map(Vec::as_slice).collect();
        GridSheet::from_text(&slices)
    }

    #[test]
    fn test_four_of_six_categories_reports_two_missing() {
        let workbook = Workbook::from_sheets(vec![
            NamedSheet::new("MD", rating_sheet(&["1", "2"])),
            NamedSheet::new("Мужчины, смешанный разряд", rating_sheet(&["1"])),
            NamedSheet::new(" ЖП ", rating_sheet(&["3"])),
            NamedSheet::new("JM", rating_sheet(&["4"])),
            NamedSheet::new("Пояснения", GridSheet::from_text(&[&["Примечание"]])),
        ]);

        let extraction = extract_records(&workbook, &KnownSheetNames);

        assert_eq!(extraction.records.len(), 5);
        assert_eq!(extraction.categories_found.len(), 4);
        assert!(extraction.diagnostics.contains(&Diagnostic::UnmappedSheet {
            sheet: "Пояснения".to_string()
        }));

        let missing = extraction.diagnostics.iter().find_map(|d| match d {
            Diagnostic::MissingCategories { missing, available_sheets } => {
                Some((missing.clone(), available_sheets.len()))
            }
            _ => None,
        });
        assert_eq!(
            missing,
            Some((
                vec![RatingCategory::WomenMixed, RatingCategory::JuniorFemale],
                5
            ))
        );
    }

    #[test]
    fn test_unrecognized_sheet_contributes_nothing() {
        let workbook = Workbook::from_sheets(vec![NamedSheet::new(
            "WD",
            GridSheet::from_text(&[&["Place", "Name", "Points"], &["1", "X", "10"]]),
        )]);

        let extraction = extract_records(&workbook, &KnownSheetNames);

        assert!(extraction.records.is_empty());
        assert!(extraction.categories_found.is_empty());
        assert_eq!(
            extraction.diagnostics[0],
            Diagnostic::UnrecognizedLayout {
                sheet: "WD".to_string(),
                category: RatingCategory::WomenDoubles
            }
        );
        assert_eq!(extraction.sheets[0].records, 0);
    }

    #[test]
    fn test_complete_workbook_has_no_missing_categories() {
        let sheets = RatingCategory::ALL
            .iter()
            .map(|c| NamedSheet::new(c.code(), rating_sheet(&["1"])))
            .collect();
        let extraction = extract_records(&Workbook::from_sheets(sheets), &KnownSheetNames);

        assert_eq!(extraction.records.len(), 6);
        assert!(extraction.diagnostics.is_empty());
        assert_eq!(extraction.records[5].category, RatingCategory::JuniorFemale);
    }
}
