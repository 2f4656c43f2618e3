//! Header detection for the rating sheet layouts seen in the archive.
//!
//! Older files put the header in row 1 with a rank column titled `Место`.
//! Newer files carry a title block and put the header in row 10 or 11 with
//! a `№` rank column. Either layout may store the player name in one
//! combined column or in separate surname/name/patronymic columns.

use std::collections::HashMap;

use serde::Serialize;

use super::sheet::SheetAccess;

const FIRST_ROW_HEADER: usize = 1;
const TITLED_HEADER_ROWS: [usize; 2] = [10, 11];

const RANK_PLACE: &str = "Место";
const RANK_NUMBER: &str = "№";
const RATING: &str = "Очки";
const FULL_NAME: &str = "ФИО";
const LAST_NAME: &str = "Фамилия";
const FIRST_NAME: &str = "Имя";
const MIDDLE_NAME: &str = "Отчество";
const LAST_NAME_SHORT: &str = "Ф";
const FIRST_NAME_SHORT: &str = "И";
const MIDDLE_NAME_SHORT: &str = "О";

const ID_LABELS: [&str; 3] = ["ID", "Код", "Код игрока"];
const BIRTH_DATE_LABELS: [&str; 3] = ["Дата рождения", "Д.р.", "ДР"];
const CITY_LABELS: [&str; 2] = ["Город", "Регион"];

const TOURNAMENTS_TOTAL_MARKER: &str = "сыгранных";
const TOURNAMENTS_52_WEEKS_MARKER: &str = "52";
const TOURNAMENTS_COUNTED_MARKERS: [&str; 2] = ["учтенных", "учтённых"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Header in row 1, rank column `Место`.
    FirstRowHeader,
    /// Header in row 10 or 11 under a title block, rank column `№`.
    TitledHeader,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameColumns {
    Combined(usize),
    Split {
        last: usize,
        first: Option<usize>,
        middle: Option<usize>,
    },
}

/// 1-based column positions of the fields found in a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub rank: usize,
    pub rating: usize,
    pub name: NameColumns,
    pub external_id: Option<usize>,
    pub birth_date: Option<usize>,
    pub city: Option<usize>,
    pub tournaments_total: Option<usize>,
    pub tournaments_52_weeks: Option<usize>,
    pub tournaments_counted: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedLayout {
    pub layout: Layout,
    pub header_row: usize,
    pub columns: ColumnMap,
}

/// Header labels of one row, keyed by trimmed text. Repeated labels keep
/// their first column.
struct HeaderRow {
    labels: Vec<String>,
    positions: HashMap<String, usize>,
}

impl HeaderRow {
    fn read(sheet: &dyn SheetAccess, row: usize) -> Self {
        let labels: Vec<String> = sheet.row(row).iter().map(|cell| cell.as_text()).collect();
        let mut positions = HashMap::new();
        for (idx, label) in labels.iter().enumerate() {
            if !label.is_empty() {
                positions.entry(label.clone()).or_insert(idx + 1);
            }
        }
        Self { labels, positions }
    }

    fn position(&self, label: &str) -> Option<usize> {
        self.positions.get(label).copied()
    }

    fn has(&self, label: &str) -> bool {
        self.positions.contains_key(label)
    }

    fn first_of(&self, labels: &[&str]) -> Option<usize> {
        self.labels
            .iter()
            .position(|text| {
                let lower = text.to_lowercase();
                labels.iter().any(|label| lower == label.to_lowercase())
            })
            .map(|idx| idx + 1)
    }

    fn containing(&self, markers: &[&str]) -> Option<usize> {
        self.labels
            .iter()
            .position(|text| {
                let lower = text.to_lowercase();
                markers.iter().any(|marker| lower.contains(marker))
            })
            .map(|idx| idx + 1)
    }
}

/// Finds the header row and maps its columns. Returns `None` when the sheet
/// matches neither layout.
pub fn detect_layout(sheet: &dyn SheetAccess) -> Option<DetectedLayout> {
    let first = HeaderRow::read(sheet, FIRST_ROW_HEADER);
    if first.has(RANK_PLACE) && first.has(RATING) && first.has(LAST_NAME) {
        let name = match first.position(FULL_NAME) {
            Some(column) => NameColumns::Combined(column),
            None => NameColumns::Split {
                last: first.position(LAST_NAME)?,
                first: first.position(FIRST_NAME),
                middle: first.position(MIDDLE_NAME),
            },
        };
        return Some(DetectedLayout {
            layout: Layout::FirstRowHeader,
            header_row: FIRST_ROW_HEADER,
            columns: map_columns(&first, RANK_PLACE, name)?,
        });
    }

    for row in TITLED_HEADER_ROWS {
        let header = HeaderRow::read(sheet, row);
        if !(header.has(RANK_NUMBER) && header.has(RATING)) {
            continue;
        }
        let name = if let Some(column) = header.position(FULL_NAME) {
            NameColumns::Combined(column)
        } else if let Some(last) = header.position(LAST_NAME_SHORT) {
            NameColumns::Split {
                last,
                first: header.position(FIRST_NAME_SHORT),
                middle: header.position(MIDDLE_NAME_SHORT),
            }
        } else {
            continue;
        };
        return Some(DetectedLayout {
            layout: Layout::TitledHeader,
            header_row: row,
            columns: map_columns(&header, RANK_NUMBER, name)?,
        });
    }

    None
}

fn map_columns(header: &HeaderRow, rank_label: &str, name: NameColumns) -> Option<ColumnMap> {
    Some(ColumnMap {
        rank: header.position(rank_label)?,
        rating: header.position(RATING)?,
        name,
        external_id: header.first_of(&ID_LABELS),
        birth_date: header.first_of(&BIRTH_DATE_LABELS),
        city: header.first_of(&CITY_LABELS),
        tournaments_total: header.containing(&[TOURNAMENTS_TOTAL_MARKER]),
        tournaments_52_weeks: header.containing(&[TOURNAMENTS_52_WEEKS_MARKER]),
        tournaments_counted: header.containing(&TOURNAMENTS_COUNTED_MARKERS),
    })
}
