use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use storage::models::RatingCategory;

use super::cell::CellValue;
use super::layout::{DetectedLayout, NameColumns};
use super::sheet::SheetAccess;
use crate::canonical::models::PlayerRecord;

const BIRTH_DATE_FORMATS: [&str; 3] = ["%d.%m.%Y", "%Y-%m-%d", "%d/%m/%Y"];

#[derive(Debug, Default)]
pub struct SheetParse {
    pub records: Vec<PlayerRecord>,
    /// Ranked rows dropped for lacking an identifier or a surname.
    pub discarded: usize,
}

/// Reads every ranked row below the header. Rows with an empty rank cell
/// are separators or footers and are skipped silently.
pub fn parse_sheet(
    sheet: &dyn SheetAccess,
    detected: &DetectedLayout,
    category: RatingCategory,
) -> SheetParse {
    let columns = &detected.columns;
    let mut parse = SheetParse::default();

    for row in detected.header_row + 1..=sheet.max_row() {
        let rank_cell = sheet.cell(row, columns.rank);
        if rank_cell.is_empty() {
            continue;
        }

        let cell = |column: Option<usize>| column.map_or(CellValue::Empty, |c| sheet.cell(row, c));

        let (last_name, first_name, middle_name) = match &columns.name {
            NameColumns::Combined(column) => split_full_name(&sheet.cell(row, *column).as_text()),
            NameColumns::Split { last, first, middle } => (
                sheet.cell(row, *last).as_text(),
                cell(*first).as_text(),
                cell(*middle).as_text(),
            ),
        };

        let Some(external_id) = parse_identifier(&cell(columns.external_id)) else {
            parse.discarded += 1;
            continue;
        };
        if last_name.is_empty() {
            parse.discarded += 1;
            continue;
        }

        parse.records.push(PlayerRecord {
            external_id,
            last_name,
            first_name,
            middle_name,
            gender: category.gender(),
            birth_date: parse_date(&cell(columns.birth_date)),
            city: cell(columns.city).as_text(),
            category,
            rank: parse_optional_int(&rank_cell),
            rating: parse_decimal(&sheet.cell(row, columns.rating)).unwrap_or(Decimal::ZERO),
            tournaments_total: parse_int(&cell(columns.tournaments_total)),
            tournaments_52_weeks: parse_int(&cell(columns.tournaments_52_weeks)),
            tournaments_counted: parse_int(&cell(columns.tournaments_counted)),
        });
    }

    parse
}

/// Splits `Фамилия Имя Отчество` by position only.
pub fn split_full_name(full_name: &str) -> (String, String, String) {
    let mut parts = full_name.split_whitespace();
    let mut next = || parts.next().unwrap_or_default().to_string();
    let last = next();
    let first = next();
    let middle = next();
    (last, first, middle)
}

/// Drops whitespace (including non-breaking spaces) and turns a decimal
/// comma into a dot.
fn normalize_number(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect()
}

pub fn parse_decimal(cell: &CellValue) -> Option<Decimal> {
    match cell {
        CellValue::Number(n) => Decimal::from_f64_retain(*n),
        CellValue::Text(text) => Decimal::from_str(&normalize_number(text)).ok(),
        _ => None,
    }
}

pub fn parse_optional_int(cell: &CellValue) -> Option<i32> {
    let value = match cell {
        CellValue::Number(n) => *n,
        CellValue::Text(text) => normalize_number(text).parse::<f64>().ok()?,
        _ => return None,
    };
    if value.is_finite() && value.abs() <= i32::MAX as f64 {
        Some(value.trunc() as i32)
    } else {
        None
    }
}

/// Integer counter with a fallback of zero.
pub fn parse_int(cell: &CellValue) -> i32 {
    parse_optional_int(cell).unwrap_or(0)
}

pub fn parse_identifier(cell: &CellValue) -> Option<i64> {
    let value = match cell {
        CellValue::Number(n) => *n,
        CellValue::Text(text) => normalize_number(text).parse::<f64>().ok()?,
        _ => return None,
    };
    if value.is_finite() && value.fract() == 0.0 && value > 0.0 && value <= i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

pub fn parse_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(date) => Some(*date),
        CellValue::Text(text) => {
            let text = text.trim();
            BIRTH_DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        }
        _ => None,
    }
}
