use std::io::{Read, Seek};
use std::path::Path;

use calamine::{Data, Range, Reader, Xls, Xlsx, open_workbook};
use serde::Serialize;

use super::cell::CellValue;
use super::sheet::SheetAccess;
use crate::{ImporterError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpreadsheetFormat {
    Xls,
    Xlsx,
}

impl SpreadsheetFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "xls" => Some(Self::Xls),
            "xlsx" => Some(Self::Xlsx),
            _ => None,
        }
    }

    pub fn from_filename(filename: &str) -> Option<Self> {
        Self::from_path(Path::new(filename))
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// Worksheet read through calamine. calamine addresses cells by absolute
/// 0-based position, so a range that starts below row 1 still reports the
/// sheet's real coordinates.
pub struct RangeSheet {
    range: Range<Data>,
}

impl RangeSheet {
    pub fn new(range: Range<Data>) -> Self {
        Self { range }
    }
}

impl SheetAccess for RangeSheet {
    fn max_row(&self) -> usize {
        self.range.end().map_or(0, |(row, _)| row as usize + 1)
    }

    fn max_column(&self) -> usize {
        self.range.end().map_or(0, |(_, column)| column as usize + 1)
    }

    fn cell(&self, row: usize, column: usize) -> CellValue {
        if row == 0 || column == 0 {
            return CellValue::Empty;
        }
        let position = ((row - 1) as u32, (column - 1) as u32);
        self.range
            .get_value(position)
            .map(CellValue::from)
            .unwrap_or_default()
    }
}

pub struct NamedSheet {
    pub name: String,
    pub sheet: Box<dyn SheetAccess + Send>,
}

impl NamedSheet {
    pub fn new(name: impl Into<String>, sheet: impl SheetAccess + Send + 'static) -> Self {
        Self {
            name: name.into(),
            sheet: Box::new(sheet),
        }
    }
}

/// All worksheets of one rating file, in workbook order.
pub struct Workbook {
    sheets: Vec<NamedSheet>,
}

impl Workbook {
    pub fn open(path: &Path) -> Result<Self> {
        let format = SpreadsheetFormat::from_path(path).ok_or_else(|| {
            ImporterError::ValidationError(format!(
                "Unsupported spreadsheet extension: {}",
                path.display()
            ))
        })?;

        let sheets = match format {
            SpreadsheetFormat::Xls => {
                let reader: Xls<_> = open_workbook(path).map_err(calamine::Error::from)?;
                read_sheets(reader)?
            }
            SpreadsheetFormat::Xlsx => {
                let reader: Xlsx<_> = open_workbook(path).map_err(calamine::Error::from)?;
                read_sheets(reader)?
            }
        };

        Ok(Self { sheets })
    }

    pub fn from_sheets(sheets: Vec<NamedSheet>) -> Self {
        Self { sheets }
    }

    pub fn sheets(&self) -> &[NamedSheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }
}

fn read_sheets<R, RS>(mut reader: R) -> Result<Vec<NamedSheet>>
where
    R: Reader<RS>,
    RS: Read + Seek,
    calamine::Error: From<R::Error>,
{
    let mut sheets = Vec::new();
    for name in reader.sheet_names() {
        let range = reader
            .worksheet_range(&name)
            .map_err(calamine::Error::from)?;
        sheets.push(NamedSheet::new(name, RangeSheet::new(range)));
    }
    Ok(sheets)
}
