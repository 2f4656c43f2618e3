pub mod cell;
pub mod extract;
pub mod layout;
pub mod parser;
pub mod sheet;
pub mod workbook;

pub use cell::CellValue;
pub use extract::{FileExtraction, SheetSummary, extract_file, extract_records};
pub use layout::{ColumnMap, DetectedLayout, Layout, NameColumns, detect_layout};
pub use parser::{SheetParse, parse_sheet};
pub use sheet::{GridSheet, SheetAccess};
pub use workbook::{NamedSheet, RangeSheet, SpreadsheetFormat, Workbook};
