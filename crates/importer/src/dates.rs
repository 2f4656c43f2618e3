//! Rating-date extraction from archive filenames and link text.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

#[derive(Debug, Clone, Copy)]
enum FieldOrder {
    YearMonthDay,
    DayMonthYear,
}

struct DatePattern {
    regex: Regex,
    order: FieldOrder,
}

impl DatePattern {
    fn new(pattern: &str, order: FieldOrder) -> Self {
        Self {
            regex: Regex::new(pattern).expect("date pattern must compile"),
            order,
        }
    }

    fn to_date(&self, caps: &Captures<'_>) -> Option<NaiveDate> {
        let field = |idx: usize| caps.get(idx)?.as_str().parse::<u32>().ok();
        let (year, month, day) = match self.order {
            FieldOrder::YearMonthDay => (field(1)?, field(2)?, field(3)?),
            FieldOrder::DayMonthYear => (field(3)?, field(2)?, field(1)?),
        };
        NaiveDate::from_ymd_opt(year as i32, month, day)
    }
}

lazy_static! {
    // Priority order: YYYY-MM-DD, DD.MM.YYYY, YYYYMMDD, DD_MM_YYYY.
    static ref DATE_PATTERNS: Vec<DatePattern> = vec![
        DatePattern::new(r"(?:^|\D)(\d{4})-(\d{2})-(\d{2})(?:\D|$)", FieldOrder::YearMonthDay),
        DatePattern::new(r"(?:^|\D)(\d{2})\.(\d{2})\.(\d{4})(?:\D|$)", FieldOrder::DayMonthYear),
        DatePattern::new(r"(?:^|\D)(\d{4})(\d{2})(\d{2})(?:\D|$)", FieldOrder::YearMonthDay),
        DatePattern::new(r"(?:^|\D)(\d{2})_(\d{2})_(\d{4})(?:\D|$)", FieldOrder::DayMonthYear),
    ];
}

/// First calendar-valid date found in `text`, trying the patterns in
/// priority order. A match that is not a real date falls through.
pub fn extract_rating_date(text: &str) -> Option<NaiveDate> {
    DATE_PATTERNS.iter().find_map(|pattern| {
        pattern
            .regex
            .captures_iter(text)
            .find_map(|caps| pattern.to_date(&caps))
    })
}

/// Tries the filename first, then the link text.
pub fn extract_from_link(filename: &str, link_text: &str) -> Option<NaiveDate> {
    extract_rating_date(filename).or_else(|| extract_rating_date(link_text))
}
