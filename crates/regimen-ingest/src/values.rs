//! Typed cell parsing shared by the table readers.

use std::str::FromStr;

use chrono::NaiveDate;

use crate::csv_table::CsvTable;
use crate::error::{IngestError, Result};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// Parses a calendar date in one of the accepted source formats.
///
/// Timestamps are truncated to their date part.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let date_part = trimmed
        .split(|ch: char| ch == 'T' || ch == ' ')
        .next()
        .unwrap_or(trimmed);
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
}

/// Row cursor that turns cells into typed values with row-numbered errors.
pub(crate) struct RowReader<'a> {
    table: &'a CsvTable,
    index: usize,
}

impl<'a> RowReader<'a> {
    pub(crate) fn new(table: &'a CsvTable, index: usize) -> Self {
        Self { table, index }
    }

    /// 1-based data row number used in error messages.
    pub(crate) fn row_number(&self) -> usize {
        self.index + 1
    }

    fn raw(&self, column: usize) -> &'a str {
        self.table.cell(self.index, column)
    }

    fn invalid(&self, field: &str, value: &str) -> IngestError {
        IngestError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            path: self.table.path.clone(),
            row: self.row_number(),
        }
    }

    pub(crate) fn optional_text(&self, column: Option<usize>) -> Option<&'a str> {
        let value = self.raw(column?);
        if value.is_empty() { None } else { Some(value) }
    }

    pub(crate) fn required_text(&self, column: usize, field: &str) -> Result<&'a str> {
        self.optional_text(Some(column))
            .ok_or_else(|| IngestError::MissingValue {
                field: field.to_string(),
                path: self.table.path.clone(),
                row: self.row_number(),
            })
    }

    pub(crate) fn optional<T: FromStr>(&self, column: Option<usize>, field: &str) -> Result<Option<T>> {
        match self.optional_text(column) {
            Some(value) => value
                .parse::<T>()
                .map(Some)
                .map_err(|_| self.invalid(field, value)),
            None => Ok(None),
        }
    }

    pub(crate) fn required<T: FromStr>(&self, column: usize, field: &str) -> Result<T> {
        let value = self.required_text(column, field)?;
        value.parse::<T>().map_err(|_| self.invalid(field, value))
    }

    /// Whole-day count; decimal exports such as `30.0` are truncated toward zero.
    pub(crate) fn optional_days(&self, column: Option<usize>, field: &str) -> Result<Option<i64>> {
        let Some(value) = self.optional_text(column) else {
            return Ok(None);
        };
        if let Ok(days) = value.parse::<i64>() {
            return Ok(Some(days));
        }
        match value.parse::<f64>() {
            Ok(days) if days.is_finite() => Ok(Some(days.trunc() as i64)),
            _ => Err(self.invalid(field, value)),
        }
    }

    pub(crate) fn optional_date(&self, column: Option<usize>, field: &str) -> Result<Option<NaiveDate>> {
        match self.optional_text(column) {
            Some(value) => parse_date(value)
                .map(Some)
                .ok_or_else(|| self.invalid(field, value)),
            None => Ok(None),
        }
    }

    pub(crate) fn required_date(&self, column: usize, field: &str) -> Result<NaiveDate> {
        let value = self.required_text(column, field)?;
        parse_date(value).ok_or_else(|| self.invalid(field, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_supported_formats() {
        assert_eq!(parse_date("2021-03-04"), Some(date(2021, 3, 4)));
        assert_eq!(parse_date("2021/03/04"), Some(date(2021, 3, 4)));
        assert_eq!(parse_date("20210304"), Some(date(2021, 3, 4)));
        assert_eq!(parse_date("2021-03-04T10:15:00"), Some(date(2021, 3, 4)));
        assert_eq!(parse_date("2021-03-04 10:15:00"), Some(date(2021, 3, 4)));
    }

    #[test]
    fn day_counts_accept_signs_and_decimals() {
        let table = CsvTable {
            path: "exposures.csv".into(),
            headers: vec!["days_supply".to_string()],
            rows: ["30", "-1", "30.0", "7.9", "", "NaN", "ten"]
                .iter()
                .map(|cell| vec![cell.to_string()])
                .collect(),
        };
        let days = |index| RowReader::new(&table, index).optional_days(Some(0), "days_supply");
        assert_eq!(days(0).unwrap(), Some(30));
        assert_eq!(days(1).unwrap(), Some(-1));
        assert_eq!(days(2).unwrap(), Some(30));
        assert_eq!(days(3).unwrap(), Some(7));
        assert_eq!(days(4).unwrap(), None);
        assert!(matches!(days(5), Err(IngestError::InvalidValue { row: 6, .. })));
        assert!(matches!(days(6), Err(IngestError::InvalidValue { row: 7, .. })));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_date("03/04/2021"), None);
        assert_eq!(parse_date(""), None);
    }
}
