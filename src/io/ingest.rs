//! CSV ingest for historical sales exports.
//!
//! This module turns a spreadsheet-style CSV into `RawObservation`s. It only
//! parses: semantic validation (missing dates, negative values, duplicates)
//! belongs to `data::dataset`.
//!
//! Design goals:
//! - **Tolerant headers**: English and Russian column names, any case, BOM stripped
//! - **Locale-tolerant numbers**: `1 234,5`, `1,234.5` and `1234.5` all parse
//! - **Strict rows**: an unparseable value aborts ingest with its line number

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::data::RawObservation;
use crate::error::AppError;

/// Accepted header spellings per column (compared after trimming and lower-casing).
const DATE_ALIASES: [&str; 4] = ["date", "day", "по дням", "дата"];
const CHECKS_ALIASES: [&str; 2] = ["checks", "количество чеков"];
const AVG_CHECK_ALIASES: [&str; 3] = ["avg_check", "average_check", "средняя сумма чека"];
const TOTAL_SALES_ALIASES: [&str; 3] = ["total_sales", "сумма продажи", "общая сумма продаж"];

const DATE_FMTS: [&str; 5] = ["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
const DATETIME_FMTS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%d.%m.%Y %H:%M:%S"];

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    date: usize,
    checks: usize,
    avg_check: usize,
    total_sales: usize,
}

/// Load raw observations from a CSV file.
pub fn load_observations(path: &Path) -> Result<Vec<RawObservation>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open CSV '{}': {e}", path.display())))?;
    let rows = read_observations(file)?;
    log::info!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Parse raw observations from any CSV reader.
pub fn read_observations<R: Read>(input: R) -> Result<Vec<RawObservation>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::validation(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let columns = resolve_columns(&build_header_map(&headers))?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, which is line 1.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::validation(format!("Line {line}: CSV parse error: {e}")))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let row = parse_row(&record, columns).map_err(|m| AppError::validation(format!("Line {line}: {m}")))?;
        rows.push(row);
    }

    Ok(rows)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins for repeated headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet tools often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}').trim();
    name.to_lowercase()
}

fn resolve_columns(header_map: &HashMap<String, usize>) -> Result<Columns, AppError> {
    let find = |aliases: &[&str]| aliases.iter().find_map(|a| header_map.get(*a).copied());

    let date = find(&DATE_ALIASES[..]);
    let checks = find(&CHECKS_ALIASES[..]);
    let avg_check = find(&AVG_CHECK_ALIASES[..]);
    let total_sales = find(&TOTAL_SALES_ALIASES[..]);

    match (date, checks, avg_check, total_sales) {
        (Some(date), Some(checks), Some(avg_check), Some(total_sales)) => Ok(Columns {
            date,
            checks,
            avg_check,
            total_sales,
        }),
        _ => {
            let missing: Vec<String> = [
                (date, DATE_ALIASES[0]),
                (checks, CHECKS_ALIASES[0]),
                (avg_check, AVG_CHECK_ALIASES[0]),
                (total_sales, TOTAL_SALES_ALIASES[0]),
            ]
            .iter()
            .filter(|(found, _)| found.is_none())
            .map(|(_, name)| format!("`{name}`"))
            .collect();
            Err(AppError::validation(format!(
                "Missing required column(s): {}",
                missing.join(", ")
            )))
        }
    }
}

fn parse_row(record: &StringRecord, columns: Columns) -> Result<RawObservation, String> {
    let date = match get_cell(record, columns.date) {
        Some(s) => Some(parse_date(s)?),
        None => None,
    };

    Ok(RawObservation {
        date,
        checks: parse_number(get_cell(record, columns.checks), "checks")?,
        avg_check: parse_number(get_cell(record, columns.avg_check), "avg_check")?,
        total_sales: parse_number(get_cell(record, columns.total_sales), "total_sales")?,
    })
}

fn get_cell(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY-MM-DD HH:MM:SS, DD.MM.YYYY, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}

/// Parse a spreadsheet number.
///
/// Whitespace (including non-breaking spaces) is dropped. A lone comma is the
/// decimal separator; with both `,` and `.` present, commas group thousands.
fn parse_number(s: Option<&str>, name: &str) -> Result<f64, String> {
    let s = s.ok_or_else(|| format!("Missing value for `{name}`."))?;
    let mut cleaned: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '\u{202f}')
        .collect();
    if cleaned.contains(',') {
        cleaned = if cleaned.contains('.') {
            cleaned.replace(',', "")
        } else {
            cleaned.replace(',', ".")
        };
    }
    cleaned
        .parse::<f64>()
        .map_err(|_| format!("Invalid number '{s}' for `{name}`."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_english_headers() {
        let csv = "date,checks,avg_check,total_sales\n2024-01-01,100,3000,300000\n2024-01-02,90,3100.5,279045\n";
        let rows = read_observations(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, Some(d(2024, 1, 1)));
        assert_eq!(rows[1].avg_check, 3100.5);
    }

    #[test]
    fn parses_russian_headers_and_locale_numbers() {
        let csv = "\u{feff}По дням,Количество чеков,Средняя сумма чека,Сумма продажи\n\
                   15.01.2024,120,\"3 050,75\",\"366\u{a0}090\"\n\
                   2024-01-16 00:00:00,80,\"1,234.5\",98760\n";
        let rows = read_observations(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].date, Some(d(2024, 1, 15)));
        assert_eq!(rows[0].avg_check, 3050.75);
        assert_eq!(rows[0].total_sales, 366_090.0);
        assert_eq!(rows[1].date, Some(d(2024, 1, 16)));
        assert_eq!(rows[1].avg_check, 1234.5);
    }

    #[test]
    fn missing_columns_are_listed() {
        let csv = "date,checks\n2024-01-01,1\n";
        let err = read_observations(csv.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputValidation);
        assert!(err.message().contains("`avg_check`"));
        assert!(err.message().contains("`total_sales`"));
    }

    #[test]
    fn empty_date_is_kept_as_missing() {
        let csv = "date,checks,avg_check,total_sales\n,1,2,2\n";
        let rows = read_observations(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].date, None);
    }

    #[test]
    fn bad_values_abort_with_line_number() {
        let csv = "date,checks,avg_check,total_sales\n2024-01-01,1,2,2\nnot-a-date,1,2,2\n";
        let err = read_observations(csv.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputValidation);
        assert!(err.message().starts_with("Line 3"));

        let csv = "date,checks,avg_check,total_sales\n2024-01-01,abc,2,2\n";
        let err = read_observations(csv.as_bytes()).unwrap_err();
        assert!(err.message().contains("Line 2"));
        assert!(err.message().contains("checks"));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Date,Checks,Average_Check,Total_Sales").unwrap();
        writeln!(file, "01/02/2024,5,10,50").unwrap();
        let rows = load_observations(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, Some(d(2024, 2, 1)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_observations(&dir.path().join("absent.csv")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
