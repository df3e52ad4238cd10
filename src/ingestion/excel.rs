#![cfg(feature = "excel")]

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{Duration, NaiveDate, SecondsFormat};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{Row, Value};

/// Decode an in-memory workbook (`.xlsx`, `.xls`) into rows.
///
/// Behavior:
/// - Reads the first sheet by position; any further sheets are ignored
/// - Detects the first non-empty row as the header row
/// - Ignores columns with an empty header and skips all-empty data rows
/// - Keeps native cell types (numbers, booleans); date cells become RFC 3339 strings
pub fn parse_excel_bytes(bytes: &[u8]) -> IngestionResult<Vec<Row>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestionError::Malformed {
            message: "workbook has no sheets".to_string(),
        })??;

    Ok(rows_from_range(&range))
}

fn rows_from_range(range: &calamine::Range<Data>) -> Vec<Row> {
    let mut sheet_rows = range.rows();

    // No header row means no data rows either; the caller reports that as empty input.
    let Some(headers) = sheet_rows
        .by_ref()
        .find(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|row| row.iter().map(cell_to_header_string).collect::<Vec<_>>())
    else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    for cells in sheet_rows {
        let row: Row = headers
            .iter()
            .zip(cells.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, cell)| (header.as_str(), convert_cell(cell)))
            .collect();

        if row.is_blank() {
            continue;
        }
        rows.push(row);
    }
    rows
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(f) => f.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

fn convert_cell(c: &Data) -> Value {
    match c {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::String(s) => Value::from_cell(s),
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) => Value::Float64(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => excel_serial_to_rfc3339(dt.as_f64())
            .map(Value::Utf8)
            .unwrap_or(Value::Float64(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::from_cell(s),
    }
}

/// Convert an Excel serial date (days since 1899-12-30, fractional part = time of day).
fn excel_serial_to_rfc3339(serial: f64) -> Option<String> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    let naive = epoch.checked_add_signed(Duration::milliseconds(millis))?;
    Some(naive.and_utc().to_rfc3339_opts(SecondsFormat::Secs, true))
}
