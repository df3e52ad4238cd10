//! CSV decoding.

use crate::error::IngestionResult;
use crate::types::{Row, Value};

/// Decode delimited text into rows.
///
/// Rules:
///
/// - The first record is the header row (headers are trimmed, a UTF-8 BOM is dropped).
/// - Records may be shorter or longer than the header; extra cells are ignored.
/// - Blank lines and records whose cells are all empty are skipped.
/// - Every cell is kept as a string; blank cells become [`Value::Null`].
pub fn parse_csv_bytes(bytes: &[u8], delimiter: u8) -> IngestionResult<Vec<Row>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes);
    parse_csv_from_reader(&mut rdr)
}

/// Decode rows from an existing CSV reader.
pub fn parse_csv_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> IngestionResult<Vec<Row>> {
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_owned())
        .collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;

        let row: Row = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, raw)| (header.as_str(), Value::from_cell(raw)))
            .collect();

        if row.is_blank() {
            continue;
        }
        rows.push(row);
    }

    Ok(rows)
}
