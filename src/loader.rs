use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::models::{MalformedInputError, StationColumn, TimeSeriesTable};
use crate::stations::STATION_REGISTRY;

/// Timestamp column of the prepared source feed.
pub const TIMESTAMP_COLUMN: &str = "date_pst";

// The prepared feed writes "2017-01-01 00:00:00"; the other two formats
// show up in hand-edited extracts of the same data.
const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Loads the source CSV with the registry's station columns.
pub fn load_source(path: &Path) -> Result<TimeSeriesTable, MalformedInputError> {
    let columns: Vec<&str> = STATION_REGISTRY.iter().map(|s| s.column).collect();
    load_table(path, TIMESTAMP_COLUMN, &columns)
}

pub fn load_table(
    path: &Path,
    timestamp_column: &str,
    value_columns: &[&str],
) -> Result<TimeSeriesTable, MalformedInputError> {
    let file = std::fs::File::open(path).map_err(|e| {
        MalformedInputError::Unreadable(format!("{}: {}", path.display(), e))
    })?;
    read_table(file, timestamp_column, value_columns)
}

/// Reads a comma-delimited source with a header row into a `TimeSeriesTable`,
/// sorting rows by timestamp. Row order in the source is not trusted: the
/// rolling computations downstream assume chronological order, so the sorted
/// index is established here.
pub fn read_table<R: Read>(
    reader: R,
    timestamp_column: &str,
    value_columns: &[&str],
) -> Result<TimeSeriesTable, MalformedInputError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader
        .headers()
        .map_err(|e| MalformedInputError::Unreadable(e.to_string()))?
        .clone();

    let timestamp_index = column_index(&headers, timestamp_column)
        .ok_or_else(|| MalformedInputError::MissingColumn(timestamp_column.to_string()))?;
    let mut value_indexes = Vec::with_capacity(value_columns.len());
    for &name in value_columns {
        let index = column_index(&headers, name)
            .ok_or_else(|| MalformedInputError::MissingColumn(name.to_string()))?;
        value_indexes.push(index);
    }

    let mut rows: Vec<(NaiveDateTime, Vec<Option<f64>>)> = Vec::new();
    for (offset, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|e| MalformedInputError::Unreadable(e.to_string()))?;
        // Header is row 1, so the first data record is row 2.
        let row = offset + 2;

        let timestamp_text = record.get(timestamp_index).unwrap_or("").trim();
        let timestamp = parse_timestamp(timestamp_text).ok_or_else(|| {
            MalformedInputError::UnparseableTimestamp {
                row,
                value: timestamp_text.to_string(),
            }
        })?;

        let values = value_indexes
            .iter()
            .map(|&index| parse_cell(record.get(index).unwrap_or("")))
            .collect();
        rows.push((timestamp, values));
    }

    if rows.is_empty() {
        return Err(MalformedInputError::Empty);
    }

    rows.sort_by_key(|(timestamp, _)| *timestamp);
    for pair in rows.windows(2) {
        if pair[0].0 == pair[1].0 {
            return Err(MalformedInputError::DuplicateTimestamp(pair[0].0));
        }
    }

    let timestamps: Vec<NaiveDateTime> = rows.iter().map(|(timestamp, _)| *timestamp).collect();
    let columns = value_columns
        .iter()
        .enumerate()
        .map(|(slot, &name)| StationColumn {
            name: name.to_string(),
            values: rows.iter().map(|(_, values)| values[slot]).collect(),
        })
        .collect();

    Ok(TimeSeriesTable::new(timestamps, columns))
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|header| header.trim() == name)
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

/// Empty cells are gaps in the sensor feed, kept as `None` rather than
/// coerced to zero.
fn parse_cell(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        trimmed.parse().ok()
    }
}
