use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Minimum non-missing points a rolling window needs to produce a value.
pub const MIN_PERIODS: usize = 6;

// 24 hourly readings per day, seven days.
pub const SMOOTHING_WINDOW: usize = 24 * 7;

pub const MDA8_WINDOW: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct StationColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Hourly readings indexed by timestamp. Timestamps are unique and strictly
/// increasing once the loader has produced the table; every station column
/// has one entry per timestamp, with gaps kept as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesTable {
    timestamps: Vec<NaiveDateTime>,
    columns: Vec<StationColumn>,
}

impl TimeSeriesTable {
    pub fn new(timestamps: Vec<NaiveDateTime>, columns: Vec<StationColumn>) -> Self {
        Self {
            timestamps,
            columns,
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|column| column.name == name)
            .map(|column| column.values.as_slice())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyPoint {
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyPoint {
    pub day: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSeries {
    pub station_id: String,
    pub raw: Vec<HourlyPoint>,
    pub smoothed: Vec<HourlyPoint>,
    pub mda8: Vec<DailyPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeriesView<'a> {
    Hourly(&'a [HourlyPoint]),
    Daily(&'a [DailyPoint]),
}

/// Every raw and derived series for every station, computed once after load
/// and read-only for the rest of the process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesBundle {
    pub stations: Vec<StationSeries>,
}

impl SeriesBundle {
    pub fn station(&self, station_id: &str) -> Option<&StationSeries> {
        self.stations
            .iter()
            .find(|station| station.station_id == station_id)
    }

    /// Looks up a series by its stable id, e.g. `yvr_raw` or `abb_mda8`.
    pub fn series(&self, series_id: &str) -> Option<SeriesView<'_>> {
        let (station_id, kind) = series_id.rsplit_once('_')?;
        let station = self.station(station_id)?;
        match kind {
            "raw" => Some(SeriesView::Hourly(&station.raw)),
            "smoothed" => Some(SeriesView::Hourly(&station.smoothed)),
            "mda8" => Some(SeriesView::Daily(&station.mda8)),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum MalformedInputError {
    /// The source file is missing or could not be read.
    Unreadable(String),
    /// The header row lacks a required column.
    MissingColumn(String),
    /// A timestamp cell did not parse as a date-time.
    UnparseableTimestamp { row: usize, value: String },
    /// Two rows share a timestamp, so a unique index cannot be built.
    DuplicateTimestamp(NaiveDateTime),
    /// The file has a header but no data rows.
    Empty,
}

impl std::fmt::Display for MalformedInputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedInputError::Unreadable(detail) => {
                write!(f, "unreadable input: {}", detail)
            }
            MalformedInputError::MissingColumn(name) => {
                write!(f, "missing required column: {}", name)
            }
            MalformedInputError::UnparseableTimestamp { row, value } => {
                write!(f, "unparseable timestamp at row {}: '{}'", row, value)
            }
            MalformedInputError::DuplicateTimestamp(timestamp) => {
                write!(f, "duplicate timestamp: {}", timestamp)
            }
            MalformedInputError::Empty => write!(f, "no data rows in input"),
        }
    }
}

impl std::error::Error for MalformedInputError {}
