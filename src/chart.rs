use serde::Serialize;

use crate::models::{SeriesBundle, SeriesView};
use crate::stations::{Station, STATION_REGISTRY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineMode {
    #[default]
    Lines,
    Markers,
    LinesMarkers,
}

impl LineMode {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "lines" => Some(LineMode::Lines),
            "markers" => Some(LineMode::Markers),
            "lines+markers" => Some(LineMode::LinesMarkers),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineMode::Lines => "lines",
            LineMode::Markers => "markers",
            LineMode::LinesMarkers => "lines+markers",
        }
    }
}

/// Which named series to draw, plus the line mode for stations whose plot
/// type is user-selectable. Unknown series ids are ignored.
#[derive(Debug, Clone, Default)]
pub struct ChartSelection {
    pub series: Vec<String>,
    pub line_mode: LineMode,
}

impl ChartSelection {
    fn selected(&self, series_id: &str) -> bool {
        self.series.iter().any(|id| id == series_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeriesKind {
    Raw,
    Smoothed,
    Mda8,
}

impl SeriesKind {
    fn suffix(self) -> &'static str {
        match self {
            SeriesKind::Raw => "raw",
            SeriesKind::Smoothed => "smoothed",
            SeriesKind::Mda8 => "mda8",
        }
    }

    fn legend(self, station: &Station) -> String {
        match self {
            SeriesKind::Raw => format!("{} raw", station.short_label),
            SeriesKind::Smoothed => format!("{} 7-day average", station.short_label),
            SeriesKind::Mda8 => format!("{} max daily 8hr avg", station.short_label),
        }
    }

    fn color(self, station: &Station) -> &'static str {
        match self {
            SeriesKind::Raw => station.raw_color,
            SeriesKind::Smoothed => station.smoothed_color,
            SeriesKind::Mda8 => station.mda8_color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TracePoint {
    pub x: String,
    pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub series_id: String,
    pub name: String,
    pub mode: String,
    pub color: String,
    pub width: Option<f64>,
    pub points: Vec<TracePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub traces: Vec<Trace>,
}

/// Assembles the figure for a selection of series. The title names whichever
/// stations have a visible trace; each MDA8 trace draws against its own
/// station's day index.
pub fn build_figure(bundle: &SeriesBundle, selection: &ChartSelection) -> Figure {
    let mut traces = Vec::new();
    let mut visible_labels: Vec<&str> = Vec::new();

    for kind in [SeriesKind::Raw, SeriesKind::Smoothed, SeriesKind::Mda8] {
        for station in STATION_REGISTRY {
            let series_id = format!("{}_{}", station.id, kind.suffix());
            if !selection.selected(&series_id) {
                continue;
            }
            let Some(view) = bundle.series(&series_id) else {
                continue;
            };
            traces.push(build_trace(station, view, kind, selection.line_mode, series_id));
            if !visible_labels.contains(&station.label) {
                visible_labels.push(station.label);
            }
        }
    }

    // Keep the title's station order fixed regardless of trace order.
    let mut title_parts: Vec<&str> = Vec::new();
    for station in STATION_REGISTRY {
        if visible_labels.contains(&station.label) {
            title_parts.push(station.label);
        }
    }

    Figure {
        title: title_parts.join(" and "),
        x_axis_title: "Time".to_string(),
        y_axis_title: "ppb".to_string(),
        traces,
    }
}

fn build_trace(
    station: &Station,
    view: SeriesView<'_>,
    kind: SeriesKind,
    line_mode: LineMode,
    series_id: String,
) -> Trace {
    let mode = if station.selectable_mode {
        line_mode
    } else {
        LineMode::Lines
    };

    let points = match view {
        SeriesView::Hourly(points) => hourly_points(points),
        SeriesView::Daily(points) => points
            .iter()
            .map(|point| TracePoint {
                x: point.day.format("%Y-%m-%d").to_string(),
                y: Some(point.value),
            })
            .collect(),
    };

    Trace {
        series_id,
        name: kind.legend(station),
        mode: mode.as_str().to_string(),
        color: kind.color(station).to_string(),
        width: match kind {
            SeriesKind::Mda8 => Some(2.0),
            _ => None,
        },
        points,
    }
}

fn hourly_points(points: &[crate::models::HourlyPoint]) -> Vec<TracePoint> {
    points
        .iter()
        .map(|point| TracePoint {
            x: point.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            y: point.value,
        })
        .collect()
}
