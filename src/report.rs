use std::fmt::Write;

use crate::models::{DailyPoint, SeriesBundle, StationSeries};
use crate::stations::{station_by_id, STATION_REGISTRY};

#[derive(Debug, Clone, PartialEq)]
pub struct StationSummary {
    pub station_id: String,
    pub readings: usize,
    pub missing: usize,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    pub peak_mda8: Option<DailyPoint>,
    pub mda8_days: usize,
}

/// Returns `None` when the station has no non-missing readings at all;
/// stats over an empty sample have no meaning.
pub fn summarize_station(series: &StationSeries) -> Option<StationSummary> {
    let values: Vec<f64> = series.raw.iter().filter_map(|point| point.value).collect();
    if values.is_empty() {
        return None;
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut total = 0.0;
    for &value in &values {
        min = min.min(value);
        max = max.max(value);
        total += value;
    }

    let peak_mda8 = series
        .mda8
        .iter()
        .copied()
        .max_by(|a, b| a.value.total_cmp(&b.value));

    Some(StationSummary {
        station_id: series.station_id.clone(),
        readings: values.len(),
        missing: series.raw.len() - values.len(),
        min,
        mean: total / values.len() as f64,
        max,
        peak_mda8,
        mda8_days: series.mda8.len(),
    })
}

pub fn build_report(bundle: &SeriesBundle) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Ozone Monitoring Report");
    if let Some(span) = data_span(bundle) {
        let _ = writeln!(output, "Hourly readings from {} to {}", span.0, span.1);
    }

    for station in STATION_REGISTRY {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {}", station.label);

        let summary = bundle
            .station(station.id)
            .and_then(summarize_station);
        let Some(summary) = summary else {
            let _ = writeln!(output, "No readings recorded for this station.");
            continue;
        };

        let _ = writeln!(
            output,
            "- Readings: {} ({} missing)",
            summary.readings, summary.missing
        );
        let _ = writeln!(
            output,
            "- Hourly ozone: min {:.1} ppb, mean {:.1} ppb, max {:.1} ppb",
            summary.min, summary.mean, summary.max
        );
        match summary.peak_mda8 {
            Some(peak) => {
                let _ = writeln!(
                    output,
                    "- Peak MDA8: {:.1} ppb on {}",
                    peak.value, peak.day
                );
                let _ = writeln!(output, "- Days with MDA8 coverage: {}", summary.mda8_days);
            }
            None => {
                let _ = writeln!(output, "- No day had enough readings for an MDA8 value.");
            }
        }
    }

    output
}

fn data_span(bundle: &SeriesBundle) -> Option<(String, String)> {
    let raw = &bundle.stations.first()?.raw;
    let first = raw.first()?;
    let last = raw.last()?;
    let format = "%Y-%m-%d %H:%M";
    Some((
        first.timestamp.format(format).to_string(),
        last.timestamp.format(format).to_string(),
    ))
}

/// One line per station for the terminal summary.
pub fn summary_lines(bundle: &SeriesBundle) -> Vec<String> {
    bundle
        .stations
        .iter()
        .map(|series| {
            let label = station_by_id(&series.station_id)
                .map(|station| station.label)
                .unwrap_or(series.station_id.as_str());
            match summarize_station(series) {
                Some(summary) => {
                    let peak = match summary.peak_mda8 {
                        Some(peak) => format!("peak MDA8 {:.1} ppb on {}", peak.value, peak.day),
                        None => "no MDA8 values".to_string(),
                    };
                    format!(
                        "- {} ({}): {} readings ({} missing), min {:.1} / mean {:.1} / max {:.1} ppb, {}",
                        label,
                        series.station_id,
                        summary.readings,
                        summary.missing,
                        summary.min,
                        summary.mean,
                        summary.max,
                        peak
                    )
                }
                None => format!("- {} ({}): no readings", label, series.station_id),
            }
        })
        .collect()
}
