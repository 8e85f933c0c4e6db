use chrono::NaiveDateTime;

use crate::models::{
    DailyPoint, HourlyPoint, SeriesBundle, StationSeries, TimeSeriesTable, MDA8_WINDOW,
    MIN_PERIODS, SMOOTHING_WINDOW,
};
use crate::stations::STATION_REGISTRY;

/// Mean of the non-missing values in a window, or `None` when fewer than
/// `min_periods` are present.
fn window_mean(window: &[Option<f64>], min_periods: usize) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in window.iter().flatten() {
        sum += value;
        count += 1;
    }
    if count >= min_periods {
        Some(sum / count as f64)
    } else {
        None
    }
}

/// Centered rolling mean. For an even window the extra point trails the
/// center: the window at index `i` spans `[i - (window - 1) / 2, i + window / 2]`,
/// clamped to the series bounds. Partial edge windows still produce a value
/// once they hold `min_periods` points.
pub fn rolling_mean_centered(
    values: &[Option<f64>],
    window: usize,
    min_periods: usize,
) -> Vec<Option<f64>> {
    let behind = (window - 1) / 2;
    let ahead = window / 2;
    (0..values.len())
        .map(|i| {
            let start = i.saturating_sub(behind);
            let end = (i + ahead + 1).min(values.len());
            window_mean(&values[start..end], min_periods)
        })
        .collect()
}

/// Trailing rolling mean over `[i - window + 1, i]`, clamped at the front.
pub fn rolling_mean_trailing(
    values: &[Option<f64>],
    window: usize,
    min_periods: usize,
) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            window_mean(&values[start..=i], min_periods)
        })
        .collect()
}

/// Maximum value per calendar day. A day whose values are all missing gets
/// no entry at all, as opposed to a null one.
pub fn daily_max(timestamps: &[NaiveDateTime], values: &[Option<f64>]) -> Vec<DailyPoint> {
    let mut days: Vec<DailyPoint> = Vec::new();
    for (timestamp, value) in timestamps.iter().zip(values) {
        let Some(value) = *value else { continue };
        let day = timestamp.date();
        match days.last_mut() {
            Some(last) if last.day == day => {
                if value > last.value {
                    last.value = value;
                }
            }
            _ => days.push(DailyPoint { day, value }),
        }
    }
    days
}

/// Derives the full series set for one station: the raw hourly series, the
/// centered seven-day smoothing, and the max daily 8-hour average built as a
/// two-stage pipeline (trailing 8-point mean, then per-day maximum).
pub fn derive_station(
    timestamps: &[NaiveDateTime],
    values: &[Option<f64>],
    station_id: &str,
) -> StationSeries {
    let smoothed = rolling_mean_centered(values, SMOOTHING_WINDOW, MIN_PERIODS);
    let trailing = rolling_mean_trailing(values, MDA8_WINDOW, MIN_PERIODS);
    let mda8 = daily_max(timestamps, &trailing);

    let pair = |values: &[Option<f64>]| {
        timestamps
            .iter()
            .zip(values)
            .map(|(timestamp, value)| HourlyPoint {
                timestamp: *timestamp,
                value: *value,
            })
            .collect()
    };

    StationSeries {
        station_id: station_id.to_string(),
        raw: pair(values),
        smoothed: pair(&smoothed),
        mda8,
    }
}

/// Derives every station's series from the loaded table. Pure function of
/// its input; the table is only borrowed.
pub fn derive_bundle(table: &TimeSeriesTable) -> SeriesBundle {
    let stations = STATION_REGISTRY
        .iter()
        .map(|station| {
            let values = table.column(station.column).unwrap_or(&[]);
            derive_station(table.timestamps(), values, station.id)
        })
        .collect();
    SeriesBundle { stations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StationColumn;
    use chrono::{Duration, NaiveDate};

    fn hourly_timestamps(count: usize) -> Vec<NaiveDateTime> {
        let start = NaiveDate::from_ymd_opt(2017, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        (0..count)
            .map(|i| start + Duration::hours(i as i64))
            .collect()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 1, d).unwrap()
    }

    fn table_from(yvr: Vec<Option<f64>>, abb: Vec<Option<f64>>) -> TimeSeriesTable {
        let timestamps = hourly_timestamps(yvr.len());
        TimeSeriesTable::new(
            timestamps,
            vec![
                StationColumn {
                    name: "YVR_ppb".to_string(),
                    values: yvr,
                },
                StationColumn {
                    name: "Abbotsford_ppb".to_string(),
                    values: abb,
                },
            ],
        )
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn centered_window_spans_behind_and_ahead() {
        let values: Vec<Option<f64>> = (1..=6).map(|v| Some(v as f64)).collect();
        // Window 4 spans [i - 1, i + 2].
        let out = rolling_mean_centered(&values, 4, 1);
        assert_close(out[0].unwrap(), (1.0 + 2.0 + 3.0) / 3.0);
        assert_close(out[2].unwrap(), (2.0 + 3.0 + 4.0 + 5.0) / 4.0);
        assert_close(out[5].unwrap(), (5.0 + 6.0) / 2.0);
    }

    #[test]
    fn smoothed_is_the_mean_of_the_windows_points() {
        // Only the first ten points carry values; the smoothing window at
        // index 0 spans [0, 84] and therefore sees exactly those ten.
        let mut values = vec![None; 100];
        for (i, slot) in values.iter_mut().enumerate().take(10) {
            *slot = Some(i as f64);
        }
        let out = rolling_mean_centered(&values, SMOOTHING_WINDOW, MIN_PERIODS);
        assert_eq!(out.len(), values.len());
        assert_close(out[0].unwrap(), 4.5);
    }

    #[test]
    fn centered_mean_enforces_minimum_periods() {
        let mut six = vec![None; 200];
        for (i, slot) in six.iter_mut().enumerate().skip(10).take(6) {
            *slot = Some((i - 9) as f64);
        }
        let out = rolling_mean_centered(&six, SMOOTHING_WINDOW, MIN_PERIODS);
        assert_close(out[10].unwrap(), 3.5);
        // A window far from the populated stretch sees none of it.
        assert_eq!(out[150], None);

        let mut five = vec![None; 200];
        for slot in five.iter_mut().skip(10).take(5) {
            *slot = Some(1.0);
        }
        let out = rolling_mean_centered(&five, SMOOTHING_WINDOW, MIN_PERIODS);
        assert!(out.iter().all(Option::is_none));
    }

    #[test]
    fn trailing_mean_needs_six_of_eight() {
        let values = vec![Some(10.0); 24];
        let out = rolling_mean_trailing(&values, MDA8_WINDOW, MIN_PERIODS);
        for slot in &out[..5] {
            assert_eq!(*slot, None);
        }
        for slot in &out[5..] {
            assert_close(slot.unwrap(), 10.0);
        }

        // Two gaps inside a window still leave six points.
        let mut gappy = vec![Some(4.0); 16];
        gappy[9] = None;
        gappy[10] = None;
        let out = rolling_mean_trailing(&gappy, MDA8_WINDOW, MIN_PERIODS);
        assert_close(out[15].unwrap(), 4.0);

        gappy[11] = None;
        let out = rolling_mean_trailing(&gappy, MDA8_WINDOW, MIN_PERIODS);
        assert_eq!(out[15], None);
    }

    #[test]
    fn daily_max_drops_days_without_values() {
        let timestamps = hourly_timestamps(72);
        let mut values = vec![None; 72];
        // Only the third day carries rolling values.
        for (i, slot) in values.iter_mut().enumerate().skip(50).take(12) {
            *slot = Some(i as f64);
        }
        let days = daily_max(&timestamps, &values);
        assert_eq!(days, vec![DailyPoint { day: day(3), value: 61.0 }]);
    }

    #[test]
    fn trailing_windows_spill_across_midnight() {
        // A fully populated first day feeds the first trailing windows of an
        // otherwise empty second day, so that day still gets an entry.
        let mut values: Vec<Option<f64>> = (0..24).map(|i| Some(i as f64)).collect();
        values.extend(std::iter::repeat(None).take(24));
        let timestamps = hourly_timestamps(48);
        let trailing = rolling_mean_trailing(&values, MDA8_WINDOW, MIN_PERIODS);
        let days = daily_max(&timestamps, &trailing);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day, day(1));
        assert_eq!(days[1].day, day(2));
        // Day two's maximum is the hour-1 window, averaging hours 18..23 of
        // day one (six points, the last one that still meets the minimum).
        assert_close(days[1].value, (18..=23).sum::<i32>() as f64 / 6.0);
    }

    #[test]
    fn constant_series_smooths_to_constant() {
        let ten_days = 240;
        let values = vec![Some(42.0); ten_days];
        let table = table_from(values.clone(), values);
        let bundle = derive_bundle(&table);

        for station in &bundle.stations {
            assert_eq!(station.smoothed.len(), ten_days);
            for point in &station.smoothed {
                assert_close(point.value.unwrap(), 42.0);
            }
            assert_eq!(station.mda8.len(), 10);
            for point in &station.mda8 {
                assert_close(point.value, 42.0);
            }
        }
    }

    #[test]
    fn sparse_station_yields_missing_series_not_errors() {
        let mut five = vec![None; 240];
        for slot in five.iter_mut().take(5) {
            *slot = Some(30.0);
        }
        let series = derive_station(&hourly_timestamps(240), &five, "yvr");
        assert_eq!(series.smoothed.len(), 240);
        assert!(series.smoothed.iter().all(|point| point.value.is_none()));
        assert!(series.mda8.is_empty());
    }

    #[test]
    fn absent_station_column_does_not_fail() {
        let timestamps = hourly_timestamps(24);
        let table = TimeSeriesTable::new(timestamps, Vec::new());
        let bundle = derive_bundle(&table);
        assert_eq!(bundle.stations.len(), 2);
        for station in &bundle.stations {
            assert!(station.raw.is_empty());
            assert!(station.mda8.is_empty());
        }
    }

    #[test]
    fn one_missing_station_leaves_the_other_intact() {
        let populated = vec![Some(20.0); 240];
        let missing = vec![None; 240];
        let table = table_from(missing, populated);
        let bundle = derive_bundle(&table);

        let yvr = bundle.station("yvr").unwrap();
        assert!(yvr.smoothed.iter().all(|point| point.value.is_none()));
        assert!(yvr.mda8.is_empty());

        let abb = bundle.station("abb").unwrap();
        assert!(abb.smoothed.iter().all(|point| point.value.is_some()));
        assert_eq!(abb.mda8.len(), 10);
    }

    #[test]
    fn deriving_twice_is_identical() {
        let mut values = vec![Some(10.0); 240];
        values[17] = None;
        values[100] = Some(55.5);
        let table = table_from(values.clone(), values);
        assert_eq!(derive_bundle(&table), derive_bundle(&table));
    }

    #[test]
    fn each_station_owns_its_day_index() {
        // YVR only has data on day one, Abbotsford only on day two; their
        // MDA8 day indexes must not be shared.
        let mut yvr = vec![None; 48];
        for slot in yvr.iter_mut().take(24) {
            *slot = Some(10.0);
        }
        let mut abb = vec![None; 48];
        for slot in abb.iter_mut().skip(24).take(24) {
            *slot = Some(20.0);
        }
        let table = table_from(yvr, abb);
        let bundle = derive_bundle(&table);

        let yvr_days: Vec<NaiveDate> = bundle
            .station("yvr")
            .unwrap()
            .mda8
            .iter()
            .map(|point| point.day)
            .collect();
        let abb_days: Vec<NaiveDate> = bundle
            .station("abb")
            .unwrap()
            .mda8
            .iter()
            .map(|point| point.day)
            .collect();

        assert!(yvr_days.contains(&day(1)));
        assert!(!abb_days.contains(&day(1)));
        assert!(abb_days.contains(&day(2)));
    }
}
