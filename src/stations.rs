/// Registry of the two monitored ozone stations. This is the single source
/// of truth for station identity: CSV column names, display labels, and the
/// trace colors used by the chart builder all live here rather than being
/// hardcoded in other modules.

pub struct Station {
    /// Stable lowercase id used in series ids and CLI flags.
    pub id: &'static str,
    /// Measurement column in the source CSV.
    pub column: &'static str,
    /// Full display name used in figure titles.
    pub label: &'static str,
    /// Short name used in trace legends.
    pub short_label: &'static str,
    pub raw_color: &'static str,
    pub smoothed_color: &'static str,
    pub mda8_color: &'static str,
    /// Whether the user-selected line mode applies to this station's traces.
    /// The dashboard's plot-type dropdown only affects Abbotsford.
    pub selectable_mode: bool,
}

pub static STATION_REGISTRY: &[Station] = &[
    Station {
        id: "yvr",
        column: "YVR_ppb",
        label: "Vancouver Airport",
        short_label: "YVR",
        raw_color: "MediumTurquoise",
        smoothed_color: "green",
        mda8_color: "blue",
        selectable_mode: false,
    },
    Station {
        id: "abb",
        column: "Abbotsford_ppb",
        label: "Abbotsford",
        short_label: "Abb",
        raw_color: "SandyBrown",
        smoothed_color: "red",
        mda8_color: "firebrick",
        selectable_mode: true,
    },
];

pub fn station_by_id(id: &str) -> Option<&'static Station> {
    STATION_REGISTRY.iter().find(|station| station.id == id)
}
