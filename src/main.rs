use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

mod chart;
mod derive;
mod loader;
mod models;
mod report;
mod stations;

use chart::{ChartSelection, LineMode};
use models::SeriesBundle;

#[derive(Parser)]
#[command(name = "ozone-trends")]
#[command(about = "Ground-level ozone trends for Metro Vancouver stations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive every series and write the bundle as JSON
    Export {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value = "series.json")]
        out: PathBuf,
    },
    /// Build a figure for the selected series
    Chart {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        yvr_raw: bool,
        #[arg(long)]
        yvr_smoothed: bool,
        #[arg(long)]
        yvr_mda8: bool,
        #[arg(long)]
        abb_raw: bool,
        #[arg(long)]
        abb_smoothed: bool,
        #[arg(long)]
        abb_mda8: bool,
        /// lines, markers, or lines+markers
        #[arg(long, default_value = "lines")]
        mode: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Print one summary line per station
    Summary {
        #[arg(long)]
        csv: PathBuf,
    },
}

fn load_bundle(csv: &Path) -> anyhow::Result<SeriesBundle> {
    let table = loader::load_source(csv)
        .with_context(|| format!("failed to load readings from {}", csv.display()))?;
    Ok(derive::derive_bundle(&table))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Export { csv, out } => {
            let bundle = load_bundle(&csv)?;
            let json = serde_json::to_string_pretty(&bundle)?;
            std::fs::write(&out, json)?;
            println!("Series bundle written to {}.", out.display());
        }
        Commands::Chart {
            csv,
            yvr_raw,
            yvr_smoothed,
            yvr_mda8,
            abb_raw,
            abb_smoothed,
            abb_mda8,
            mode,
            out,
        } => {
            let line_mode = LineMode::parse(&mode)
                .with_context(|| format!("unknown line mode '{}'", mode))?;
            let flags = [
                (yvr_raw, "yvr_raw"),
                (yvr_smoothed, "yvr_smoothed"),
                (yvr_mda8, "yvr_mda8"),
                (abb_raw, "abb_raw"),
                (abb_smoothed, "abb_smoothed"),
                (abb_mda8, "abb_mda8"),
            ];
            let series: Vec<String> = flags
                .iter()
                .filter(|(enabled, _)| *enabled)
                .map(|(_, id)| id.to_string())
                .collect();

            let bundle = load_bundle(&csv)?;
            let figure = chart::build_figure(&bundle, &ChartSelection { series, line_mode });
            let json = serde_json::to_string_pretty(&figure)?;
            match out {
                Some(out) => {
                    std::fs::write(&out, json)?;
                    println!("Figure written to {}.", out.display());
                }
                None => println!("{json}"),
            }
        }
        Commands::Report { csv, out } => {
            let bundle = load_bundle(&csv)?;
            let report = report::build_report(&bundle);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Summary { csv } => {
            let bundle = load_bundle(&csv)?;
            println!("Station summaries:");
            for line in report::summary_lines(&bundle) {
                println!("{line}");
            }
        }
    }

    Ok(())
}
