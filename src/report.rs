use anyhow::{Context, Result};
use clap::ValueEnum;
use log::info;
use std::io::Write;
use std::path::Path;

use crate::detect::BurstReport;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Csv,
}

/// Writes the report to `out` (stdout when `None`). JSON carries the full
/// report including the threshold vector; CSV is one row per burst with empty
/// cells for undefined values, the threshold vector being omitted.
pub fn write_report(report: &BurstReport, format: ReportFormat, out: Option<&Path>) -> Result<()> {
    let rendered = match format {
        ReportFormat::Json => serde_json::to_string_pretty(report)?,
        ReportFormat::Csv => render_csv(report),
    };
    match out {
        Some(path) => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create report file {}", path.display()))?;
            file.write_all(rendered.as_bytes())?;
            file.write_all(b"\n")?;
            info!("Report written to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn opt_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{}", v)).unwrap_or_default()
}

fn render_csv(report: &BurstReport) -> String {
    let n_bands = report
        .bursts
        .iter()
        .map(|b| b.band_powers.len())
        .max()
        .unwrap_or(0);

    let mut header: Vec<String> = [
        "time_index",
        "time_sec",
        "freq_hz",
        "power",
        "start_sec",
        "end_sec",
        "duration_ms",
        "lower_freq_hz",
        "upper_freq_hz",
        "spectral_width_hz",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    for i in 0..n_bands {
        header.push(format!("band_{}", i + 1));
    }

    let mut lines = vec![header.join(",")];
    for b in &report.bursts {
        let mut cells = vec![
            b.time_index.to_string(),
            format!("{}", b.time_sec),
            format!("{}", b.freq_hz),
            format!("{}", b.power),
            opt_cell(b.start_sec),
            opt_cell(b.end_sec),
            opt_cell(b.duration_ms),
            opt_cell(b.lower_freq_hz),
            opt_cell(b.upper_freq_hz),
            opt_cell(b.spectral_width_hz),
        ];
        for i in 0..n_bands {
            cells.push(opt_cell(b.band_powers.get(i).copied().flatten()));
        }
        lines.push(cells.join(","));
    }
    lines.join("\n")
}
