use clap::{Parser, Subcommand};

use crate::config::BetaburstConfig;
use crate::detect::DetectionParams;
use crate::report::ReportFormat;
use crate::util::{frange, grid_parser, range_parser, shape_parser};

#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Transient beta-burst detector for single-channel recordings.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input recording: an audio container, or .csv/.txt with one sample per line.
    pub in_file: Option<String>,
    /// Report destination; stdout when omitted.
    pub out_file: Option<String>,

    /// Configuration file (KDL); defaults to config.kdl in the project config dir.
    #[arg(long)]
    pub config: Option<String>,
    /// Sample rate in Hz; required for text input, overrides audio containers.
    #[arg(long)]
    pub sample_rate: Option<u32>,
    /// Zero-phase band-pass applied to the raw signal, as 'lo,hi' in Hz.
    #[arg(long, value_parser = range_parser)]
    pub bandpass: Option<(f64, f64)>,

    /// Morlet wavelet cycles.
    #[arg(long)]
    pub cycles: Option<f64>,
    /// Analysis frequency grid as 'lo,hi,step' in Hz.
    #[arg(long, value_parser = grid_parser)]
    pub freqs: Option<(f64, f64, f64)>,
    /// Surface smoothing window as 'freq,time' extents.
    #[arg(long, value_parser = shape_parser)]
    pub filt2d: Option<(usize, usize)>,

    /// Threshold multiplier over the per-frequency baseline median.
    #[arg(long)]
    pub n_meds: Option<f64>,
    /// Fraction of peak power bounding each burst's extent.
    #[arg(long)]
    pub prop_pwr: Option<f64>,
    /// Peak acceptance band as 'lo,hi' in Hz.
    #[arg(long, value_parser = range_parser)]
    pub peak_freqs: Option<(f64, f64)>,
    /// Local-maximum neighborhood as 'freq,time' extents.
    #[arg(long, value_parser = shape_parser)]
    pub struct_elem: Option<(usize, usize)>,
    /// Minimum separation between bursts, in seconds.
    #[arg(long)]
    pub event_gap: Option<f64>,
    /// Extra band to sample at each burst, as 'lo,hi' in Hz; repeatable.
    #[arg(long = "band", value_parser = range_parser)]
    pub bands: Vec<(f64, f64)>,

    /// Report format.
    #[arg(long, value_enum, default_value = "json")]
    pub format: ReportFormat,
    /// Recompute the power surface even if a cached one exists.
    #[arg(long)]
    pub fresh: bool,
    /// Skip recording this run in the run database.
    #[arg(long)]
    pub no_store: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect stored detection runs.
    Runs {
        #[command(subcommand)]
        action: RunsAction,
    },
}

#[derive(Subcommand)]
pub enum RunsAction {
    List,
    Show { id: i64 },
    Remove { id: i64 },
}

/// Analysis-side settings (everything upstream of the detection core).
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub cycles: f64,
    pub f0s: Vec<f64>,
    pub smooth: (usize, usize),
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            cycles: 7.0,
            f0s: frange(0.1, 40.0, 0.1),
            smooth: (1, 3),
        }
    }
}

impl Cli {
    /// Layered resolution: defaults, then config file, then CLI flags.
    pub fn resolve(&self, config: &BetaburstConfig) -> (AnalysisSettings, DetectionParams) {
        let mut analysis = AnalysisSettings::default();
        let mut detection = DetectionParams::default();

        if let Some(a) = &config.analysis {
            if let Some(v) = a.cycles {
                analysis.cycles = v;
            }
            let lo = a.freq_lo.unwrap_or(0.1);
            let hi = a.freq_hi.unwrap_or(40.0);
            let step = a.freq_step.unwrap_or(0.1);
            if a.freq_lo.is_some() || a.freq_hi.is_some() || a.freq_step.is_some() {
                analysis.f0s = frange(lo, hi, step);
            }
            if let Some(v) = a.smooth_freq {
                analysis.smooth.0 = v;
            }
            if let Some(v) = a.smooth_time {
                analysis.smooth.1 = v;
            }
        }
        if let Some(d) = &config.detection {
            if let Some(v) = d.n_meds {
                detection.n_meds = v;
            }
            if let Some(v) = d.prop_pwr {
                detection.prop_pwr = v;
            }
            if let Some(v) = d.event_gap {
                detection.event_gap_sec = v;
            }
            if let Some(v) = d.peak_lo {
                detection.peak_freqs.0 = v;
            }
            if let Some(v) = d.peak_hi {
                detection.peak_freqs.1 = v;
            }
            if let Some(v) = d.struct_freq {
                detection.struct_elem.0 = v;
            }
            if let Some(v) = d.struct_time {
                detection.struct_elem.1 = v;
            }
        }
        detection.bands = config.bands.iter().map(|b| (b.lo, b.hi)).collect();

        if let Some(v) = self.cycles {
            analysis.cycles = v;
        }
        if let Some((lo, hi, step)) = self.freqs {
            analysis.f0s = frange(lo, hi, step);
        }
        if let Some(v) = self.filt2d {
            analysis.smooth = v;
        }
        if let Some(v) = self.n_meds {
            detection.n_meds = v;
        }
        if let Some(v) = self.prop_pwr {
            detection.prop_pwr = v;
        }
        if let Some(v) = self.peak_freqs {
            detection.peak_freqs = v;
        }
        if let Some(v) = self.struct_elem {
            detection.struct_elem = v;
        }
        if let Some(v) = self.event_gap {
            detection.event_gap_sec = v;
        }
        if !self.bands.is_empty() {
            detection.bands = self.bands.clone();
        }

        (analysis, detection)
    }
}
