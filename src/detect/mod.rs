pub mod bands;
pub mod bounds;
pub mod candidates;
pub mod peaks;
pub mod threshold;

use anyhow::{bail, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::surface::PowerSurface;

pub use bands::sample_band_power;
pub use bounds::estimate_boundaries;
pub use candidates::filter_candidates;
pub use peaks::{locate_peaks, DilationPeakFinder, PeakFinder};
pub use threshold::estimate_thresholds;

/// Detection parameters. Every field has the conventional default; callers
/// usually start from `Default` and override selectively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionParams {
    /// Threshold multiplier applied to each row's baseline median.
    pub n_meds: f64,
    /// Fraction of peak power defining the burst extent cutoff.
    pub prop_pwr: f64,
    /// Frequency band (Hz, inclusive) in which peaks are accepted.
    pub peak_freqs: (f64, f64),
    /// Neighborhood window of the local-maximum test, (freq, time) extents.
    pub struct_elem: (usize, usize),
    /// Minimum separation between distinct bursts, in seconds.
    pub event_gap_sec: f64,
    /// Bands sampled at each burst's peak time; may be empty.
    pub bands: Vec<(f64, f64)>,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            n_meds: 6.0,
            prop_pwr: 0.5,
            peak_freqs: (13.0, 30.0),
            struct_elem: (5, 5),
            event_gap_sec: 0.2,
            bands: Vec::new(),
        }
    }
}

/// One detected burst. Boundary fields stay `None` when the half-power walk
/// reaches the array edge without crossing, and `band_powers` entries stay
/// `None` for bands selecting no frequency rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Burst {
    pub freq_index: usize,
    pub time_index: usize,
    pub time_sec: f64,
    pub freq_hz: f64,
    pub power: f64,
    pub start_sec: Option<f64>,
    pub end_sec: Option<f64>,
    pub duration_ms: Option<f64>,
    pub lower_freq_hz: Option<f64>,
    pub upper_freq_hz: Option<f64>,
    pub spectral_width_hz: Option<f64>,
    pub band_powers: Vec<Option<f64>>,
}

impl Burst {
    /// Bare burst at a peak coordinate, before boundary and band enrichment.
    pub fn at_peak(freq_index: usize, time_index: usize, surface: &PowerSurface) -> Self {
        Self {
            freq_index,
            time_index,
            time_sec: time_index as f64 / surface.sample_rate as f64,
            freq_hz: surface.f0s[freq_index],
            power: surface.power[freq_index][time_index],
            start_sec: None,
            end_sec: None,
            duration_ms: None,
            lower_freq_hz: None,
            upper_freq_hz: None,
            spectral_width_hz: None,
            band_powers: Vec::new(),
        }
    }
}

/// Final detection output: the per-frequency threshold vector plus the bursts
/// in ascending peak-time order. An empty burst list is a normal result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurstReport {
    pub thresholds: Vec<f64>,
    pub bursts: Vec<Burst>,
}

/// Full pipeline: thresholds, peak location, candidate filtering, boundary
/// estimation, band sampling, report assembly.
pub fn detect_bursts(surface: &PowerSurface, params: &DetectionParams) -> Result<BurstReport> {
    surface.validate()?;
    if params.prop_pwr <= 0.0 {
        bail!("Proportional power cutoff must be positive, got {}", params.prop_pwr);
    }
    if params.struct_elem.0 == 0 || params.struct_elem.1 == 0 {
        bail!("Peak neighborhood extents must be positive");
    }
    if params.event_gap_sec < 0.0 {
        bail!("Event gap must not be negative, got {}", params.event_gap_sec);
    }

    let thresholds = estimate_thresholds(surface, params.n_meds)?;

    let finder = DilationPeakFinder::new(params.struct_elem);
    let candidates = locate_peaks(surface, &finder);

    let event_gap_samples = (params.event_gap_sec * surface.sample_rate as f64).round() as usize;
    let kept = filter_candidates(
        &candidates,
        surface,
        &thresholds,
        params.peak_freqs,
        event_gap_samples,
    );

    let mut bursts: Vec<Burst> = kept
        .into_iter()
        .map(|(fi, ti)| Burst::at_peak(fi, ti, surface))
        .collect();
    estimate_boundaries(surface, params.prop_pwr, &mut bursts);
    sample_band_power(surface, &params.bands, &mut bursts);

    info!("Detected {} bursts", bursts.len());
    for b in &bursts {
        debug!(
            "Burst at {:.3}s, {:.1}Hz, power {:.3}, duration {:?}ms",
            b.time_sec, b.freq_hz, b.power, b.duration_ms
        );
    }

    Ok(BurstReport { thresholds, bursts })
}
