use anyhow::{bail, Result};
use crate::surface::PowerSurface;
use crate::util::median;

/// Per-frequency detection thresholds: median power of each row with the first
/// second of data discarded, scaled by `n_meds`.
///
/// The leading second is skipped because the wavelet transform smears edge
/// artifacts into it; the same samples are excluded from event acceptance in
/// the candidate filter.
pub fn estimate_thresholds(surface: &PowerSurface, n_meds: f64) -> Result<Vec<f64>> {
    if n_meds <= 0.0 {
        bail!("Threshold multiplier must be positive, got {}", n_meds);
    }
    let skip = surface.sample_rate as usize;
    if surface.n_times() <= skip {
        bail!(
            "Surface too short for baseline estimation: {} samples, need more than {}",
            surface.n_times(),
            skip
        );
    }
    Ok(surface
        .power
        .iter()
        .map(|row| median(&row[skip..]) * n_meds)
        .collect())
}
