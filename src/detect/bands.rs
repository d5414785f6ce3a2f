use crate::detect::Burst;
use crate::surface::PowerSurface;

/// Mean power in each configured `[lo, hi]` band (inclusive) at every burst's
/// peak time. A band that selects no frequency rows yields `None` for every
/// burst: a recoverable "no data" marker, not an error.
pub fn sample_band_power(surface: &PowerSurface, bands: &[(f64, f64)], bursts: &mut [Burst]) {
    if bands.is_empty() {
        return;
    }
    let selections: Vec<Vec<usize>> = bands
        .iter()
        .map(|&(lo, hi)| {
            (0..surface.n_freqs())
                .filter(|&fi| surface.f0s[fi] >= lo && surface.f0s[fi] <= hi)
                .collect()
        })
        .collect();

    for burst in bursts.iter_mut() {
        burst.band_powers = selections
            .iter()
            .map(|rows| {
                if rows.is_empty() {
                    None
                } else {
                    let sum: f64 = rows.iter().map(|&fi| surface.power[fi][burst.time_index]).sum();
                    Some(sum / rows.len() as f64)
                }
            })
            .collect();
    }
}
