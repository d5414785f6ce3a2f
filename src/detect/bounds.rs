use crate::detect::Burst;
use crate::surface::PowerSurface;

/// Temporal and spectral extent of each burst, found by walking outward from
/// the peak until power first drops strictly below `peak_power * prop_pwr`.
///
/// The cutoff is proportional to the event's own peak, not the statistical
/// threshold, so the boundary definition scales with burst amplitude (the
/// usual half-power convention at the default 0.5). A walk that reaches the
/// array edge without crossing leaves that bound as `None`; it is never
/// clamped to the edge index.
pub fn estimate_boundaries(surface: &PowerSurface, prop_pwr: f64, bursts: &mut [Burst]) {
    let sr = surface.sample_rate as f64;
    for burst in bursts.iter_mut() {
        let fi = burst.freq_index;
        let ti = burst.time_index;
        let cutoff = surface.power[fi][ti] * prop_pwr;

        let row = &surface.power[fi];
        let start = (0..ti).rev().find(|&t| row[t] < cutoff);
        let end = (ti + 1..surface.n_times()).find(|&t| row[t] < cutoff);
        burst.start_sec = start.map(|t| t as f64 / sr);
        burst.end_sec = end.map(|t| t as f64 / sr);
        burst.duration_ms = match (burst.start_sec, burst.end_sec) {
            (Some(s), Some(e)) => Some(1000.0 * (e - s)),
            _ => None,
        };

        let lower = (0..fi).rev().find(|&f| surface.power[f][ti] < cutoff);
        let upper = (fi + 1..surface.n_freqs()).find(|&f| surface.power[f][ti] < cutoff);
        burst.lower_freq_hz = lower.map(|f| surface.f0s[f]);
        burst.upper_freq_hz = upper.map(|f| surface.f0s[f]);
        burst.spectral_width_hz = match (burst.lower_freq_hz, burst.upper_freq_hz) {
            (Some(lo), Some(hi)) => Some(hi - lo),
            _ => None,
        };
    }
}
