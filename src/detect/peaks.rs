use crate::surface::PowerSurface;

/// Local-maximum detection over a 2D power array.
///
/// Kept behind a trait so the dilation-based default can be swapped for a
/// different local-maximum algorithm without touching the detection core,
/// which only consumes the boolean mask.
pub trait PeakFinder {
    /// Boolean mask with the same shape as `power`; `true` marks a peak.
    fn peak_mask(&self, power: &[Vec<f64>]) -> Vec<Vec<bool>>;
}

/// Neighborhood-dilation local maximum test.
///
/// A coordinate is a peak iff its value equals the maximum of the window
/// centered on it (window truncated at the array borders). Every location
/// attaining the window maximum is reported, so plateau ties yield multiple
/// peaks. Flat windows (max == min) are background and never peaks; without
/// this, a zero-padded surface would report its entire background.
pub struct DilationPeakFinder {
    pub freq_extent: usize,
    pub time_extent: usize,
}

impl DilationPeakFinder {
    /// `shape` is the full window size per axis, e.g. (5, 5).
    pub fn new(shape: (usize, usize)) -> Self {
        Self {
            freq_extent: shape.0.max(1),
            time_extent: shape.1.max(1),
        }
    }
}

impl PeakFinder for DilationPeakFinder {
    fn peak_mask(&self, power: &[Vec<f64>]) -> Vec<Vec<bool>> {
        let n_freqs = power.len();
        let n_times = power.first().map_or(0, |row| row.len());
        let rf = self.freq_extent / 2;
        let rt = self.time_extent / 2;

        let mut mask = vec![vec![false; n_times]; n_freqs];
        for fi in 0..n_freqs {
            let f_lo = fi.saturating_sub(rf);
            let f_hi = (fi + rf + 1).min(n_freqs);
            for ti in 0..n_times {
                let t_lo = ti.saturating_sub(rt);
                let t_hi = (ti + rt + 1).min(n_times);

                let mut wmax = f64::NEG_INFINITY;
                let mut wmin = f64::INFINITY;
                for row in &power[f_lo..f_hi] {
                    for &v in &row[t_lo..t_hi] {
                        if v > wmax {
                            wmax = v;
                        }
                        if v < wmin {
                            wmin = v;
                        }
                    }
                }
                mask[fi][ti] = power[fi][ti] == wmax && wmax > wmin;
            }
        }
        mask
    }
}

/// Collects the peak mask into `(f_index, t_index)` candidate coordinates.
/// The list is unordered as far as callers may assume; the candidate filter
/// re-orders its survivors by time.
pub fn locate_peaks<F: PeakFinder>(surface: &PowerSurface, finder: &F) -> Vec<(usize, usize)> {
    let mask = finder.peak_mask(&surface.power);
    let mut candidates = Vec::new();
    for (fi, row) in mask.iter().enumerate() {
        for (ti, &hit) in row.iter().enumerate() {
            if hit {
                candidates.push((fi, ti));
            }
        }
    }
    log::debug!("Peak locator produced {} candidates", candidates.len());
    candidates
}
