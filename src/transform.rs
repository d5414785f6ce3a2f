use anyhow::{bail, Context, Result};
use log::{debug, info};
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::surface::PowerSurface;

/// Complex Morlet continuous-wavelet transform, evaluated in the frequency
/// domain: the one-sided signal spectrum is multiplied by a Gaussian of width
/// `f0 / cycles` centered on each analysis frequency and inverse-transformed,
/// and the squared magnitude of the analytic result is the power row.
pub struct MorletTransform {
    /// Wavelet cycles; larger trades temporal resolution for spectral.
    pub cycles: f64,
}

impl MorletTransform {
    pub fn new(cycles: f64) -> Self {
        Self { cycles }
    }

    pub fn power_surface(
        &self,
        samples: &[f64],
        f0s: &[f64],
        sample_rate: u32,
    ) -> Result<PowerSurface> {
        if samples.is_empty() {
            bail!("Cannot transform an empty signal");
        }
        if sample_rate == 0 {
            bail!("Sample rate must be positive");
        }
        if self.cycles <= 0.0 {
            bail!("Wavelet cycles must be positive, got {}", self.cycles);
        }
        if f0s.is_empty() || f0s.windows(2).any(|w| w[1] <= w[0]) || f0s[0] <= 0.0 {
            bail!("Analysis frequencies must be positive and strictly ascending");
        }

        let n = samples.len();
        let nfft = n.next_power_of_two();
        info!(
            "Morlet transform: {} samples, {} frequencies, {} cycles, FFT size {}",
            n,
            f0s.len(),
            self.cycles,
            nfft
        );

        let mut planner = FftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(nfft);
        let inverse = planner.plan_fft_inverse(nfft);

        let mut spectrum: Vec<Complex<f64>> = samples
            .iter()
            .map(|&s| Complex::new(s, 0.0))
            .chain(std::iter::repeat(Complex::new(0.0, 0.0)).take(nfft - n))
            .collect();
        forward.process(&mut spectrum);

        // One-sided analytic spectrum: positive bins doubled, negative zeroed.
        let half = nfft / 2;
        let bin_hz = sample_rate as f64 / nfft as f64;

        let mut power = Vec::with_capacity(f0s.len());
        let mut buffer = vec![Complex::new(0.0, 0.0); nfft];
        for &f0 in f0s {
            let sigma_f = f0 / self.cycles;
            for (k, slot) in buffer.iter_mut().enumerate() {
                if k > half {
                    *slot = Complex::new(0.0, 0.0);
                    continue;
                }
                let df = (k as f64 * bin_hz - f0) / sigma_f;
                let gain = (-0.5 * df * df).exp();
                let scale = if k == 0 || k == half { 1.0 } else { 2.0 };
                *slot = spectrum[k] * gain * scale;
            }
            inverse.process(&mut buffer);
            let norm = 1.0 / nfft as f64;
            power.push(
                buffer[..n]
                    .iter()
                    .map(|z| z.scale(norm).norm_sqr())
                    .collect(),
            );
        }

        PowerSurface::new(power, f0s.to_vec(), sample_rate)
    }
}

/// 2D low-pass smoothing of a power surface. Narrow interface so the detection
/// pipeline never depends on any particular filter.
pub trait SurfaceSmoother {
    fn smooth(&self, power: &mut [Vec<f64>]);
}

/// Separable moving average with per-axis window extents. Border windows are
/// truncated and normalized by the actual sample count. An extent of 1 leaves
/// that axis untouched.
pub struct BoxcarSmoother {
    pub freq_extent: usize,
    pub time_extent: usize,
}

impl BoxcarSmoother {
    pub fn new(shape: (usize, usize)) -> Self {
        Self {
            freq_extent: shape.0.max(1),
            time_extent: shape.1.max(1),
        }
    }
}

impl SurfaceSmoother for BoxcarSmoother {
    fn smooth(&self, power: &mut [Vec<f64>]) {
        let n_freqs = power.len();
        let n_times = power.first().map_or(0, |row| row.len());

        let rt = self.time_extent / 2;
        if rt > 0 {
            for row in power.iter_mut() {
                let src = row.clone();
                for (ti, v) in row.iter_mut().enumerate() {
                    let lo = ti.saturating_sub(rt);
                    let hi = (ti + rt + 1).min(n_times);
                    *v = src[lo..hi].iter().sum::<f64>() / (hi - lo) as f64;
                }
            }
        }

        let rf = self.freq_extent / 2;
        if rf > 0 {
            for ti in 0..n_times {
                let col: Vec<f64> = power.iter().map(|row| row[ti]).collect();
                for (fi, row) in power.iter_mut().enumerate() {
                    let lo = fi.saturating_sub(rf);
                    let hi = (fi + rf + 1).min(n_freqs);
                    row[ti] = col[lo..hi].iter().sum::<f64>() / (hi - lo) as f64;
                }
            }
        }
    }
}

/// Cache path for a computed surface, next to the source recording.
pub fn cache_path(source: &Path) -> PathBuf {
    let mut cached = source.to_path_buf();
    let mut name = source.file_name().unwrap_or_default().to_os_string();
    name.push(".btpw");
    cached.set_file_name(name);
    cached
}

pub fn load_cached_surface(path: &Path) -> Result<PowerSurface> {
    let mut f = File::open(path)
        .with_context(|| format!("Failed to open cached surface {}", path.display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let surface: PowerSurface = bincode::deserialize(&buf)
        .with_context(|| format!("Corrupt surface cache {}", path.display()))?;
    surface.validate()?;
    debug!(
        "Loaded cached surface: {} x {} at {} Hz",
        surface.n_freqs(),
        surface.n_times(),
        surface.sample_rate
    );
    Ok(surface)
}

pub fn store_cached_surface(path: &Path, surface: &PowerSurface) -> Result<()> {
    let bin = bincode::serialize(surface)?;
    let mut f = File::create(path)
        .with_context(|| format!("Failed to create surface cache {}", path.display()))?;
    f.write_all(&bin)?;
    info!("Cached surface at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_morlet_concentrates_power_at_signal_frequency() {
        let sample_rate = 200u32;
        let samples: Vec<f64> = (0..2 * sample_rate as usize)
            .map(|i| (2.0 * std::f64::consts::PI * 20.0 * i as f64 / sample_rate as f64).sin())
            .collect();
        let transform = MorletTransform::new(7.0);
        let surface = transform
            .power_surface(&samples, &[5.0, 20.0, 60.0], sample_rate)
            .unwrap();

        // compare mid-signal power, away from edge effects
        let mid = samples.len() / 2;
        let at = |fi: usize| surface.power[fi][mid];
        assert!(at(1) > 10.0 * at(0), "20 Hz row must dominate the 5 Hz row");
        assert!(at(1) > 10.0 * at(2), "20 Hz row must dominate the 60 Hz row");
    }

    #[test]
    fn test_morlet_shape_matches_input() {
        let transform = MorletTransform::new(7.0);
        let samples = vec![0.5; 300];
        let surface = transform.power_surface(&samples, &[5.0, 10.0], 100).unwrap();
        assert_eq!(surface.n_freqs(), 2);
        assert_eq!(surface.n_times(), 300);
    }

    #[test]
    fn test_morlet_rejects_bad_input() {
        let transform = MorletTransform::new(7.0);
        assert!(transform.power_surface(&[], &[5.0], 100).is_err());
        assert!(transform.power_surface(&[1.0; 10], &[], 100).is_err());
        assert!(transform.power_surface(&[1.0; 10], &[5.0, 5.0], 100).is_err());
        assert!(transform.power_surface(&[1.0; 10], &[0.0, 5.0], 100).is_err());
        assert!(MorletTransform::new(0.0).power_surface(&[1.0; 10], &[5.0], 100).is_err());
    }

    #[test]
    fn test_boxcar_preserves_constant_surface() {
        let mut power = vec![vec![3.0; 10]; 6];
        BoxcarSmoother::new((3, 5)).smooth(&mut power);
        for row in &power {
            for &v in row {
                assert!((v - 3.0).abs() < 1e-12, "constant input must stay constant");
            }
        }
    }

    #[test]
    fn test_boxcar_spreads_an_impulse() {
        let mut power = vec![vec![0.0; 9]; 9];
        power[4][4] = 9.0;
        BoxcarSmoother::new((3, 3)).smooth(&mut power);
        assert!((power[4][4] - 1.0).abs() < 1e-12, "center becomes 9 / (3*3)");
        assert!((power[3][3] - 1.0).abs() < 1e-12);
        assert_eq!(power[0][0], 0.0, "mass stays within one window of the impulse");
    }

    #[test]
    fn test_boxcar_extent_one_is_identity() {
        let mut power = vec![vec![1.0, 5.0, 2.0], vec![4.0, 0.0, 3.0]];
        let original = power.clone();
        BoxcarSmoother::new((1, 1)).smooth(&mut power);
        assert_eq!(power, original);
    }

    #[test]
    fn test_cache_path_appends_extension() {
        let p = cache_path(Path::new("/data/rest.wav"));
        assert_eq!(p, PathBuf::from("/data/rest.wav.btpw"));
    }
}
