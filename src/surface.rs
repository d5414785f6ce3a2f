use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Time-frequency power representation of a single-channel recording.
///
/// `power[f][t]` is the spectral power at frequency `f0s[f]` Hz and time sample
/// `t`, with `t` counted at `sample_rate` Hz. Rows are frequency, columns are
/// time; the frequency axis is strictly ascending. The detection pipeline only
/// ever reads this structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerSurface {
    pub power: Vec<Vec<f64>>,
    pub f0s: Vec<f64>,
    pub sample_rate: u32,
}

impl PowerSurface {
    pub fn new(power: Vec<Vec<f64>>, f0s: Vec<f64>, sample_rate: u32) -> Result<Self> {
        let surface = Self { power, f0s, sample_rate };
        surface.validate()?;
        Ok(surface)
    }

    /// Fail-fast shape and axis checks, run before any detection pass.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            bail!("Sample rate must be positive");
        }
        if self.power.is_empty() {
            bail!("Power surface has no frequency rows");
        }
        let n_times = self.power[0].len();
        if n_times == 0 {
            bail!("Power surface has no time samples");
        }
        if self.power.iter().any(|row| row.len() != n_times) {
            bail!("Power surface rows have unequal lengths");
        }
        if self.f0s.len() != self.power.len() {
            bail!(
                "Frequency axis length {} does not match surface rows {}",
                self.f0s.len(),
                self.power.len()
            );
        }
        if self.f0s.windows(2).any(|w| w[1] <= w[0]) {
            bail!("Frequency axis must be strictly ascending");
        }
        Ok(())
    }

    pub fn n_freqs(&self) -> usize {
        self.power.len()
    }

    pub fn n_times(&self) -> usize {
        self.power.first().map_or(0, |row| row.len())
    }

    /// Maximum power over all frequencies at one time column.
    pub fn column_max(&self, t: usize) -> f64 {
        self.power
            .iter()
            .map(|row| row[t])
            .fold(f64::NEG_INFINITY, f64::max)
    }
}
