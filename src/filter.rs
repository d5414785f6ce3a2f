use anyhow::{anyhow, bail, Result};
use biquad::{Biquad, Coefficients, DirectForm1, ToHertz, Type};
use log::info;

/// Runs the filter over the signal twice, once reversed, for zero phase shift.
/// Phase distortion would bias the detected burst timing.
fn forward_backward<F: Biquad<f64>>(signal: &mut [f64], filter: &mut F) {
    signal.iter_mut().for_each(|x| *x = filter.run(*x));
    filter.reset_state();
    signal.reverse();
    signal.iter_mut().for_each(|x| *x = filter.run(*x));
    filter.reset_state();
    signal.reverse();
}

fn coefficients(f_type: Type<f64>, fs: f64, freq: f64) -> Result<Coefficients<f64>> {
    Coefficients::<f64>::from_params(f_type, fs.hz(), freq.hz(), 0.707)
        .map_err(|_| anyhow!("Failed to create filter coefficients for {} Hz", freq))
}

/// Zero-phase Butterworth band-pass applied to the raw signal before the
/// wavelet transform: a high-pass at `lo` Hz followed by a low-pass at `hi`
/// Hz, each run forward-backward.
pub fn bandpass(samples: &mut [f64], sample_rate: u32, lo: f64, hi: f64) -> Result<()> {
    let fs = sample_rate as f64;
    let nyquist = fs / 2.0;
    if lo <= 0.0 || hi <= lo {
        bail!("Band-pass edges must satisfy 0 < lo < hi, got {}..{}", lo, hi);
    }
    if hi >= nyquist {
        bail!("Band-pass upper edge {} Hz at or above Nyquist ({} Hz)", hi, nyquist);
    }
    info!("Preconditioning signal with {}..{} Hz zero-phase band-pass", lo, hi);

    let mut hpf = DirectForm1::<f64>::new(coefficients(Type::HighPass, fs, lo)?);
    forward_backward(samples, &mut hpf);

    let mut lpf = DirectForm1::<f64>::new(coefficients(Type::LowPass, fs, hi)?);
    forward_backward(samples, &mut lpf);

    Ok(())
}
