//! Transient narrow-band burst detection over time-frequency power surfaces.
//!
//! The pipeline takes a single-channel recording, computes a Morlet wavelet
//! power surface, and finds short oscillatory bursts in a frequency band of
//! interest: per-frequency median thresholds, 2D local-maximum candidates,
//! temporal de-duplication, and half-power boundary estimation in both time
//! and frequency.

pub mod args;
pub mod config;
pub mod db;
pub mod detect;
pub mod filter;
pub mod report;
pub mod signal;
pub mod surface;
pub mod transform;
pub mod util;

pub use detect::{
    detect_bursts, estimate_boundaries, estimate_thresholds, filter_candidates, locate_peaks,
    sample_band_power, Burst, BurstReport, DetectionParams, DilationPeakFinder, PeakFinder,
};
pub use surface::PowerSurface;
pub use transform::{BoxcarSmoother, MorletTransform, SurfaceSmoother};
