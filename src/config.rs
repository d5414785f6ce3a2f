use knuffel::Decode;
use serde::{Deserialize, Serialize};

/// On-disk configuration (KDL). Every field is optional; CLI flags override
/// whatever the file sets, and anything left unset falls back to the
/// conventional defaults in `DetectionParams` / `AnalysisSettings`.
///
/// ```kdl
/// analysis cycles=7.0 freq-lo=0.1 freq-hi=40.0 freq-step=0.1 smooth-freq=1 smooth-time=3
/// detection n-meds=6.0 prop-pwr=0.5 event-gap=0.2 peak-lo=13.0 peak-hi=30.0 \
///           struct-freq=5 struct-time=5
/// band "mu" lo=8.0 hi=13.0
/// band "low-gamma" lo=30.0 hi=45.0
/// ```
#[derive(Decode, Debug, Clone, Serialize, Deserialize, Default)]
pub struct BetaburstConfig {
    #[knuffel(child)]
    pub analysis: Option<AnalysisConfig>,
    #[knuffel(child)]
    pub detection: Option<DetectionConfig>,
    #[knuffel(children(name = "band"))]
    pub bands: Vec<BandConfig>,
}

#[derive(Decode, Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalysisConfig {
    #[knuffel(property)]
    pub cycles: Option<f64>,
    #[knuffel(property(name = "freq-lo"))]
    pub freq_lo: Option<f64>,
    #[knuffel(property(name = "freq-hi"))]
    pub freq_hi: Option<f64>,
    #[knuffel(property(name = "freq-step"))]
    pub freq_step: Option<f64>,
    #[knuffel(property(name = "smooth-freq"))]
    pub smooth_freq: Option<usize>,
    #[knuffel(property(name = "smooth-time"))]
    pub smooth_time: Option<usize>,
}

#[derive(Decode, Debug, Clone, Serialize, Deserialize, Default)]
pub struct DetectionConfig {
    #[knuffel(property(name = "n-meds"))]
    pub n_meds: Option<f64>,
    #[knuffel(property(name = "prop-pwr"))]
    pub prop_pwr: Option<f64>,
    #[knuffel(property(name = "event-gap"))]
    pub event_gap: Option<f64>,
    #[knuffel(property(name = "peak-lo"))]
    pub peak_lo: Option<f64>,
    #[knuffel(property(name = "peak-hi"))]
    pub peak_hi: Option<f64>,
    #[knuffel(property(name = "struct-freq"))]
    pub struct_freq: Option<usize>,
    #[knuffel(property(name = "struct-time"))]
    pub struct_time: Option<usize>,
}

#[derive(Decode, Debug, Clone, Serialize, Deserialize)]
pub struct BandConfig {
    #[knuffel(argument)]
    pub name: String,
    #[knuffel(property)]
    pub lo: f64,
    #[knuffel(property)]
    pub hi: f64,
}

impl BetaburstConfig {
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let config = knuffel::parse("config.kdl", &content)?;
        Ok(config)
    }
}
