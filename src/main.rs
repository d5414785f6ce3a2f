use anyhow::{Context, Result};
use betaburst::args::{Cli, Commands, RunsAction};
use betaburst::config::BetaburstConfig;
use betaburst::db::RunDatabase;
use betaburst::detect;
use betaburst::filter;
use betaburst::report;
use betaburst::signal;
use betaburst::transform::{self, BoxcarSmoother, MorletTransform, SurfaceSmoother};
use clap::Parser;
use directories::ProjectDirs;
use log::info;
use std::path::Path;
use std::process;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let proj_dirs = ProjectDirs::from("io", "betaburst", "betaburst")
        .context("Could not determine project directories")?;

    if let Some(Commands::Runs { action }) = &cli.command {
        std::fs::create_dir_all(proj_dirs.data_dir())?;
        let db = RunDatabase::open(proj_dirs.data_dir().join("runs.db"))?;
        return handle_runs(&db, action);
    }

    let in_file = cli
        .in_file
        .clone()
        .context("No input file given; see --help")?;

    let config = load_config(&cli, &proj_dirs)?;
    let (analysis, detection) = cli.resolve(&config);

    let surface = obtain_surface(&cli, &in_file, &analysis)?;
    let burst_report = detect::detect_bursts(&surface, &detection)?;

    report::write_report(
        &burst_report,
        cli.format,
        cli.out_file.as_deref().map(Path::new),
    )?;

    if !cli.no_store {
        std::fs::create_dir_all(proj_dirs.data_dir())?;
        let db = RunDatabase::open(proj_dirs.data_dir().join("runs.db"))?;
        let run_id = db.record_run(&in_file, surface.sample_rate, &burst_report)?;
        info!("Recorded run {} with {} bursts", run_id, burst_report.bursts.len());
    }

    Ok(())
}

fn load_config(cli: &Cli, proj_dirs: &ProjectDirs) -> Result<BetaburstConfig> {
    if let Some(path) = &cli.config {
        return BetaburstConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path));
    }
    let default_path = proj_dirs.config_dir().join("config.kdl");
    if default_path.exists() {
        info!("Using config {}", default_path.display());
        return BetaburstConfig::load(&default_path)
            .with_context(|| format!("Failed to load config {}", default_path.display()));
    }
    Ok(BetaburstConfig::default())
}

/// Loads the power surface from the cache next to the input when present,
/// otherwise decodes the signal, preconditions it, runs the wavelet transform
/// and smoother, and caches the result.
fn obtain_surface(
    cli: &Cli,
    in_file: &str,
    analysis: &betaburst::args::AnalysisSettings,
) -> Result<betaburst::PowerSurface> {
    let cache = transform::cache_path(Path::new(in_file));
    if !cli.fresh && cache.exists() {
        info!("Using cached surface {}", cache.display());
        return transform::load_cached_surface(&cache);
    }

    let (mut samples, sample_rate) = signal::load_signal(in_file, cli.sample_rate)?;
    if let Some((lo, hi)) = cli.bandpass {
        filter::bandpass(&mut samples, sample_rate, lo, hi)?;
    }

    let wavelet = MorletTransform::new(analysis.cycles);
    let mut surface = wavelet.power_surface(&samples, &analysis.f0s, sample_rate)?;
    BoxcarSmoother::new(analysis.smooth).smooth(&mut surface.power);

    if let Err(e) = transform::store_cached_surface(&cache, &surface) {
        log::warn!("Could not cache surface: {:#}", e);
    }
    Ok(surface)
}

fn handle_runs(db: &RunDatabase, action: &RunsAction) -> Result<()> {
    match action {
        RunsAction::List => {
            let runs = db.list_runs()?;
            if runs.is_empty() {
                println!("No stored runs.");
            } else {
                for run in runs {
                    println!(
                        "{}  {}  {}  {} Hz  {} bursts",
                        run.id, run.created, run.source, run.sample_rate, run.n_bursts
                    );
                }
            }
        }
        RunsAction::Show { id } => {
            let bursts = db.run_bursts(*id)?;
            if bursts.is_empty() {
                println!("Run {} has no bursts (or does not exist).", id);
            }
            for b in bursts {
                let duration = b
                    .duration_ms
                    .map(|d| format!("{:.1} ms", d))
                    .unwrap_or_else(|| "unbounded".to_string());
                let width = b
                    .spectral_width_hz
                    .map(|w| format!("{:.2} Hz", w))
                    .unwrap_or_else(|| "unbounded".to_string());
                println!(
                    "{:.3}s  {:.1} Hz  power {:.4}  duration {}  width {}",
                    b.time_sec, b.freq_hz, b.power, duration, width
                );
            }
        }
        RunsAction::Remove { id } => {
            db.remove_run(*id)?;
            println!("Removed run {}", id);
        }
    }
    Ok(())
}
