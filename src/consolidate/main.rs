//! Consolidate Census Bureau boundaries and GeoNames postal codes into a
//! single place hierarchy.
//!
//! Writes two JSON lines per place (metadata, then geometry) to stdout or
//! to `--output`. Logs go to stderr.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use place_hierarchy::config::{Config, Precedence};
use place_hierarchy::emit::PlaceWriter;
use place_hierarchy::models::PlaceKind;
use place_hierarchy::source::GeoJsonDir;

#[derive(Parser, Debug)]
#[command(name = "consolidate")]
#[command(about = "Consolidate boundary files and postal codes into a place hierarchy")]
struct Args {
    /// Directory holding the GeoJSON boundary files
    #[arg(long, default_value = "2-cb-geojson")]
    geojson_dir: PathBuf,

    /// Directory holding the per-region gazetteer files
    #[arg(long, default_value = "1-geonames")]
    gazetteer_dir: PathBuf,

    /// TOML config file (defaults are built in)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Which source wins when an override and the gazetteer disagree
    #[arg(long, value_enum)]
    precedence: Option<Precedence>,

    /// Show a progress spinner on stderr
    #[arg(long)]
    progress: bool,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; stdout carries the records
    let default_level = if args.verbose { "debug" } else { "info" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(precedence) = args.precedence {
        config.gazetteer.precedence = precedence;
    }

    info!("Place hierarchy consolidation");
    info!("Boundaries: {}", args.geojson_dir.display());
    info!("Gazetteer: {}", args.gazetteer_dir.display());
    info!("Precedence: {:?}", config.gazetteer.precedence);

    let output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("Failed to create output {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut writer = PlaceWriter::new(output);
    if args.progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} places ({per_sec}) {msg}")?,
        );
        pb.enable_steady_tick(Duration::from_millis(200));
        writer = writer.with_progress(pb);
    }

    let source = GeoJsonDir::new(&args.geojson_dir);
    place_hierarchy::consolidate(&source, &args.gazetteer_dir, &config, &mut writer)
        .context("Consolidation failed")?;

    let stats = writer.finish().context("Failed to flush output")?;
    for kind in PlaceKind::all() {
        info!("{}: {}", kind, stats.count(*kind));
    }
    info!("Wrote {} places", stats.total());

    Ok(())
}
