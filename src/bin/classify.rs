use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use ophys::{container_ids, responsivity_status, LocalCache, ResponsivityConfig, SessionType};

#[derive(Parser)]
#[command(name = "classify", about = "Responsivity categories per experiment container")]
struct Args {
    /// Cache directory containing manifest.json
    #[arg(long)]
    cache: PathBuf,

    /// Session type: A, B, C or C2 (or three_session_X)
    #[arg(long)]
    session_type: String,

    /// Experiment container ids (comma-separated)
    #[arg(long, value_delimiter = ',', required = true)]
    containers: Vec<i64>,

    /// JSON output path (default: stdout)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Family p-value threshold (default: 0.05)
    #[arg(long, default_value_t = 0.05)]
    p_value_max: f64,

    /// Minimum peak dF/F in percent (default: 3.0)
    #[arg(long, default_value_t = 3.0)]
    min_peak_dff: f64,

    /// Receptive-field chi-square threshold (default: 0.05)
    #[arg(long, default_value_t = 0.05)]
    rf_chi2_max: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let session_type: SessionType = args.session_type.parse()?;
    let cache = LocalCache::open(&args.cache)
        .with_context(|| format!("opening cache {}", args.cache.display()))?;
    let containers = container_ids(&args.containers);

    let cfg = ResponsivityConfig {
        p_value_max: args.p_value_max,
        min_peak_dff: args.min_peak_dff,
        rf_chi2_max: args.rf_chi2_max,
    };

    let categories = responsivity_status(&cache, &containers, session_type, &cfg)?;
    for (category, by_container) in categories.iter() {
        let n: usize = by_container.values().map(Vec::len).sum();
        log::info!("{category}: {n} cells across {} containers", by_container.len());
    }

    let json = serde_json::to_string_pretty(&categories)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Written → {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
