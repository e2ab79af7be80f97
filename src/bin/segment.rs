/// segment: load one session type for a set of containers, cut each
/// container's dF/F traces by stimulus epoch and write every segment to a
/// safetensors file.
///
/// Output keys (one pair per container × stimulus):
///   <container>/<stimulus>/dff          [C, T_stim]  f32
///   <container>/<stimulus>/timestamps   [T_stim]     f64
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use ophys::{
    container_ids, create_delta_traces, epoch_tables, io::add_segments, load_datasets,
    shared_stimuli, LocalCache, SessionType, StWriter,
};

#[derive(Parser, Debug)]
#[command(name = "segment", about = "Segment dF/F traces by stimulus epoch")]
struct Args {
    /// Cache directory containing manifest.json.
    #[arg(long)]
    cache: PathBuf,

    /// Session type: A, B, C or C2.
    #[arg(long)]
    session_type: String,

    /// Experiment container ids (comma-separated).
    #[arg(long, value_delimiter = ',', required = true)]
    containers: Vec<i64>,

    /// Output safetensors path.
    #[arg(long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let session_type: SessionType = args.session_type.parse()?;
    let cache = LocalCache::open(&args.cache)
        .with_context(|| format!("opening cache {}", args.cache.display()))?;
    let containers = container_ids(&args.containers);

    let datasets = load_datasets(&cache, &containers, session_type)?;
    let tables = epoch_tables(&datasets)?;
    for (container, table) in &tables {
        for family in table.missing_families(session_type) {
            log::warn!("container {container}: no {} epochs", family.stimulus_name());
        }
    }
    eprintln!("Stimuli shown to every container: {:?}", shared_stimuli(&tables));

    let traces = create_delta_traces(&datasets, &tables)?;

    let mut w = StWriter::new();
    for (container, by_stim) in &traces {
        for (stimulus, seg) in by_stim {
            eprintln!("  {container} {stimulus}: {} cells × {} frames", seg.dff.nrows(), seg.n_frames());
        }
        add_segments(&mut w, &format!("{container}/"), by_stim);
    }
    w.write(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    eprintln!("Written → {}", args.output.display());

    Ok(())
}
