//! accumerge Binary
//!
//! Merges pre-sorted TSV files into one sorted stream.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use accumerge::{tsv, AccumergeError, MatchingKeyPolicy, MergerConfig, SortedMerger};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

/// accumerge
#[derive(Parser, Debug)]
#[command(name = "accumerge")]
#[command(about = "Merge pre-sorted key<TAB>value files")]
#[command(version)]
struct Args {
    /// Which entry to keep when several files share a key
    #[arg(short, long, value_enum, default_value_t = PolicyArg::Latest)]
    policy: PolicyArg,

    /// Fail if an input is not strictly sorted by key
    #[arg(long)]
    check: bool,

    /// Write the merged entries here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Input files, earliest first
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    /// Keep whichever entry the merge saw first
    Any,
    /// Keep the entry from the last file listed
    Latest,
    /// Keep the entry from the first file listed
    Earliest,
}

impl From<PolicyArg> for MatchingKeyPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Any => MatchingKeyPolicy::DontCare,
            PolicyArg::Latest => MatchingKeyPolicy::ChooseLatest,
            PolicyArg::Earliest => MatchingKeyPolicy::ChooseEarliest,
        }
    }
}

fn main() {
    // Initialize tracing/logging (stdout carries the merged output)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,accumerge=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("accumerge v{}", accumerge::VERSION);

    if let Err(e) = run(args) {
        tracing::error!("Merge failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> accumerge::Result<()> {
    let config = MergerConfig::builder()
        .default_policy(args.policy.into())
        .validate_sorted(args.check)
        .build();
    let merger = SortedMerger::with_config(config)?;

    // Parse the inputs in parallel, then register them in argument order so
    // that ages follow the command line.
    let parsed = crossbeam::thread::scope(|scope| {
        let handles: Vec<_> = args
            .inputs
            .iter()
            .map(|path| scope.spawn(move |_| tsv::read_entries(path)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|_| Err(reader_panicked())))
            .collect::<Vec<_>>()
    })
    .map_err(|_| reader_panicked())?;

    for (path, entries) in args.inputs.iter().zip(parsed) {
        let entries = entries?;
        tracing::info!(path = %path.display(), entries = entries.len(), "Registered input");
        merger.add_sized(entries);
    }

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut merge = merger.iter_default();
    let written = tsv::write_entries(&mut out, merge.by_ref())?;
    merge.finish()?;
    out.flush()?;

    tracing::info!(written, "Merge complete");
    Ok(())
}

fn reader_panicked() -> AccumergeError {
    AccumergeError::Io(io::Error::new(io::ErrorKind::Other, "input reader thread panicked"))
}
