//! bdscan: Breslow-Day based two-locus QTL scan.
//!
//! CLI entry point using clap for argument parsing.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "bdscan",
    version,
    about = "Breslow-Day based two-locus QTL scan",
    long_about = "Genome-wide two-locus epistasis scan using the Breslow-Day test.\n\
                   Tabulates 8-cell contingency counts per window pair, computes\n\
                   homogeneity p-values, and reduces them to per-range null minima."
)]
struct Cli {
    /// Number of threads to use
    #[arg(long, default_value = "1", global = true)]
    threads: usize,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Step 1: Tabulate Breslow-Day cell counts for every window pair
    Scan(commands::scan::ScanArgs),

    /// Step 2: Compute Breslow-Day p-values from a cell-count table
    Pvalues(commands::pvalues::PvaluesArgs),

    /// Step 3: Reduce a p-value column to per-range null minima
    NullMin(commands::null_min::NullMinArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    // Set up thread pool
    rayon::ThreadPoolBuilder::new()
        .num_threads(cli.threads)
        .build_global()
        .ok();

    tracing::info!("bdscan v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Using {} threads", cli.threads);

    match cli.command {
        Commands::Scan(args) => commands::scan::run(args),
        Commands::Pvalues(args) => commands::pvalues::run(args),
        Commands::NullMin(args) => commands::null_min::run(args),
    }
}
