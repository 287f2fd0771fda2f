//! Step 1: Cell-count tabulation.
//!
//! bdscan scan --input geno.csv --sterile sterile.txt --fertile fertile.txt --out-prefix run1 [--uni-set all | --uni mito-0 ...]

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use tracing::info;

use bdscan_core::scan::{run_bidirectional, run_unidirectional, UniMarker, UniSet};
use bdscan_core::tabulate::{ContingencyRow, FocalAllele};
use bdscan_geno::{GenotypeMatrix, PhenotypeSets, WindowLayout};

#[derive(Args)]
pub struct ScanArgs {
    /// Genotype matrix file (delimited text, one row per window)
    #[arg(long)]
    input: String,

    /// Output file prefix
    #[arg(long)]
    out_prefix: String,

    /// Sterile sample ID list
    #[arg(long)]
    sterile: String,

    /// Fertile sample ID list
    #[arg(long)]
    fertile: String,

    /// Leading metadata columns to drop from the matrix
    #[arg(long, default_value = "3")]
    drop_cols: usize,

    /// End-exclusive window index of the X block
    #[arg(long, default_value = "545")]
    x_end: usize,

    /// End-exclusive window index of chromosome 2
    #[arg(long, default_value = "1524")]
    chr2_end: usize,

    /// End-exclusive window index of chromosome 3
    #[arg(long, default_value = "2579")]
    chr3_end: usize,

    /// Row index of the mitochondrial marker window
    #[arg(long, default_value = "2579")]
    mito_window: usize,

    /// Row index of the Y marker window
    #[arg(long, default_value = "2580")]
    y_window: usize,

    /// Unidirectional scan subset to run in addition to the
    /// bidirectional scan
    #[arg(long, value_enum)]
    uni_set: Option<UniSetArg>,

    /// Individual unidirectional marker/focal combinations to run
    /// (repeatable; combined with --uni-set)
    #[arg(long = "uni", value_enum)]
    uni: Vec<UniScanArg>,

    /// Run only the unidirectional scans (requires --uni-set or --uni)
    #[arg(long, default_value = "false")]
    uni_only: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UniSetArg {
    /// Mito under 0-focal, Y under 2-focal
    FrMitoZiY,
    /// All four marker/focal combinations
    All,
    /// Mito under 2-focal, Y under 0-focal
    ZiMitoFrY,
}

impl From<UniSetArg> for UniSet {
    fn from(arg: UniSetArg) -> Self {
        match arg {
            UniSetArg::FrMitoZiY => UniSet::FrMitoZiY,
            UniSetArg::All => UniSet::All,
            UniSetArg::ZiMitoFrY => UniSet::ZiMitoFrY,
        }
    }
}

/// One (marker, focal) unidirectional combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UniScanArg {
    /// Mito marker, 0-focal
    #[value(name = "mito-0")]
    Mito0,
    /// Mito marker, 2-focal
    #[value(name = "mito-2")]
    Mito2,
    /// Y marker, 0-focal
    #[value(name = "y-0")]
    Y0,
    /// Y marker, 2-focal
    #[value(name = "y-2")]
    Y2,
}

impl UniScanArg {
    fn scan(self) -> (UniMarker, FocalAllele) {
        match self {
            UniScanArg::Mito0 => (UniMarker::Mito, FocalAllele::Zero),
            UniScanArg::Mito2 => (UniMarker::Mito, FocalAllele::Two),
            UniScanArg::Y0 => (UniMarker::Y, FocalAllele::Zero),
            UniScanArg::Y2 => (UniMarker::Y, FocalAllele::Two),
        }
    }
}

/// Expand the uni-scan selection: the convenience set's combinations
/// first, then any individually requested ones not already included.
fn uni_scan_list(set: Option<UniSetArg>, singles: &[UniScanArg]) -> Vec<(UniMarker, FocalAllele)> {
    let mut scans: Vec<(UniMarker, FocalAllele)> = match set {
        Some(set) => UniSet::from(set).scans(),
        None => Vec::new(),
    };
    for single in singles {
        let scan = single.scan();
        if !scans.contains(&scan) {
            scans.push(scan);
        }
    }
    scans
}

pub fn run(args: ScanArgs) -> Result<()> {
    // Reject malformed configuration before loading anything.
    let uni_scans = uni_scan_list(args.uni_set, &args.uni);
    if args.uni_only && uni_scans.is_empty() {
        bail!("--uni-only requires --uni-set or --uni");
    }

    info!("=== bdscan Step 1: Cell-count tabulation ===");

    let layout = WindowLayout::new(
        args.x_end,
        args.chr2_end,
        args.chr3_end,
        args.mito_window,
        args.y_window,
    )?;

    let matrix = GenotypeMatrix::from_path(Path::new(&args.input), args.drop_cols)?;
    layout.validate_against(matrix.n_windows())?;

    let phenotypes = PhenotypeSets::from_files(Path::new(&args.sterile), Path::new(&args.fertile))?;
    for id in matrix.sample_ids() {
        if phenotypes.classify(id).is_none() {
            bail!(
                "Sample '{}' from the genotype matrix is in neither phenotype list",
                id
            );
        }
    }

    if !args.uni_only {
        let scan = run_bidirectional(&matrix, &phenotypes, &layout)?;
        for (focal, direction, table) in [
            ("0focal", "forward", &scan.focal0_forward),
            ("0focal", "reverse", &scan.focal0_reverse),
            ("2focal", "forward", &scan.focal2_forward),
            ("2focal", "reverse", &scan.focal2_reverse),
        ] {
            let path = bidirectional_path(&args.out_prefix, focal, direction);
            write_table(&path, table)?;
            info!("Wrote {} rows to {}", table.len(), path.display());
        }
    }

    for (marker, focal) in uni_scans {
        let rows = run_unidirectional(&matrix, &phenotypes, &layout, marker, focal)?;
        let path = unidirectional_path(&args.out_prefix, marker, focal);
        write_table(&path, &rows)?;
        info!("Wrote {} rows to {}", rows.len(), path.display());
    }

    Ok(())
}

/// Output name for one bidirectional table; downstream tooling parses
/// the focal/direction tokens to interpret row order.
fn bidirectional_path(prefix: &str, focal: &str, direction: &str) -> PathBuf {
    PathBuf::from(format!(
        "{}_{}_{}_scan_bd_cells.csv",
        prefix, focal, direction
    ))
}

/// Output name for one unidirectional table. The FR/ZI token encodes
/// the focal convention (FR = 0-focal, ZI = 2-focal).
fn unidirectional_path(prefix: &str, marker: UniMarker, focal: FocalAllele) -> PathBuf {
    let marker = match marker {
        UniMarker::Mito => "mito",
        UniMarker::Y => "y",
    };
    let origin = match focal {
        FocalAllele::Zero => "FR",
        FocalAllele::Two => "ZI",
    };
    PathBuf::from(format!(
        "{}_{}_uni_{}_scan_bd_cells.csv",
        prefix, marker, origin
    ))
}

/// Write one scan table as CSV with the bd1..bd8 header, one row per
/// enumerated pair.
fn write_table(path: &Path, rows: &[ContingencyRow]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    writer.write_record(["bd1", "bd2", "bd3", "bd4", "bd5", "bd6", "bd7", "bd8"])?;
    for row in rows {
        writer.write_record(row.cells.iter().map(|c| c.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}
