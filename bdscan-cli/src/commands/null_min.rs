//! Step 3: Per-range null minima.
//!
//! bdscan null-min --input run1_0focal_forward_pvalues.csv
//!
//! The split between X-vs-autosome and 2-vs-3 rows is derived from the
//! same block boundaries the scan ran with; pass them again here (or
//! override the split index directly) when not using the default binning.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use bdscan_core::reduce::null_minima;
use bdscan_geno::WindowLayout;

#[derive(Args)]
pub struct NullMinArgs {
    /// P-value column file from the pvalues step
    #[arg(long)]
    input: String,

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

    /// Override the derived cross-block/within-autosome split index
    #[arg(long)]
    split: Option<usize>,
}

pub fn run(args: NullMinArgs) -> Result<()> {
    info!("=== bdscan Step 3: Null minima ===");

    let pvalues = read_pvalue_column(Path::new(&args.input))?;
    info!("Loaded {} p-values from {}", pvalues.len(), args.input);

    let split = match args.split {
        Some(split) => split,
        None => {
            let layout = WindowLayout::new(
                args.x_end,
                args.chr2_end,
                args.chr3_end,
                args.mito_window,
                args.y_window,
            )?;
            layout.cross_block_pairs()
        }
    };
    info!("Cross-block/within-autosome split at row {}", split);

    let minima = null_minima(&pvalues, split)?;
    info!(
        "Lowest X-A null p-value: {}",
        format_minimum(minima.cross_block)
    );
    info!(
        "Lowest A-A null p-value: {}",
        format_minimum(minima.within_autosome)
    );

    let x_out = format!("{}_x_null_pvalue.txt", args.input);
    let a_out = format!("{}_a_null_pvalue.txt", args.input);
    write_minimum(Path::new(&x_out), minima.cross_block)?;
    write_minimum(Path::new(&a_out), minima.within_autosome)?;
    info!("Results written to {} and {}", x_out, a_out);

    Ok(())
}

/// Read a one-column p-value file with a header row.
fn read_pvalue_column(path: &Path) -> Result<Vec<f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open p-value file: {}", path.display()))?;

    let mut pvalues = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read row {}", i + 1))?;
        let field = record
            .get(0)
            .ok_or_else(|| anyhow::anyhow!("Empty row {}", i + 1))?;
        let p: f64 = field
            .trim()
            .parse()
            .with_context(|| format!("Invalid p-value '{}' in row {}", field, i + 1))?;
        pvalues.push(p);
    }
    Ok(pvalues)
}

fn format_minimum(minimum: Option<f64>) -> String {
    match minimum {
        Some(p) => p.to_string(),
        None => "NA".to_string(),
    }
}

fn write_minimum(path: &Path, minimum: Option<f64>) -> Result<()> {
    std::fs::write(path, format!("{}\n", format_minimum(minimum)))
        .with_context(|| format!("Failed to write output file: {}", path.display()))
}
