//! Step 2: Breslow-Day p-values.
//!
//! bdscan pvalues --input run1_0focal_forward_scan_bd_cells.csv --output run1_0focal_forward_pvalues.csv

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use bdscan_core::breslow_day::{evaluate_rows, BdConfig, NOT_COMPUTED};
use bdscan_core::tabulate::ContingencyRow;

#[derive(Args)]
pub struct PvaluesArgs {
    /// BD cell-count CSV from the scan step
    #[arg(long)]
    input: String,

    /// Output file path (one p-value per input row, in order)
    #[arg(long)]
    output: String,

    /// Evaluate every row, ignoring the max-proportion pre-filter
    /// (diagnostics only; changes which rows receive real p-values)
    #[arg(long, default_value = "false")]
    no_skip_filter: bool,
}

pub fn run(args: PvaluesArgs) -> Result<()> {
    info!("=== bdscan Step 2: Breslow-Day p-values ===");

    let rows = read_cell_table(Path::new(&args.input))?;
    info!("Loaded {} contingency rows from {}", rows.len(), args.input);

    let config = BdConfig {
        skip_filter: !args.no_skip_filter,
    };
    let pvalues = evaluate_rows(&rows, &config);

    let n_skipped = pvalues.iter().filter(|&&p| p == NOT_COMPUTED).count();
    info!(
        "Computed {} p-values ({} rows excluded by the pre-filter)",
        pvalues.len() - n_skipped,
        n_skipped
    );

    write_pvalue_column(Path::new(&args.output), &pvalues)?;
    info!("Results written to {}", args.output);

    Ok(())
}

/// Read a bd-cells CSV (header bd1..bd8, one row per pair).
pub fn read_cell_table(path: &Path) -> Result<Vec<ContingencyRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open cell-count file: {}", path.display()))?;

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read row {}", i + 1))?;
        if record.len() != 8 {
            bail!(
                "Row {} has {} fields, expected 8 (bd1..bd8)",
                i + 1,
                record.len()
            );
        }
        let mut cells = [0u32; 8];
        for (j, field) in record.iter().enumerate() {
            cells[j] = field
                .trim()
                .parse()
                .with_context(|| format!("Invalid cell count '{}' in row {}", field, i + 1))?;
        }
        rows.push(ContingencyRow::new(cells));
    }
    Ok(rows)
}

/// Write a single-column p-value CSV in input row order.
fn write_pvalue_column(path: &Path, pvalues: &[f64]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    writer.write_record(["pvalue"])?;
    for p in pvalues {
        writer.write_record([p.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}
