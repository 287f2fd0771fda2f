//! Window-genotype matrix parser.
//!
//! Reads a delimited text file with one header row of sample IDs and one
//! row per genomic window. Cell values are integer genotype calls: 0 and 2
//! for the two parental-origin classes, 1 for heterozygous, and -999 for
//! no call. The leading metadata columns produced by the upstream binning
//! pipeline (window coordinates etc.) are dropped on load.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

/// Reserved cell value denoting a window with no genotype call.
pub const MISSING: i32 = -999;

/// Immutable matrix of genotype calls: rows = windows, columns = samples.
#[derive(Debug, Clone)]
pub struct GenotypeMatrix {
    sample_ids: Vec<String>,
    n_windows: usize,
    /// Row-major calls, length n_windows * n_samples.
    calls: Vec<i32>,
}

impl GenotypeMatrix {
    /// Load a matrix from a delimited text file.
    ///
    /// The delimiter is auto-detected (tab or comma). `drop_cols` leading
    /// fields are stripped from the header and from every data row.
    pub fn from_path(path: &Path, drop_cols: usize) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read genotype matrix: {}", path.display()))?;
        let matrix = Self::parse(&contents, drop_cols)
            .with_context(|| format!("Failed to parse genotype matrix: {}", path.display()))?;
        info!(
            "Loaded genotype matrix: {} windows x {} samples",
            matrix.n_windows(),
            matrix.n_samples()
        );
        Ok(matrix)
    }

    /// Parse matrix contents. See [`GenotypeMatrix::from_path`].
    pub fn parse(contents: &str, drop_cols: usize) -> Result<Self> {
        let mut lines = contents.lines();
        let header_line = lines
            .next()
            .ok_or_else(|| anyhow::anyhow!("Empty genotype matrix file"))?;

        // Detect delimiter
        let delim = if header_line.contains('\t') { '\t' } else { ',' };

        let header: Vec<&str> = header_line.split(delim).map(|s| s.trim()).collect();
        if header.len() <= drop_cols {
            bail!(
                "Header has {} fields but {} leading metadata columns were requested",
                header.len(),
                drop_cols
            );
        }
        let sample_ids: Vec<String> = header[drop_cols..].iter().map(|s| s.to_string()).collect();
        let n_samples = sample_ids.len();

        let mut calls = Vec::new();
        let mut n_windows = 0usize;
        for (line_num, line) in lines.enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(delim).map(|s| s.trim()).collect();
            if fields.len() != drop_cols + n_samples {
                bail!(
                    "Line {} has {} fields, expected {}",
                    line_num + 2,
                    fields.len(),
                    drop_cols + n_samples
                );
            }
            for field in &fields[drop_cols..] {
                let call: i32 = field.parse().with_context(|| {
                    format!("Invalid genotype call '{}' on line {}", field, line_num + 2)
                })?;
                calls.push(call);
            }
            n_windows += 1;
        }

        if n_windows == 0 {
            bail!("Genotype matrix contains no window rows");
        }

        Ok(GenotypeMatrix {
            sample_ids,
            n_windows,
            calls,
        })
    }

    pub fn n_windows(&self) -> usize {
        self.n_windows
    }

    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Genotype call for `sample` at `window`.
    pub fn call(&self, window: usize, sample: usize) -> i32 {
        self.calls[window * self.sample_ids.len() + sample]
    }
}
