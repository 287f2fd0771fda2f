//! Null-distribution reduction: per-range minimum p-values.
//!
//! A bidirectional p-value column splits into two contiguous ranges,
//! X-vs-autosome comparisons first and 2-vs-3 comparisons second (see
//! [`bdscan_geno::WindowLayout::cross_block_pairs`]). The minimum real
//! p-value of each range serves as the empirical extreme value used as a
//! conservative significance threshold.

use anyhow::{ensure, Result};

use crate::breslow_day::NOT_COMPUTED;

/// Minimum p-value per range; `None` when a range holds no computed
/// p-values at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NullMinima {
    pub cross_block: Option<f64>,
    pub within_autosome: Option<f64>,
}

/// Reduce a p-value column to its two per-range minima.
///
/// The [`NOT_COMPUTED`] sentinel is not a p-value and must never win the
/// minimum; it is filtered out here, along with any non-finite values
/// from per-row computation failures.
pub fn null_minima(pvalues: &[f64], split: usize) -> Result<NullMinima> {
    ensure!(
        split <= pvalues.len(),
        "Split index {} is out of bounds for a column of {} p-values",
        split,
        pvalues.len()
    );
    Ok(NullMinima {
        cross_block: range_min(&pvalues[..split]),
        within_autosome: range_min(&pvalues[split..]),
    })
}

fn range_min(pvalues: &[f64]) -> Option<f64> {
    pvalues
        .iter()
        .copied()
        .filter(|&p| p != NOT_COMPUTED && p.is_finite())
        .fold(None, |acc, p| match acc {
            None => Some(p),
            Some(m) => Some(m.min(p)),
        })
}
