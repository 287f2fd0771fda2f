//! Breslow-Day homogeneity test over tabulated contingency rows.
//!
//! Each row is corrected, pre-filtered on the direction of enrichment in
//! the double-focal stratum, and (when it passes) tested for homogeneity
//! of the window1/phenotype odds ratio across the two window-2 strata.
//!
//! The statistic is the classic (non-Tarone) Breslow-Day form: pooled
//! Mantel-Haenszel odds ratio, per-stratum expected counts under the
//! homogeneity null from the MH quadratic, then sum of squared deviations
//! over the asymptotic variance, chi-squared with 1 degree of freedom.

use rayon::prelude::*;
use statrs::distribution::{ChiSquared, ContinuousCDF};
use tracing::warn;

use crate::tabulate::ContingencyRow;

/// Output slot for a row excluded by the pre-filter or a numerical
/// failure. Deliberately outside [0, 1] so it can never be mistaken for
/// a real p-value; the null reducer filters it before taking minima.
pub const NOT_COMPUTED: f64 = 999.0;

/// Additive continuity correction applied to every cell before testing
/// (Haldane-Anscombe), so zero cells cannot produce divisions by zero.
pub const CONTINUITY_CORRECTION: f64 = 0.5;

/// Evaluator configuration.
#[derive(Debug, Clone, Copy)]
pub struct BdConfig {
    /// Only test rows whose double-focal stratum has the strictly
    /// highest sterile proportion. This reproduces the original scan's
    /// enrichment-direction pre-filter; disable for diagnostics only.
    pub skip_filter: bool,
}

impl Default for BdConfig {
    fn default() -> Self {
        BdConfig { skip_filter: true }
    }
}

/// Evaluate one contingency row to a p-value or [`NOT_COMPUTED`].
pub fn evaluate_row(row: &ContingencyRow, config: &BdConfig) -> f64 {
    let c: Vec<f64> = row
        .cells
        .iter()
        .map(|&x| x as f64 + CONTINUITY_CORRECTION)
        .collect();
    let (bd1, bd2, bd3, bd4, bd5, bd6, bd7, bd8) =
        (c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]);

    // Sterile proportion within each (window1 x window2) stratum. These
    // are not odds ratios; they only rank the strata for the pre-filter.
    let p1 = bd1 / (bd1 + bd2);
    let p2 = bd3 / (bd3 + bd4);
    let p3 = bd5 / (bd5 + bd6);
    let p4 = bd7 / (bd7 + bd8);

    // A tie disqualifies: the double-focal stratum must be the strict
    // maximum for the row to be tested.
    if config.skip_filter && !(p1 > p2 && p1 > p3 && p1 > p4) {
        return NOT_COMPUTED;
    }

    // Two strata by window-2 state; within each, a 2x2 of phenotype
    // (rows) by window-1 state (cols): [a, b, c, d] = [sterile-focal,
    // sterile-nonfocal, fertile-focal, fertile-nonfocal].
    let strata = [[bd1, bd3, bd2, bd4], [bd5, bd7, bd6, bd8]];
    match breslow_day_pvalue(&strata) {
        Some(p) => p,
        None => {
            warn!("Breslow-Day statistic not finite for row {:?}", row.cells);
            NOT_COMPUTED
        }
    }
}

/// Evaluate a whole table, one p-value per row in input order.
pub fn evaluate_rows(rows: &[ContingencyRow], config: &BdConfig) -> Vec<f64> {
    rows.par_iter().map(|row| evaluate_row(row, config)).collect()
}

/// Breslow-Day p-value for stratified 2x2 tables given as [a, b, c, d].
///
/// Returns `None` when the statistic cannot be computed (degenerate
/// margins despite the continuity correction).
fn breslow_day_pvalue(strata: &[[f64; 4]; 2]) -> Option<f64> {
    // Mantel-Haenszel pooled odds ratio.
    let mut num = 0.0;
    let mut den = 0.0;
    for &[a, b, c, d] in strata {
        let n = a + b + c + d;
        num += a * d / n;
        den += b * c / n;
    }
    if den <= 0.0 {
        return None;
    }
    let or_mh = num / den;

    let mut stat = 0.0;
    for &[a, b, c, d] in strata {
        let n = a + b + c + d;
        let row1 = a + b;
        let col1 = a + c;
        let a_exp = expected_cell(or_mh, row1, col1, n)?;
        let b_exp = row1 - a_exp;
        let c_exp = col1 - a_exp;
        let d_exp = n - row1 - col1 + a_exp;
        if a_exp <= 0.0 || b_exp <= 0.0 || c_exp <= 0.0 || d_exp <= 0.0 {
            return None;
        }
        let var = 1.0 / (1.0 / a_exp + 1.0 / b_exp + 1.0 / c_exp + 1.0 / d_exp);
        stat += (a - a_exp).powi(2) / var;
    }
    if !stat.is_finite() {
        return None;
    }

    // K strata give K-1 degrees of freedom; two strata here.
    let chi2 = ChiSquared::new(1.0).ok()?;
    Some(1.0 - chi2.cdf(stat))
}

/// Expected top-left cell under odds-ratio homogeneity: the admissible
/// root of or*(row1 - a)*(col1 - a) = a*(n - row1 - col1 + a).
fn expected_cell(or: f64, row1: f64, col1: f64, n: f64) -> Option<f64> {
    let lo = (row1 + col1 - n).max(0.0);
    let hi = row1.min(col1);

    // Quadratic (or - 1)a^2 - (or*(row1 + col1) + n - row1 - col1)a
    //           + or*row1*col1 = 0
    let qa = or - 1.0;
    let qb = -(or * (row1 + col1) + (n - row1 - col1));
    let qc = or * row1 * col1;

    if qa.abs() < 1e-12 {
        // Homogeneous odds ratio of 1: independence expectation.
        return Some((row1 * col1 / n).clamp(lo, hi));
    }

    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    for root in [(-qb + sq) / (2.0 * qa), (-qb - sq) / (2.0 * qa)] {
        if root >= lo - 1e-9 && root <= hi + 1e-9 {
            return Some(root.clamp(lo, hi));
        }
    }
    None
}
