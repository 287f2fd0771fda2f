//! Per-pair contingency tabulation.
//!
//! For a pair of windows and a focal genotype convention, classifies every
//! sample into one of eight contingency cells:
//!
//! ```text
//!              window2=focal          window2=non-focal
//!              sterile | fertile      sterile | fertile
//! window1=focal   bd1      bd2           bd5      bd6
//! window1=nonf.   bd3      bd4           bd7      bd8
//! ```
//!
//! A sample with no call at either window is excluded from all eight
//! counts for that pair. A sample in neither phenotype list aborts the
//! scan: the phenotype lists and matrix columns are a caller invariant
//! the tabulator cannot repair.

use anyhow::{bail, Result};

use bdscan_geno::{GenotypeMatrix, Phenotype, PhenotypeSets, MISSING};

/// Which raw genotype value is "focal" at window 1.
///
/// Window 2 always uses the complementary value, reflecting the
/// parental-origin convention of the scan: a 0-focal scan looks for
/// 0-calls at window 1 combined with 2-calls at window 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocalAllele {
    Zero,
    Two,
}

impl FocalAllele {
    pub fn value(self) -> i32 {
        match self {
            FocalAllele::Zero => 0,
            FocalAllele::Two => 2,
        }
    }

    pub fn complement(self) -> FocalAllele {
        match self {
            FocalAllele::Zero => FocalAllele::Two,
            FocalAllele::Two => FocalAllele::Zero,
        }
    }
}

/// Eight contingency cell counts for one window pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContingencyRow {
    /// Cells bd1..bd8 in order.
    pub cells: [u32; 8],
}

impl ContingencyRow {
    pub fn new(cells: [u32; 8]) -> Self {
        ContingencyRow { cells }
    }

    /// Sum of all eight cells. At most the sample count; equal to it
    /// when no sample is missing a call at either window.
    pub fn total(&self) -> u32 {
        self.cells.iter().sum()
    }
}

/// Tabulate one window pair in a single pass over all samples.
pub fn tabulate_pair(
    matrix: &GenotypeMatrix,
    phenotypes: &PhenotypeSets,
    w1: usize,
    w2: usize,
    focal: FocalAllele,
) -> Result<ContingencyRow> {
    let focal_1 = focal.value();
    let focal_2 = focal.complement().value();

    let mut row = ContingencyRow::default();
    for (sample, id) in matrix.sample_ids().iter().enumerate() {
        let call_1 = matrix.call(w1, sample);
        let call_2 = matrix.call(w2, sample);
        if call_1 == MISSING || call_2 == MISSING {
            // No call at either window: excluded from this pair's counts.
            continue;
        }

        let phenotype = match phenotypes.classify(id) {
            Some(p) => p,
            None => bail!(
                "Sample '{}' is in neither the sterile nor the fertile list; \
                 the phenotype lists and genotype matrix columns are out of sync",
                id
            ),
        };

        let w1_focal = call_1 == focal_1;
        let w2_focal = call_2 == focal_2;
        let cell = match (w1_focal, w2_focal, phenotype) {
            (true, true, Phenotype::Sterile) => 0,   // bd1
            (true, true, Phenotype::Fertile) => 1,   // bd2
            (false, true, Phenotype::Sterile) => 2,  // bd3
            (false, true, Phenotype::Fertile) => 3,  // bd4
            (true, false, Phenotype::Sterile) => 4,  // bd5
            (true, false, Phenotype::Fertile) => 5,  // bd6
            (false, false, Phenotype::Sterile) => 6, // bd7
            (false, false, Phenotype::Fertile) => 7, // bd8
        };
        row.cells[cell] += 1;
    }

    Ok(row)
}
