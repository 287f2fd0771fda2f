//! Scan orchestration: window pair enumeration across chromosome blocks.
//!
//! Enumerates the pair list for each scan variant up front, then tabulates
//! the pairs in parallel and collects the rows in enumeration order. Row
//! order is load-bearing: the null-distribution reducer slices the output
//! tables by index range.

use anyhow::{ensure, Result};
use rayon::prelude::*;
use tracing::info;

use bdscan_geno::{Block, GenotypeMatrix, PhenotypeSets, WindowLayout};

use crate::tabulate::{tabulate_pair, ContingencyRow, FocalAllele};

/// Pair order of a bidirectional scan table.
///
/// Forward enumerates block pairs as (X,2), (X,3), (2,3); reverse swaps
/// each pair's roles to (2,X), (3,X), (3,2). Swapping window 1 and
/// window 2 moves counts between the bd1..bd4 and bd5..bd8 cell groups,
/// so the two directions are not redundant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Which uniparental marker window a unidirectional scan pairs against
/// the chromosome blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniMarker {
    Mito,
    Y,
}

/// Unidirectional scan subsets.
///
/// The FR/ZI pairings reflect the parental-origin conventions of the
/// cross: FR corresponds to the 0-focal convention and ZI to 2-focal,
/// and the two "opposite" subsets run the mito and Y markers under
/// opposite conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniSet {
    /// Mito under 0-focal, Y under 2-focal.
    FrMitoZiY,
    /// All four marker/focal combinations.
    All,
    /// Mito under 2-focal, Y under 0-focal.
    ZiMitoFrY,
}

impl UniSet {
    /// The (marker, focal) combinations this subset runs, in order.
    pub fn scans(self) -> Vec<(UniMarker, FocalAllele)> {
        match self {
            UniSet::FrMitoZiY => vec![
                (UniMarker::Mito, FocalAllele::Zero),
                (UniMarker::Y, FocalAllele::Two),
            ],
            UniSet::All => vec![
                (UniMarker::Mito, FocalAllele::Zero),
                (UniMarker::Mito, FocalAllele::Two),
                (UniMarker::Y, FocalAllele::Zero),
                (UniMarker::Y, FocalAllele::Two),
            ],
            UniSet::ZiMitoFrY => vec![
                (UniMarker::Mito, FocalAllele::Two),
                (UniMarker::Y, FocalAllele::Zero),
            ],
        }
    }
}

/// The four result tables of a full bidirectional scan.
#[derive(Debug, Clone)]
pub struct BidirectionalScan {
    pub focal0_forward: Vec<ContingencyRow>,
    pub focal0_reverse: Vec<ContingencyRow>,
    pub focal2_forward: Vec<ContingencyRow>,
    pub focal2_reverse: Vec<ContingencyRow>,
}

fn block_pairs(direction: Direction) -> [(Block, Block); 3] {
    match direction {
        Direction::Forward => [
            (Block::X, Block::Chr2),
            (Block::X, Block::Chr3),
            (Block::Chr2, Block::Chr3),
        ],
        Direction::Reverse => [
            (Block::Chr2, Block::X),
            (Block::Chr3, Block::X),
            (Block::Chr3, Block::Chr2),
        ],
    }
}

/// Enumerate the (w1, w2) pairs of a bidirectional scan in table order:
/// block pairs in direction order, outer window fixed, inner varying.
pub fn enumerate_bidirectional(layout: &WindowLayout, direction: Direction) -> Vec<(usize, usize)> {
    let mut pairs = Vec::with_capacity(layout.bidirectional_rows());
    for (b1, b2) in block_pairs(direction) {
        for w1 in layout.range(b1) {
            for w2 in layout.range(b2) {
                pairs.push((w1, w2));
            }
        }
    }
    pairs
}

/// Enumerate the pairs of a unidirectional scan: the marker window
/// against every window of X, 2, 3 in block order.
pub fn enumerate_unidirectional(layout: &WindowLayout, marker: UniMarker) -> Vec<(usize, usize)> {
    let w1 = match marker {
        UniMarker::Mito => layout.mito_window,
        UniMarker::Y => layout.y_window,
    };
    Block::ALL
        .iter()
        .flat_map(|&block| layout.range(block).map(move |w2| (w1, w2)))
        .collect()
}

/// Tabulate a pair list in parallel, preserving enumeration order.
pub fn tabulate_pairs(
    matrix: &GenotypeMatrix,
    phenotypes: &PhenotypeSets,
    pairs: &[(usize, usize)],
    focal: FocalAllele,
) -> Result<Vec<ContingencyRow>> {
    pairs
        .par_iter()
        .map(|&(w1, w2)| tabulate_pair(matrix, phenotypes, w1, w2, focal))
        .collect()
}

/// Run the full bidirectional scan: both focal conventions in both
/// directions, four tables of equal length.
pub fn run_bidirectional(
    matrix: &GenotypeMatrix,
    phenotypes: &PhenotypeSets,
    layout: &WindowLayout,
) -> Result<BidirectionalScan> {
    let forward = enumerate_bidirectional(layout, Direction::Forward);
    let reverse = enumerate_bidirectional(layout, Direction::Reverse);
    info!(
        "Bidirectional scan: {} window pairs per table, {} samples",
        forward.len(),
        matrix.n_samples()
    );

    info!("Tabulating 0-focal forward...");
    let focal0_forward = tabulate_pairs(matrix, phenotypes, &forward, FocalAllele::Zero)?;
    info!("Tabulating 0-focal reverse...");
    let focal0_reverse = tabulate_pairs(matrix, phenotypes, &reverse, FocalAllele::Zero)?;
    info!("Tabulating 2-focal forward...");
    let focal2_forward = tabulate_pairs(matrix, phenotypes, &forward, FocalAllele::Two)?;
    info!("Tabulating 2-focal reverse...");
    let focal2_reverse = tabulate_pairs(matrix, phenotypes, &reverse, FocalAllele::Two)?;

    let scan = BidirectionalScan {
        focal0_forward,
        focal0_reverse,
        focal2_forward,
        focal2_reverse,
    };
    scan.check_row_counts(layout.bidirectional_rows())?;
    Ok(scan)
}

/// Run one unidirectional scan (marker vs all blocks) for one focal
/// convention.
pub fn run_unidirectional(
    matrix: &GenotypeMatrix,
    phenotypes: &PhenotypeSets,
    layout: &WindowLayout,
    marker: UniMarker,
    focal: FocalAllele,
) -> Result<Vec<ContingencyRow>> {
    let pairs = enumerate_unidirectional(layout, marker);
    info!(
        "Unidirectional scan: {:?} marker, {:?} focal, {} window pairs",
        marker,
        focal,
        pairs.len()
    );
    let rows = tabulate_pairs(matrix, phenotypes, &pairs, focal)?;
    ensure!(
        rows.len() == layout.unidirectional_rows(),
        "Unidirectional table has {} rows, expected {}; pair enumeration is broken",
        rows.len(),
        layout.unidirectional_rows()
    );
    Ok(rows)
}

impl BidirectionalScan {
    /// Post-condition: all four tables have one row per enumerated pair.
    /// A mismatch is a programming error, not bad input.
    fn check_row_counts(&self, expected: usize) -> Result<()> {
        for (name, table) in [
            ("0-focal forward", &self.focal0_forward),
            ("0-focal reverse", &self.focal0_reverse),
            ("2-focal forward", &self.focal2_forward),
            ("2-focal reverse", &self.focal2_reverse),
        ] {
            ensure!(
                table.len() == expected,
                "{} table has {} rows, expected {}; pair enumeration is broken",
                name,
                table.len(),
                expected
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdscan_geno::PhenotypeSets;

    fn layout() -> WindowLayout {
        WindowLayout::new(2, 4, 6, 6, 7).unwrap()
    }

    fn phenotypes() -> PhenotypeSets {
        PhenotypeSets::new(vec!["S1".into()], vec!["F1".into()]).unwrap()
    }

    /// 8 windows x 2 samples, all calls present.
    fn matrix() -> GenotypeMatrix {
        let mut contents = String::from("S1,F1\n");
        for w in 0..8 {
            contents.push_str(if w % 2 == 0 { "0,2\n" } else { "2,0\n" });
        }
        GenotypeMatrix::parse(&contents, 0).unwrap()
    }

    #[test]
    fn test_forward_enumeration_order() {
        let pairs = enumerate_bidirectional(&layout(), Direction::Forward);
        // |X|=2, |2|=2, |3|=2: 4 pairs per block pair, 12 total.
        assert_eq!(pairs.len(), 12);
        assert_eq!(pairs[0], (0, 2)); // X x 2 first
        assert_eq!(pairs[1], (0, 3));
        assert_eq!(pairs[2], (1, 2));
        assert_eq!(pairs[4], (0, 4)); // then X x 3
        assert_eq!(pairs[8], (2, 4)); // then 2 x 3
        assert_eq!(pairs[11], (3, 5));
    }

    #[test]
    fn test_reverse_enumeration_order() {
        let pairs = enumerate_bidirectional(&layout(), Direction::Reverse);
        assert_eq!(pairs.len(), 12);
        assert_eq!(pairs[0], (2, 0)); // 2 x X first
        assert_eq!(pairs[4], (4, 0)); // then 3 x X
        assert_eq!(pairs[8], (4, 2)); // then 3 x 2
    }

    #[test]
    fn test_unidirectional_enumeration() {
        let pairs = enumerate_unidirectional(&layout(), UniMarker::Mito);
        assert_eq!(pairs.len(), 6);
        assert!(pairs.iter().all(|&(w1, _)| w1 == 6));
        assert_eq!(pairs[0], (6, 0));
        assert_eq!(pairs[5], (6, 5));

        let y_pairs = enumerate_unidirectional(&layout(), UniMarker::Y);
        assert!(y_pairs.iter().all(|&(w1, _)| w1 == 7));
    }

    #[test]
    fn test_split_index_matches_enumeration() {
        let l = layout();
        let pairs = enumerate_bidirectional(&l, Direction::Forward);
        let split = l.cross_block_pairs();
        // Every pair before the split involves an X window as w1.
        assert!(pairs[..split].iter().all(|&(w1, _)| w1 < l.x_end));
        assert!(pairs[split..].iter().all(|&(w1, _)| w1 >= l.x_end));
    }

    #[test]
    fn test_bidirectional_tables_equal_length() {
        let scan = run_bidirectional(&matrix(), &phenotypes(), &layout()).unwrap();
        assert_eq!(scan.focal0_forward.len(), 12);
        assert_eq!(scan.focal0_reverse.len(), 12);
        assert_eq!(scan.focal2_forward.len(), 12);
        assert_eq!(scan.focal2_reverse.len(), 12);
    }

    #[test]
    fn test_forward_reverse_swap_permutation() {
        // With calls restricted to {0, 2}, swapping the windows of a pair
        // exchanges bd1<->bd7 and bd2<->bd8 and fixes the rest.
        let m = matrix();
        let p = phenotypes();
        let l = layout();
        let forward = enumerate_bidirectional(&l, Direction::Forward);
        let reverse = enumerate_bidirectional(&l, Direction::Reverse);
        let fwd_rows = tabulate_pairs(&m, &p, &forward, FocalAllele::Zero).unwrap();
        let rev_rows = tabulate_pairs(&m, &p, &reverse, FocalAllele::Zero).unwrap();

        // Forward block pair k maps to reverse block pair k with the
        // nested loops swapped; locate each swapped pair explicitly.
        for (i, &(w1, w2)) in forward.iter().enumerate() {
            let j = reverse.iter().position(|&pr| pr == (w2, w1)).unwrap();
            let f = fwd_rows[i].cells;
            let r = rev_rows[j].cells;
            assert_eq!(r[0], f[6], "bd1 <-> bd7 at pair {:?}", (w1, w2));
            assert_eq!(r[1], f[7]);
            assert_eq!(r[2], f[2]);
            assert_eq!(r[3], f[3]);
            assert_eq!(r[4], f[4]);
            assert_eq!(r[5], f[5]);
            assert_eq!(r[6], f[0]);
            assert_eq!(r[7], f[1]);
        }
    }

    #[test]
    fn test_uni_set_scans() {
        assert_eq!(
            UniSet::FrMitoZiY.scans(),
            vec![(UniMarker::Mito, FocalAllele::Zero), (UniMarker::Y, FocalAllele::Two)]
        );
        assert_eq!(UniSet::All.scans().len(), 4);
        assert_eq!(
            UniSet::ZiMitoFrY.scans(),
            vec![(UniMarker::Mito, FocalAllele::Two), (UniMarker::Y, FocalAllele::Zero)]
        );
    }

    #[test]
    fn test_run_unidirectional_row_count() {
        let rows =
            run_unidirectional(&matrix(), &phenotypes(), &layout(), UniMarker::Y, FocalAllele::Zero)
                .unwrap();
        assert_eq!(rows.len(), 6);
        // Both samples have calls everywhere, so every row counts both.
        assert!(rows.iter().all(|r| r.total() == 2));
    }
}
