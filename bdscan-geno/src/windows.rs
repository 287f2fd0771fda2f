//! Chromosome window layout configuration.
//!
//! The genotype matrix rows are grouped into three contiguous chromosome
//! blocks (X, 2, 3) followed by two singleton uniparental marker windows
//! (mito, then Y). Block boundaries are a property of the upstream binning
//! and are supplied by the caller, never inferred from the data.

use std::ops::Range;

use anyhow::{bail, Result};

/// One of the three bidirectionally scanned chromosome blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    X,
    Chr2,
    Chr3,
}

impl Block {
    /// All blocks in canonical (matrix row) order.
    pub const ALL: [Block; 3] = [Block::X, Block::Chr2, Block::Chr3];
}

/// Window boundaries for one dataset's binning.
///
/// Boundaries are end-exclusive, zero-indexed row indices.
#[derive(Debug, Clone, Copy)]
pub struct WindowLayout {
    pub x_end: usize,
    pub chr2_end: usize,
    pub chr3_end: usize,
    pub mito_window: usize,
    pub y_window: usize,
}

impl WindowLayout {
    pub fn new(
        x_end: usize,
        chr2_end: usize,
        chr3_end: usize,
        mito_window: usize,
        y_window: usize,
    ) -> Result<Self> {
        if x_end == 0 || chr2_end <= x_end || chr3_end <= chr2_end {
            bail!(
                "Block boundaries must be strictly increasing and nonempty: \
                 x_end={}, chr2_end={}, chr3_end={}",
                x_end,
                chr2_end,
                chr3_end
            );
        }
        if mito_window < chr3_end || y_window < chr3_end {
            bail!(
                "Uniparental marker windows must follow the chromosome blocks: \
                 mito={}, y={}, chr3_end={}",
                mito_window,
                y_window,
                chr3_end
            );
        }
        if mito_window == y_window {
            bail!("Mito and Y marker windows must be distinct ({})", mito_window);
        }
        Ok(WindowLayout {
            x_end,
            chr2_end,
            chr3_end,
            mito_window,
            y_window,
        })
    }

    /// Check the layout against the number of matrix rows.
    pub fn validate_against(&self, n_windows: usize) -> Result<()> {
        let max_window = self.mito_window.max(self.y_window);
        if max_window >= n_windows {
            bail!(
                "Window layout references row {} but the matrix has only {} windows",
                max_window,
                n_windows
            );
        }
        Ok(())
    }

    /// Row index range of a chromosome block.
    pub fn range(&self, block: Block) -> Range<usize> {
        match block {
            Block::X => 0..self.x_end,
            Block::Chr2 => self.x_end..self.chr2_end,
            Block::Chr3 => self.chr2_end..self.chr3_end,
        }
    }

    pub fn block_len(&self, block: Block) -> usize {
        self.range(block).len()
    }

    /// Number of X-vs-autosome rows in a bidirectional scan table.
    ///
    /// The forward enumeration order is (X,2), (X,3), (2,3), so this is
    /// also the split index separating cross-block comparisons from the
    /// within-autosome (2 vs 3) comparisons. It depends entirely on the
    /// configured block sizes.
    pub fn cross_block_pairs(&self) -> usize {
        self.block_len(Block::X) * (self.block_len(Block::Chr2) + self.block_len(Block::Chr3))
    }

    /// Number of 2-vs-3 rows in a bidirectional scan table.
    pub fn within_autosome_pairs(&self) -> usize {
        self.block_len(Block::Chr2) * self.block_len(Block::Chr3)
    }

    /// Total rows in one bidirectional scan table.
    pub fn bidirectional_rows(&self) -> usize {
        self.cross_block_pairs() + self.within_autosome_pairs()
    }

    /// Total rows in one unidirectional (marker vs all blocks) table.
    pub fn unidirectional_rows(&self) -> usize {
        self.chr3_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> WindowLayout {
        WindowLayout::new(3, 7, 12, 12, 13).unwrap()
    }

    #[test]
    fn test_ranges() {
        let l = layout();
        assert_eq!(l.range(Block::X), 0..3);
        assert_eq!(l.range(Block::Chr2), 3..7);
        assert_eq!(l.range(Block::Chr3), 7..12);
        assert_eq!(l.block_len(Block::Chr3), 5);
    }

    #[test]
    fn test_pair_counts() {
        let l = layout();
        // |X|=3, |2|=4, |3|=5
        assert_eq!(l.cross_block_pairs(), 3 * (4 + 5));
        assert_eq!(l.within_autosome_pairs(), 4 * 5);
        assert_eq!(l.bidirectional_rows(), 27 + 20);
        assert_eq!(l.unidirectional_rows(), 12);
    }

    #[test]
    fn test_default_binning_split() {
        // The 50kb binning this pipeline ships with.
        let l = WindowLayout::new(545, 1524, 2579, 2579, 2580).unwrap();
        assert_eq!(l.cross_block_pairs(), 545 * (979 + 1055));
        assert_eq!(l.bidirectional_rows(), 545 * 2034 + 979 * 1055);
    }

    #[test]
    fn test_invalid_boundaries_rejected() {
        assert!(WindowLayout::new(0, 7, 12, 12, 13).is_err());
        assert!(WindowLayout::new(7, 3, 12, 12, 13).is_err());
        assert!(WindowLayout::new(3, 7, 7, 12, 13).is_err());
        assert!(WindowLayout::new(3, 7, 12, 5, 13).is_err());
        assert!(WindowLayout::new(3, 7, 12, 12, 12).is_err());
    }

    #[test]
    fn test_validate_against_matrix() {
        let l = layout();
        assert!(l.validate_against(14).is_ok());
        assert!(l.validate_against(13).is_err());
    }
}
