//! bdscan-geno: Input parsing and data model for bdscan
//!
//! Provides the window-genotype matrix loader, sterile/fertile phenotype
//! ID lists, and the chromosome window layout configuration.

pub mod matrix;
pub mod phenotype;
pub mod windows;

pub use matrix::{GenotypeMatrix, MISSING};
pub use phenotype::{Phenotype, PhenotypeSets};
pub use windows::{Block, WindowLayout};
