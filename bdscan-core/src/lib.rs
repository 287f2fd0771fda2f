//! bdscan-core: Statistical engine for the Breslow-Day QTL scan
//!
//! Implements contingency tabulation over window pairs, scan orchestration
//! across chromosome blocks, the Breslow-Day homogeneity test, and the
//! null-distribution minimum reduction.

pub mod breslow_day;
pub mod reduce;
pub mod scan;
pub mod tabulate;
