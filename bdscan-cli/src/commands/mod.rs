pub mod null_min;
pub mod pvalues;
pub mod scan;
