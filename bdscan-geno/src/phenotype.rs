//! Sterile/fertile phenotype ID lists.
//!
//! Reads two newline-delimited sample ID files and builds the lookup used
//! to classify matrix columns during tabulation. Blank lines (common when
//! the files end in a newline) are stripped before set construction.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

/// Phenotype class of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phenotype {
    Sterile,
    Fertile,
}

/// The two disjoint phenotype ID sets.
#[derive(Debug, Clone)]
pub struct PhenotypeSets {
    sterile: HashSet<String>,
    fertile: HashSet<String>,
}

impl PhenotypeSets {
    /// Build the sets from ID lists, rejecting IDs present in both.
    pub fn new(sterile_ids: Vec<String>, fertile_ids: Vec<String>) -> Result<Self> {
        let sterile: HashSet<String> = sterile_ids.into_iter().collect();
        let fertile: HashSet<String> = fertile_ids.into_iter().collect();
        if let Some(id) = sterile.intersection(&fertile).next() {
            bail!(
                "Sample '{}' appears in both the sterile and fertile lists",
                id
            );
        }
        Ok(PhenotypeSets { sterile, fertile })
    }

    /// Load the sets from two newline-delimited ID files.
    pub fn from_files(sterile_path: &Path, fertile_path: &Path) -> Result<Self> {
        let sterile = read_id_list(sterile_path)?;
        let fertile = read_id_list(fertile_path)?;
        let sets = Self::new(sterile, fertile)?;
        info!(
            "Loaded phenotype lists: {} sterile, {} fertile",
            sets.n_sterile(),
            sets.n_fertile()
        );
        Ok(sets)
    }

    /// Classify a sample ID, or `None` if it is in neither set.
    pub fn classify(&self, id: &str) -> Option<Phenotype> {
        if self.sterile.contains(id) {
            Some(Phenotype::Sterile)
        } else if self.fertile.contains(id) {
            Some(Phenotype::Fertile)
        } else {
            None
        }
    }

    pub fn n_sterile(&self) -> usize {
        self.sterile.len()
    }

    pub fn n_fertile(&self) -> usize {
        self.fertile.len()
    }
}

/// Read a newline-delimited ID list, skipping blank lines.
fn read_id_list(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read ID list: {}", path.display()))?;
    Ok(contents
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sets(sterile: &[&str], fertile: &[&str]) -> PhenotypeSets {
        PhenotypeSets::new(
            sterile.iter().map(|s| s.to_string()).collect(),
            fertile.iter().map(|s| s.to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_classify() {
        let p = sets(&["S1", "S2"], &["F1"]);
        assert_eq!(p.classify("S1"), Some(Phenotype::Sterile));
        assert_eq!(p.classify("F1"), Some(Phenotype::Fertile));
        assert_eq!(p.classify("X9"), None);
    }

    #[test]
    fn test_overlapping_sets_rejected() {
        let err = PhenotypeSets::new(vec!["A".into(), "B".into()], vec!["B".into()]).unwrap_err();
        assert!(err.to_string().contains("'B'"), "{}", err);
    }

    #[test]
    fn test_from_files_strips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let s_path = dir.path().join("sterile.txt");
        let f_path = dir.path().join("fertile.txt");
        let mut s = std::fs::File::create(&s_path).unwrap();
        write!(s, "S1\nS2\n\n").unwrap();
        let mut f = std::fs::File::create(&f_path).unwrap();
        write!(f, "F1\n\nF2\n").unwrap();

        let p = PhenotypeSets::from_files(&s_path, &f_path).unwrap();
        assert_eq!(p.n_sterile(), 2);
        assert_eq!(p.n_fertile(), 2);
    }
}
