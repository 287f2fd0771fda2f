//! End-to-end pipeline tests over file-based fixtures.
//!
//! Exercises the full forward pass: parse matrix and phenotype lists,
//! run the scans, evaluate the Breslow-Day column, reduce to null minima.

use std::io::Write;
use std::path::PathBuf;

use bdscan_core::breslow_day::{evaluate_rows, BdConfig, NOT_COMPUTED};
use bdscan_core::reduce::null_minima;
use bdscan_core::scan::{run_bidirectional, run_unidirectional, UniMarker};
use bdscan_core::tabulate::FocalAllele;
use bdscan_geno::{GenotypeMatrix, PhenotypeSets, WindowLayout};

/// 8 windows (X: 0-1, chr2: 2-3, chr3: 4-5, mito: 6, Y: 7), 6 samples
/// with a sprinkling of missing and heterozygous calls.
fn write_fixtures(dir: &std::path::Path) -> (PathBuf, PathBuf, PathBuf) {
    let geno = dir.join("geno.csv");
    let mut f = std::fs::File::create(&geno).unwrap();
    writeln!(f, "chrom,start,end,S1,S2,S3,F1,F2,F3").unwrap();
    writeln!(f, "X,0,50,0,0,2,2,0,2").unwrap();
    writeln!(f, "X,50,100,0,2,2,0,2,0").unwrap();
    writeln!(f, "2,0,50,2,0,0,2,2,0").unwrap();
    writeln!(f, "2,50,100,0,0,-999,2,2,2").unwrap();
    writeln!(f, "3,0,50,2,2,0,0,1,2").unwrap();
    writeln!(f, "3,50,100,0,2,0,2,0,2").unwrap();
    writeln!(f, "mito,0,1,0,0,2,2,2,0").unwrap();
    writeln!(f, "Y,0,1,2,0,2,0,0,2").unwrap();

    let sterile = dir.join("sterile.txt");
    std::fs::write(&sterile, "S1\nS2\nS3\n").unwrap();
    let fertile = dir.join("fertile.txt");
    std::fs::write(&fertile, "F1\nF2\nF3\n").unwrap();

    (geno, sterile, fertile)
}

fn layout() -> WindowLayout {
    WindowLayout::new(2, 4, 6, 6, 7).unwrap()
}

#[test]
fn test_full_bidirectional_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let (geno, sterile, fertile) = write_fixtures(dir.path());

    let matrix = GenotypeMatrix::from_path(&geno, 3).unwrap();
    let layout = layout();
    layout.validate_against(matrix.n_windows()).unwrap();
    let phenotypes = PhenotypeSets::from_files(&sterile, &fertile).unwrap();

    let scan = run_bidirectional(&matrix, &phenotypes, &layout).unwrap();
    assert_eq!(scan.focal0_forward.len(), layout.bidirectional_rows());

    // Row 3 of chr2 has one missing call; every pair touching it counts
    // 5 samples, all others count 6.
    for row in &scan.focal0_forward {
        assert!(row.total() == 5 || row.total() == 6);
    }

    let pvalues = evaluate_rows(&scan.focal0_forward, &BdConfig::default());
    assert_eq!(pvalues.len(), scan.focal0_forward.len());
    for &p in &pvalues {
        assert!(p == NOT_COMPUTED || (0.0..=1.0).contains(&p));
    }

    let minima = null_minima(&pvalues, layout.cross_block_pairs()).unwrap();
    for minimum in [minima.cross_block, minima.within_autosome].into_iter().flatten() {
        assert!((0.0..=1.0).contains(&minimum));
    }
}

#[test]
fn test_unidirectional_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let (geno, sterile, fertile) = write_fixtures(dir.path());

    let matrix = GenotypeMatrix::from_path(&geno, 3).unwrap();
    let phenotypes = PhenotypeSets::from_files(&sterile, &fertile).unwrap();
    let layout = layout();

    for marker in [UniMarker::Mito, UniMarker::Y] {
        for focal in [FocalAllele::Zero, FocalAllele::Two] {
            let rows = run_unidirectional(&matrix, &phenotypes, &layout, marker, focal).unwrap();
            assert_eq!(rows.len(), layout.unidirectional_rows());
        }
    }
}

#[test]
fn test_out_of_sync_phenotype_lists_abort() {
    let dir = tempfile::tempdir().unwrap();
    let (geno, sterile, _) = write_fixtures(dir.path());
    // Fertile list missing F3: the scan must fail, not silently drop it.
    let fertile = dir.path().join("fertile_short.txt");
    std::fs::write(&fertile, "F1\nF2\n").unwrap();

    let matrix = GenotypeMatrix::from_path(&geno, 3).unwrap();
    let phenotypes = PhenotypeSets::from_files(&sterile, &fertile).unwrap();

    let err = run_bidirectional(&matrix, &phenotypes, &layout()).unwrap_err();
    assert!(err.to_string().contains("'F3'"), "{}", err);
}
