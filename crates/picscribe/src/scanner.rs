//! Asset tree scanner.
//!
//! Walks the asset root, filters by recognized image extensions and
//! reconciles every discovered path against the catalog: known paths
//! get their `scanned_when` refreshed, new paths are parsed and
//! inserted. Paths are processed in lexicographic order so repeated
//! runs behave identically, and in bounded batches with one
//! transaction per batch so a crash loses at most one batch.

use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::db::{image_repo, Database};
use crate::error::ScanError;
use crate::path_meta;

/// Extensions recognized as image assets (compared case-insensitively).
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "svg"];

/// Paths reconciled per transaction.
const SCAN_BATCH_SIZE: usize = 250;

/// Outcome of one scan pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    /// Image files found under the asset root.
    pub discovered: usize,
    /// New catalog rows created this pass.
    pub inserted: usize,
    /// Existing rows whose `scanned_when` was refreshed.
    pub refreshed: usize,
    /// Paths rejected for violating the tree layout contract.
    pub layout_errors: usize,
}

pub struct Scanner {
    asset_root: PathBuf,
}

impl Scanner {
    pub fn new<P: AsRef<Path>>(asset_root: P) -> Self {
        Self {
            asset_root: asset_root.as_ref().to_path_buf(),
        }
    }

    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    /// Enumerates image files under the asset root as a sorted,
    /// deterministic sequence (lexicographic on the path string).
    pub fn discover(&self) -> Result<Vec<PathBuf>, ScanError> {
        let mut paths = Vec::new();

        for entry in WalkDir::new(&self.asset_root) {
            let entry = entry.map_err(|e| ScanError::Walk {
                path: self.asset_root.clone(),
                source: e,
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                if IMAGE_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
                {
                    debug!("Found image: {}", path.display());
                    paths.push(path.to_path_buf());
                }
            }
        }

        paths.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));

        info!(
            "Discovered {} images in {}",
            paths.len(),
            self.asset_root.display()
        );
        Ok(paths)
    }

    /// Runs a full scan pass: discover, then reconcile against the
    /// catalog in bounded batches.
    pub fn scan(&self, db: &Database) -> Result<ScanSummary, ScanError> {
        let paths = self.discover()?;

        let mut summary = ScanSummary {
            discovered: paths.len(),
            ..ScanSummary::default()
        };

        for batch in paths.chunks(SCAN_BATCH_SIZE) {
            let (inserted, refreshed, layout_errors) = self.reconcile_batch(db, batch)?;
            summary.inserted += inserted;
            summary.refreshed += refreshed;
            summary.layout_errors += layout_errors;
        }

        info!(
            "Scan complete: {} discovered, {} inserted, {} refreshed, {} layout errors",
            summary.discovered, summary.inserted, summary.refreshed, summary.layout_errors
        );
        Ok(summary)
    }

    /// Reconciles one batch inside a single transaction.
    fn reconcile_batch(
        &self,
        db: &Database,
        batch: &[PathBuf],
    ) -> Result<(usize, usize, usize), ScanError> {
        let now = Utc::now().to_rfc3339();
        let mut inserted = 0;
        let mut refreshed = 0;
        let mut layout_errors = 0;

        db.with_tx(|tx| {
            for path in batch {
                let path_str = path.to_string_lossy();

                if image_repo::touch_scanned(tx, &path_str, &now)? {
                    refreshed += 1;
                    continue;
                }

                // Layout violations are counted and skipped; the scan
                // must never insert a record with partial metadata.
                match path_meta::parse_asset_path(path) {
                    Ok(meta) => {
                        image_repo::insert(tx, &meta, &path_str, &now)?;
                        inserted += 1;
                    }
                    Err(e) => {
                        warn!("Skipping malformed asset path: {}", e);
                        layout_errors += 1;
                    }
                }
            }
            Ok(())
        })?;

        Ok((inserted, refreshed, layout_errors))
    }
}
