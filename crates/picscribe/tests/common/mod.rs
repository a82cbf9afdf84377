//! Test harness for isolated pipeline runs.
//!
//! `TestHarness` provides a temporary asset tree and a file-backed
//! catalog location, so tests can exercise full runs and simulate
//! process restarts by reopening the store.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use picscribe::error::ProviderError;
use picscribe::provider::{CaptionProvider, ImagePayload};
use picscribe::{Config, Database};

pub struct TestHarness {
    temp_dir: TempDir,
    /// Root of the temporary asset tree.
    pub asset_root: PathBuf,
    /// Location of the file-backed catalog.
    pub store_path: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        picscribe::logging::init();

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let asset_root = temp_dir.path().join("assets");
        let store_path = temp_dir.path().join("catalog.db");
        std::fs::create_dir_all(&asset_root).expect("Failed to create asset root");

        Self {
            temp_dir,
            asset_root,
            store_path,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes an asset file under the asset root, creating parents.
    /// Returns the absolute path.
    pub fn write_asset(&self, rel: &str) -> PathBuf {
        let path = self.asset_root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).expect("Failed to create asset dirs");
        std::fs::write(&path, b"image bytes").expect("Failed to write asset");
        path
    }

    /// Config pointing at this harness's tree and store.
    pub fn config(&self) -> Config {
        Config {
            asset_root: self.asset_root.clone(),
            store_location: self.store_path.clone(),
            caption_model: "test-model".to_string(),
            progress_batch_size: 10,
        }
    }

    /// Opens the file-backed catalog, as a fresh process would.
    pub fn open_db(&self) -> Database {
        Database::open(&self.store_path).expect("Failed to open catalog")
    }
}

/// Provider that fails for prompts naming any of the given assets and
/// captions everything else.
pub struct FlakyProvider {
    pub fail_on_files: Vec<String>,
}

impl CaptionProvider for FlakyProvider {
    fn model(&self) -> &str {
        "flaky"
    }

    fn caption(&self, _image: &ImagePayload, prompt: &str) -> Result<String, ProviderError> {
        for file in &self.fail_on_files {
            if prompt.contains(&format!("\"{}\"", file)) {
                return Err(ProviderError::Http("connection reset".to_string()));
            }
        }
        Ok("a simple flat shape on a plain background".to_string())
    }
}
