//! Annotation loop.
//!
//! Drains the pending set one record at a time, in ascending surrogate
//! id order, invoking the caption provider for each. Per-record
//! failures (unreadable file, provider error, empty caption) leave the
//! record pending and are reported through the explicit
//! [`AnnotationOutcome`] variant; only store errors abort the run.

use chrono::Utc;
use log::{info, warn};

use crate::db::{cursor_repo, image_repo, Database};
use crate::db::image_repo::ImageRecord;
use crate::error::AnnotateError;
use crate::path_meta::AssetMeta;
use crate::prompt;
use crate::provider::{CaptionProvider, ImagePayload};

/// Result of one annotation attempt. The loop driver decides
/// continuation from the variant; no control flow by caught errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationOutcome {
    Annotated { model: String, text: String },
    Failed { reason: String },
}

/// Outcome of one annotation phase.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AnnotateSummary {
    /// Records annotated and moved to terminal state this run.
    pub annotated: usize,
    /// Records attempted and left pending for a future run.
    pub failed: usize,
}

pub struct Annotator<'a> {
    db: &'a Database,
    provider: &'a dyn CaptionProvider,
    /// Logging cadence only; never affects selection or transactions.
    progress_batch_size: usize,
}

impl<'a> Annotator<'a> {
    pub fn new(
        db: &'a Database,
        provider: &'a dyn CaptionProvider,
        progress_batch_size: usize,
    ) -> Self {
        Self {
            db,
            provider,
            progress_batch_size: progress_batch_size.max(1),
        }
    }

    /// Drains the pending set as it stands when the run starts. The
    /// run-local watermark guarantees ascending id order and that a
    /// failed record does not block those after it.
    pub fn run(&self) -> Result<AnnotateSummary, AnnotateError> {
        let pending = image_repo::count_pending(self.db)?;
        info!("Annotation phase: {} records pending", pending);

        let mut summary = AnnotateSummary::default();
        let mut last_id = 0;
        let mut attempted = 0usize;

        while let Some(record) = image_repo::next_pending_after(self.db, last_id)? {
            last_id = record.id;

            match self.annotate_one(&record) {
                AnnotationOutcome::Annotated { model, text } => {
                    let now = Utc::now().to_rfc3339();
                    // The annotation write is a single statement; the
                    // cursor follows as a separate durable write and may
                    // lag one record on interruption.
                    image_repo::mark_annotated(self.db, record.id, &model, &text, &now)?;
                    cursor_repo::advance(self.db, &record.image_path, &now)?;
                    summary.annotated += 1;
                }
                AnnotationOutcome::Failed { reason } => {
                    warn!(
                        "Annotation failed for {} (left pending): {}",
                        record.image_path, reason
                    );
                    summary.failed += 1;
                }
            }

            attempted += 1;
            if attempted % self.progress_batch_size == 0 {
                info!(
                    "Progress: {}/{} attempted, {} annotated, {} failed",
                    attempted, pending, summary.annotated, summary.failed
                );
            }
        }

        info!(
            "Annotation phase complete: {} annotated, {} failed",
            summary.annotated, summary.failed
        );
        Ok(summary)
    }

    /// One attempt against the provider. Never touches the store.
    fn annotate_one(&self, record: &ImageRecord) -> AnnotationOutcome {
        let bytes = match std::fs::read(&record.image_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                return AnnotationOutcome::Failed {
                    reason: format!("Failed to read image file: {}", e),
                }
            }
        };

        let mime = mime_guess::from_path(&record.image_path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        let payload = ImagePayload::new(bytes, mime);

        // Prompt is built from discovery-time metadata, never re-parsed
        // from the path.
        let meta = AssetMeta {
            collection: record.collection.clone(),
            kind: record.kind.clone(),
            file: record.file.clone(),
            filename: record.filename.clone(),
        };
        let prompt = prompt::build_prompt(&meta);

        match self.provider.caption(&payload, &prompt) {
            Ok(text) if !text.trim().is_empty() => AnnotationOutcome::Annotated {
                model: self.provider.model().to_string(),
                text,
            },
            Ok(_) => AnnotationOutcome::Failed {
                reason: "Provider returned an empty caption".to_string(),
            },
            Err(e) => AnnotationOutcome::Failed {
                reason: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::provider::CannedCaptionProvider;
    use crate::scanner::Scanner;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Provider that fails whenever the prompt names a given asset.
    struct FlakyProvider {
        fail_on_file: String,
    }

    impl CaptionProvider for FlakyProvider {
        fn model(&self) -> &str {
            "flaky"
        }

        fn caption(&self, _image: &ImagePayload, prompt: &str) -> Result<String, ProviderError> {
            if prompt.contains(&format!("\"{}\"", self.fail_on_file)) {
                Err(ProviderError::Http("connection reset".to_string()))
            } else {
                Ok("a simple shape".to_string())
            }
        }
    }

    fn write_asset(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"image bytes").unwrap();
        path
    }

    fn scanned_tree() -> (TempDir, PathBuf, Database) {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("assets");
        write_asset(&root, "coll-42-shapes/png/moon.png");
        write_asset(&root, "coll-42-shapes/png/star.png");

        let db = Database::open_in_memory().unwrap();
        Scanner::new(&root).scan(&db).unwrap();
        (tmp, root, db)
    }

    #[test]
    fn test_run_annotates_all_pending() {
        let (_tmp, _root, db) = scanned_tree();
        let provider = CannedCaptionProvider::new("canned-v1", "caption text");

        let summary = Annotator::new(&db, &provider, 10).run().unwrap();
        assert_eq!(summary.annotated, 2);
        assert_eq!(summary.failed, 0);

        assert_eq!(image_repo::count_pending(&db).unwrap(), 0);
        assert_eq!(image_repo::count_annotated(&db).unwrap(), 2);
    }

    #[test]
    fn test_model_and_text_persisted() {
        let (_tmp, root, db) = scanned_tree();
        let provider = CannedCaptionProvider::new("canned-v1", "caption text");

        Annotator::new(&db, &provider, 10).run().unwrap();

        let moon = image_repo::find_by_path(
            &db,
            &root.join("coll-42-shapes/png/moon.png").to_string_lossy(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(moon.model.as_deref(), Some("canned-v1"));
        assert_eq!(moon.text.as_deref(), Some("caption text"));
        assert!(moon.updated_when.is_some());
    }

    #[test]
    fn test_cursor_tracks_last_annotated_path() {
        let (_tmp, root, db) = scanned_tree();
        let provider = CannedCaptionProvider::new("canned-v1", "caption text");

        Annotator::new(&db, &provider, 10).run().unwrap();

        // Lexicographic discovery order put moon before star, so star
        // has the greater id and is annotated last.
        let cursor = cursor_repo::get(&db).unwrap().unwrap();
        assert_eq!(
            cursor.image_path,
            root.join("coll-42-shapes/png/star.png")
                .to_string_lossy()
                .to_string()
        );
    }

    #[test]
    fn test_failure_leaves_record_pending_and_continues() {
        let (_tmp, root, db) = scanned_tree();
        let provider = FlakyProvider {
            fail_on_file: "moon".to_string(),
        };

        let summary = Annotator::new(&db, &provider, 10).run().unwrap();
        assert_eq!(summary.annotated, 1);
        assert_eq!(summary.failed, 1);

        let moon = image_repo::find_by_path(
            &db,
            &root.join("coll-42-shapes/png/moon.png").to_string_lossy(),
        )
        .unwrap()
        .unwrap();
        assert!(moon.is_pending());
        assert!(!moon.skipped);

        let star = image_repo::find_by_path(
            &db,
            &root.join("coll-42-shapes/png/star.png").to_string_lossy(),
        )
        .unwrap()
        .unwrap();
        assert!(star.updated_when.is_some());
    }

    #[test]
    fn test_failed_record_retried_on_next_run() {
        let (_tmp, _root, db) = scanned_tree();

        let flaky = FlakyProvider {
            fail_on_file: "moon".to_string(),
        };
        Annotator::new(&db, &flaky, 10).run().unwrap();
        assert_eq!(image_repo::count_pending(&db).unwrap(), 1);

        let steady = CannedCaptionProvider::new("canned-v1", "caption text");
        let summary = Annotator::new(&db, &steady, 10).run().unwrap();
        assert_eq!(summary.annotated, 1);
        assert_eq!(image_repo::count_pending(&db).unwrap(), 0);
    }

    #[test]
    fn test_unreadable_file_is_per_record_failure() {
        let (_tmp, root, db) = scanned_tree();
        std::fs::remove_file(root.join("coll-42-shapes/png/moon.png")).unwrap();

        let provider = CannedCaptionProvider::new("canned-v1", "caption text");
        let summary = Annotator::new(&db, &provider, 10).run().unwrap();
        assert_eq!(summary.annotated, 1);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_skipped_record_never_attempted() {
        let (_tmp, root, db) = scanned_tree();
        image_repo::mark_skipped(
            &db,
            &root.join("coll-42-shapes/png/moon.png").to_string_lossy(),
        )
        .unwrap();

        let provider = CannedCaptionProvider::new("canned-v1", "caption text");
        let summary = Annotator::new(&db, &provider, 10).run().unwrap();
        assert_eq!(summary.annotated, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(image_repo::count_pending(&db).unwrap(), 0);
    }

    #[test]
    fn test_committed_annotation_without_cursor_is_terminal() {
        // Simulates a crash between the annotation write and the cursor
        // advance: the record must be treated as done on the next run.
        let (_tmp, root, db) = scanned_tree();
        let moon_path = root.join("coll-42-shapes/png/moon.png");
        let moon = image_repo::find_by_path(&db, &moon_path.to_string_lossy())
            .unwrap()
            .unwrap();
        image_repo::mark_annotated(&db, moon.id, "m", "a moon", "2026-01-02T00:00:00Z").unwrap();
        assert!(cursor_repo::get(&db).unwrap().is_none());

        let provider = CannedCaptionProvider::new("canned-v1", "fresh caption");
        let summary = Annotator::new(&db, &provider, 10).run().unwrap();
        assert_eq!(summary.annotated, 1);

        // Moon keeps its committed caption; only star was processed.
        let moon = image_repo::find_by_path(&db, &moon_path.to_string_lossy())
            .unwrap()
            .unwrap();
        assert_eq!(moon.text.as_deref(), Some("a moon"));
    }
}
