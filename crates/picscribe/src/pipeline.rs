//! Run orchestration.
//!
//! A run ("generate") executes the scanner to completion, then the
//! annotator to completion. Work appearing after the scan phase waits
//! for the next run. All state is committed as it is produced, so a
//! killed run resumes correctly.

use log::info;
use tracing::info_span;

use crate::annotator::{AnnotateSummary, Annotator};
use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::provider::CaptionProvider;
use crate::scanner::{ScanSummary, Scanner};

/// Combined outcome of one full run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub scan: ScanSummary,
    pub annotate: AnnotateSummary,
}

pub struct Pipeline<P: CaptionProvider> {
    config: Config,
    db: Database,
    provider: P,
}

impl<P: CaptionProvider> Pipeline<P> {
    /// Opens (or creates) the catalog at the configured location and
    /// builds the pipeline around it.
    pub fn open(config: Config, provider: P) -> Result<Self> {
        let db = Database::open(&config.store_location)?;
        Ok(Self::with_database(config, db, provider))
    }

    /// Builds the pipeline around an already-open catalog. Used by
    /// tests with in-memory stores.
    pub fn with_database(config: Config, db: Database, provider: P) -> Self {
        Self {
            config,
            db,
            provider,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Executes one full run: scan, then drain the pending set.
    pub fn run(&self) -> Result<RunSummary> {
        let _run_span = info_span!("generate",
            asset_root = %self.config.asset_root.display(),
            model = %self.provider.model(),
        )
        .entered();

        let scan = {
            let _phase = info_span!("scan").entered();
            Scanner::new(&self.config.asset_root).scan(&self.db)?
        };

        let annotate = {
            let _phase = info_span!("annotate").entered();
            Annotator::new(&self.db, &self.provider, self.config.progress_batch_size).run()?
        };

        info!(
            "Run complete: {} images on record, {} annotated this run, {} failed",
            scan.discovered, annotate.annotated, annotate.failed
        );

        Ok(RunSummary { scan, annotate })
    }
}
