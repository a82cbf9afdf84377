pub mod annotator;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod path_meta;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod scanner;

pub use annotator::{AnnotateSummary, AnnotationOutcome, Annotator};
pub use config::{load_config, Config};
pub use db::Database;
pub use error::{
    AnnotateError, ConfigError, LayoutError, PicscribeError, ProviderError, Result, ScanError,
};
pub use path_meta::{parse_asset_path, AssetMeta};
pub use pipeline::{Pipeline, RunSummary};
pub use provider::{CannedCaptionProvider, CaptionProvider, ImagePayload, OpenAiCaptionProvider};
pub use scanner::{ScanSummary, Scanner};
