//! Asset path parsing.
//!
//! The asset tree contract is `.../<collection>/<type>/<filename>`.
//! All catalog metadata is derived from those three trailing segments
//! once, at discovery time, and never re-derived afterwards.

use std::path::{Component, Path};

use crate::error::LayoutError;

/// Metadata derived from an asset path's positional segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetMeta {
    /// Parent-of-parent directory name, e.g. `coll-42-shapes`.
    pub collection: String,
    /// Parent directory name; persisted in the `type` column.
    pub kind: String,
    /// Filename with its final extension stripped.
    pub file: String,
    /// Filename as it appears on disk.
    pub filename: String,
}

/// Parses the trailing `<collection>/<type>/<filename>` segments.
///
/// Pure and deterministic. Paths with fewer than three segments violate
/// the tree layout contract and yield a [`LayoutError`]; no degraded
/// metadata is ever produced.
pub fn parse_asset_path(path: &Path) -> Result<AssetMeta, LayoutError> {
    // Only named components count as layout segments; root, `.` and
    // `..` are navigation, not metadata.
    let mut segments = Vec::with_capacity(3);
    for component in path.components().rev() {
        let Component::Normal(segment) = component else {
            continue;
        };
        let segment = segment.to_str().ok_or_else(|| LayoutError::NonUtf8Segment {
            path: path.display().to_string(),
        })?;
        segments.push(segment);
        if segments.len() == 3 {
            break;
        }
    }

    if segments.len() < 3 {
        return Err(LayoutError::TooFewSegments {
            path: path.display().to_string(),
        });
    }

    let filename = segments[0];
    let kind = segments[1];
    let collection = segments[2];

    let file = match filename.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem.to_string(),
        _ => filename.to_string(),
    };

    Ok(AssetMeta {
        collection: collection.to_string(),
        kind: kind.to_string(),
        file,
        filename: filename.to_string(),
    })
}
