use thiserror::Error;

use crate::models::BucketKey;

/// Extraction never fails — malformed input degrades to defaults. The only
/// surfaced failure mode is an internally inconsistent catalog handed to the
/// engine, which `Catalog::validate` lets the persistence layer detect.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate bucket for key {key:?}")]
    DuplicateBucket { key: BucketKey },
}
