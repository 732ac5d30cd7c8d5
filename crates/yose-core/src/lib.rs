//! Link catalog engine: canonicalized-link grouping, quality ranking,
//! incremental per-source merging, and latest-state derivation.
//!
//! The pipeline runs in stages. Site adapters hand over
//! [`RawLinkCandidate`]s; [`build_link`] canonicalizes them;
//! [`group::group_movie_links`] / [`group::group_serial_links`] partition
//! them into buckets; [`merge::merge`] reconciles one source's buckets into
//! the persisted [`Catalog`]; [`latest::derive`] and [`latest::classify`]
//! turn the catalog into a notification decision.

pub mod config;
pub mod dedup;
pub mod error;
pub mod group;
pub mod latest;
pub mod merge;
pub mod models;
pub mod quality;

pub use config::{EnginePolicy, RankPolicy};
pub use error::CatalogError;
pub use latest::{LatestState, UpdateDecision, UpdateReason};
pub use merge::{merge, CatalogPatch};
pub use models::{
    build_link, Bucket, BucketKey, Catalog, CanonicalLink, LinkKind, MediaKind, QualityTier,
    RawLinkCandidate, SeasonKind,
};
