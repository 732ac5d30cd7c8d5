use serde::{Deserialize, Serialize};

pub use yose_parse::MediaKind;

use crate::error::CatalogError;

/// How a link is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkKind {
    Direct,
    Torrent,
    Magnet,
    WatchOnline,
}

impl LinkKind {
    /// Magnet URIs share the torrent sub-list.
    pub fn is_torrent(self) -> bool {
        matches!(self, Self::Torrent | Self::Magnet)
    }
}

/// One scraped link as a site adapter hands it over. Immutable input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLinkCandidate {
    pub target_address: String,
    pub raw_label: String,
    pub source_name: String,
    pub media_type: MediaKind,
    pub link_kind: LinkKind,
}

/// Season coordinate. The wire format overloads 0 to mean both "no season
/// concept" (movies) and "bonus-content bucket" (serial extras); in memory
/// the two are distinct variants, and the collapse to 0 happens only at the
/// serde boundary. 0 deserializes as `Extras` — movie catalogs never
/// persist a season in the first place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u32", from = "u32")]
pub enum SeasonKind {
    NotApplicable,
    Extras,
    Numbered(u32),
}

impl SeasonKind {
    /// Interpret a raw numeric season. 0 and year-guard misreads both land
    /// in the extras bucket.
    pub fn from_raw(n: u32) -> Self {
        if n == 0 || (2000..=2050).contains(&n) {
            Self::Extras
        } else {
            Self::Numbered(n)
        }
    }

    pub fn as_number(self) -> u32 {
        match self {
            Self::NotApplicable | Self::Extras => 0,
            Self::Numbered(n) => n,
        }
    }
}

impl Default for SeasonKind {
    fn default() -> Self {
        Self::NotApplicable
    }
}

impl From<SeasonKind> for u32 {
    fn from(s: SeasonKind) -> u32 {
        s.as_number()
    }
}

impl From<u32> for SeasonKind {
    fn from(n: u32) -> Self {
        Self::from_raw(n)
    }
}

impl std::fmt::Display for SeasonKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_number())
    }
}

/// A fully canonicalized link record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalLink {
    pub target_address: String,
    /// Canonical info label: leading resolution token, then modifier tokens
    /// in the fixed class order.
    pub info_label: String,
    pub season: SeasonKind,
    pub episode: u32,
    pub source_name: String,
    pub link_kind: LinkKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub size_mb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub quality_sample: Option<String>,
}

/// Canonicalize one raw candidate into a `CanonicalLink`.
///
/// Season/episode resolution prefers the label text; when no explicit marker
/// fires there, the target address is tried. Movie media types have no
/// season concept.
pub fn build_link(candidate: &RawLinkCandidate) -> CanonicalLink {
    let info_label = yose_parse::canonicalize(
        &candidate.raw_label,
        &candidate.target_address,
        candidate.media_type,
    );

    let (season, episode) = if candidate.media_type.is_serial() {
        let from_label = yose_parse::resolve(&candidate.raw_label, false);
        let resolved = if from_label.explicit {
            from_label
        } else {
            let from_address = yose_parse::resolve(&candidate.target_address, true);
            if from_address.explicit {
                from_address
            } else {
                from_label
            }
        };
        (SeasonKind::from_raw(resolved.season), resolved.episode)
    } else {
        (SeasonKind::NotApplicable, 0)
    };

    let size_mb = yose_parse::canonical::parse_size_mb(&info_label);

    CanonicalLink {
        target_address: candidate.target_address.clone(),
        info_label,
        season,
        episode,
        source_name: candidate.source_name.clone(),
        link_kind: candidate.link_kind,
        size_mb,
        quality_sample: None,
    }
}

/// Fixed movie quality tiers, best-first. Declaration order is the bucket
/// order of a movie catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    #[serde(rename = "2160p")]
    T2160p,
    #[serde(rename = "1080p")]
    T1080p,
    #[serde(rename = "720p")]
    T720p,
    #[serde(rename = "480p")]
    T480p,
    #[serde(rename = "360p")]
    T360p,
    Others,
}

impl QualityTier {
    pub const ALL: &'static [QualityTier] = &[
        Self::T2160p,
        Self::T1080p,
        Self::T720p,
        Self::T480p,
        Self::T360p,
        Self::Others,
    ];

    fn token(self) -> Option<&'static str> {
        match self {
            Self::T2160p => Some("2160p"),
            Self::T1080p => Some("1080p"),
            Self::T720p => Some("720p"),
            Self::T480p => Some("480p"),
            Self::T360p => Some("360p"),
            Self::Others => None,
        }
    }

    /// First tier whose token appears in the label wins; no match → Others.
    pub fn match_label(label: &str) -> Self {
        for tier in Self::ALL {
            if let Some(token) = tier.token() {
                if label.contains(token) {
                    return *tier;
                }
            }
        }
        Self::Others
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.token() {
            Some(t) => write!(f, "{t}"),
            None => write!(f, "others"),
        }
    }
}

/// What a bucket groups by: a movie quality tier, or a serial coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BucketKey {
    Tier(QualityTier),
    Episode { season: SeasonKind, episode: u32 },
}

/// One group of links, split into the three delivery sub-lists. Each
/// sub-list is deduplicated by target address and kept sorted best-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub key: BucketKey,
    pub direct_links: Vec<CanonicalLink>,
    pub watch_online_links: Vec<CanonicalLink>,
    pub torrent_links: Vec<CanonicalLink>,
}

impl Bucket {
    pub fn new(key: BucketKey) -> Self {
        Self {
            key,
            direct_links: Vec::new(),
            watch_online_links: Vec::new(),
            torrent_links: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.direct_links.is_empty()
            && self.watch_online_links.is_empty()
            && self.torrent_links.is_empty()
    }

    /// Whether any sub-list other than torrents has content.
    pub fn has_non_torrent_content(&self) -> bool {
        !self.direct_links.is_empty() || !self.watch_online_links.is_empty()
    }
}

/// The full persisted bucket collection for one title. Buckets stay ordered
/// by key: fixed tier order for movies, season-then-episode for serials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub buckets: Vec<Bucket>,
}

impl Catalog {
    pub fn find(&self, key: BucketKey) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.key == key)
    }

    pub fn find_mut(&mut self, key: BucketKey) -> Option<&mut Bucket> {
        self.buckets.iter_mut().find(|b| b.key == key)
    }

    /// Insert keeping key order.
    pub fn insert(&mut self, bucket: Bucket) {
        let pos = self
            .buckets
            .iter()
            .position(|b| b.key > bucket.key)
            .unwrap_or(self.buckets.len());
        self.buckets.insert(pos, bucket);
    }

    /// Integrity check for the persistence collaborator: the engine assumes
    /// one bucket per key and does not detect violations on its own.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (i, bucket) in self.buckets.iter().enumerate() {
            if self.buckets[..i].iter().any(|b| b.key == bucket.key) {
                return Err(CatalogError::DuplicateBucket { key: bucket.key });
            }
        }
        Ok(())
    }
}
