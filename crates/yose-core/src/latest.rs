use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EnginePolicy;
use crate::models::{Bucket, BucketKey, Catalog, SeasonKind};
use crate::quality;

/// A season/episode coordinate stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub season: SeasonKind,
    pub episode: u32,
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{}e{}", self.season.as_number(), self.episode)
    }
}

/// Snapshot of how far a title has progressed, derived wholly from the
/// catalog. Stamps record the earliest coordinate where a feature first
/// appeared; `None` means it never has.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatestState {
    /// Non-torrent frontier.
    pub season: SeasonKind,
    pub episode: u32,
    /// Best info label at the frontier bucket.
    pub quality: String,
    pub hard_sub: Option<Coord>,
    pub dubbed: Option<Coord>,
    pub censored: Option<Coord>,
    pub subtitle: Option<Coord>,
    pub watch_online: Option<Coord>,
    pub torrent: Option<Coord>,
    /// Furthest coordinate any torrent reaches, which may run ahead of the
    /// non-torrent frontier.
    pub torrent_frontier: Option<Coord>,
}

/// Why a derived state differs from its predecessor, most significant cause
/// only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateReason {
    Season,
    Episode,
    Quality,
    TorrentSeason,
    TorrentEpisode,
    Metadata,
}

/// Outcome of comparing two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateDecision {
    /// Anything at all differs; the stored state should be overwritten.
    pub changed: bool,
    /// Worth notifying subscribers about.
    pub is_primary: bool,
    pub reason: Option<UpdateReason>,
}

impl UpdateDecision {
    const UNCHANGED: Self = Self {
        changed: false,
        is_primary: false,
        reason: None,
    };

    fn primary(reason: UpdateReason) -> Self {
        Self {
            changed: true,
            is_primary: true,
            reason: Some(reason),
        }
    }

    fn secondary(reason: UpdateReason) -> Self {
        Self {
            changed: true,
            is_primary: false,
            reason: Some(reason),
        }
    }
}

fn coord_of(key: BucketKey) -> Coord {
    match key {
        BucketKey::Episode { season, episode } => Coord { season, episode },
        BucketKey::Tier(_) => Coord {
            season: SeasonKind::NotApplicable,
            episode: 0,
        },
    }
}

fn label_has(label: &str, needles: &[&str]) -> bool {
    let lower = label.to_lowercase();
    needles.iter().any(|n| lower.contains(n))
}

fn non_torrent_labels(bucket: &Bucket) -> impl Iterator<Item = &str> {
    bucket
        .direct_links
        .iter()
        .chain(&bucket.watch_online_links)
        .map(|l| l.info_label.as_str())
}

fn stamp(slot: &mut Option<Coord>, coord: Coord) {
    if slot.is_none() {
        *slot = Some(coord);
    }
}

/// Derive the latest state from a catalog. Buckets are assumed key-ordered,
/// so the earliest qualifying bucket stamps each feature and the last
/// non-torrent bucket is the frontier.
pub fn derive(catalog: &Catalog, policy: &EnginePolicy) -> LatestState {
    let mut state = LatestState::default();

    for bucket in &catalog.buckets {
        let coord = coord_of(bucket.key);

        if bucket.has_non_torrent_content() {
            state.season = coord.season;
            state.episode = coord.episode;
            let mut best: Vec<_> = bucket
                .direct_links
                .iter()
                .chain(&bucket.watch_online_links)
                .cloned()
                .collect();
            quality::sort_best_first(&mut best, &policy.rank, false);
            if let Some(link) = best.first() {
                state.quality = link.info_label.clone();
            }
        }

        for label in non_torrent_labels(bucket) {
            if label_has(label, &["hardsub", "korsub"]) {
                stamp(&mut state.hard_sub, coord);
            }
            if label_has(label, &["dubbed", "dualaudio"]) {
                stamp(&mut state.dubbed, coord);
            }
            if label_has(label, &["censored"]) {
                stamp(&mut state.censored, coord);
            }
            if label_has(label, &["softsub"]) {
                stamp(&mut state.subtitle, coord);
            }
        }
        if !bucket.watch_online_links.is_empty() {
            stamp(&mut state.watch_online, coord);
        }
        if !bucket.torrent_links.is_empty() {
            stamp(&mut state.torrent, coord);
            state.torrent_frontier = Some(match state.torrent_frontier {
                Some(prev) if prev >= coord => prev,
                _ => coord,
            });
        }
    }

    state
}

fn frontier(state: &LatestState) -> Coord {
    Coord {
        season: state.season,
        episode: state.episode,
    }
}

/// Compare a freshly derived state against the stored one and classify the
/// difference.
///
/// `elapsed` is the time since the last primary notification for this title;
/// a quality-only improvement inside the cooldown window is demoted to a
/// silent metadata change so rapid re-encodes do not spam subscribers.
pub fn classify(
    prev: &LatestState,
    next: &LatestState,
    elapsed: Duration,
    policy: &EnginePolicy,
) -> UpdateDecision {
    if next.season > prev.season {
        return UpdateDecision::primary(UpdateReason::Season);
    }
    if next.season == prev.season && next.episode > prev.episode {
        return UpdateDecision::primary(UpdateReason::Episode);
    }

    if frontier(next) == frontier(prev)
        && next.quality != prev.quality
        && quality::is_better(&next.quality, &prev.quality, &policy.rank)
    {
        if elapsed >= policy.quality_cooldown() {
            return UpdateDecision::primary(UpdateReason::Quality);
        }
        // Inside the cooldown window the improvement is recorded silently.
        debug!(quality = %next.quality, "Quality improvement inside cooldown");
        return UpdateDecision::secondary(UpdateReason::Metadata);
    }

    match (prev.torrent_frontier, next.torrent_frontier) {
        (Some(p), Some(n)) if n > p => {
            return if n.season > p.season {
                UpdateDecision::primary(UpdateReason::TorrentSeason)
            } else {
                UpdateDecision::primary(UpdateReason::TorrentEpisode)
            };
        }
        (None, Some(n)) => {
            return if n.season > SeasonKind::NotApplicable {
                UpdateDecision::primary(UpdateReason::TorrentSeason)
            } else {
                UpdateDecision::primary(UpdateReason::TorrentEpisode)
            };
        }
        _ => {}
    }

    if prev != next {
        return UpdateDecision::secondary(UpdateReason::Metadata);
    }

    UpdateDecision::UNCHANGED
}
