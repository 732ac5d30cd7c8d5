use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Tuning knobs for the quality ranker.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RankPolicy {
    /// When only one of two otherwise-equal labels carries a sub/dub/censor
    /// marker, does having the marker win?
    pub sub_is_better: bool,
}

impl Default for RankPolicy {
    fn default() -> Self {
        Self { sub_is_better: true }
    }
}

/// Tuning knobs for the merge engine and the latest-state deriver.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnginePolicy {
    pub rank: RankPolicy,
    /// A torrent-only episode this many episodes past the furthest
    /// non-torrent episode of the same season is a near-duplicate outlier.
    pub torrent_episode_gap: u32,
    /// Minimum time between two quality-only update notifications.
    pub quality_cooldown_minutes: i64,
}

impl Default for EnginePolicy {
    fn default() -> Self {
        Self {
            rank: RankPolicy::default(),
            torrent_episode_gap: 6,
            quality_cooldown_minutes: 120,
        }
    }
}

impl EnginePolicy {
    pub fn quality_cooldown(&self) -> Duration {
        Duration::minutes(self.quality_cooldown_minutes)
    }
}
