use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Resolved season/episode coordinates.
///
/// `season == 0` is the raw on-the-wire encoding for "no season concept" or
/// the bonus-content bucket; downstream code maps it to a proper sum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonEpisode {
    pub season: u32,
    pub episode: u32,
    /// Whether an explicit marker fired, as opposed to the default fallback.
    pub explicit: bool,
}

/// Episode numbers above this are misreads, never real episodes.
pub const EPISODE_CAP: u32 = 3000;

/// A "season" in this range is a misread release year.
pub const SEASON_YEAR_GUARD: std::ops::RangeInclusive<u32> = 2000..=2050;

// ── Regex patterns (compiled once) ──────────────────────────────

static RE_ORDINAL_SEASON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2})(?:st|nd|rd|th)[._\- ]?season(?:[._\- ]*(?:episode|ep|e)?[._\- ]?(\d{1,4}))?")
        .unwrap()
});

static RE_S_E: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9])s[._\- ]?(\d{1,4})[._\- ]?e[._\- ]?(\d{1,4})").unwrap()
});

static RE_S_S: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9])s(\d{1,4})[._\- ]?s(\d{1,4})").unwrap()
});

static RE_E_E: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9])e(\d{1,4})[._\- ]?e(\d{1,4})").unwrap()
});

static RE_SEASON_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:season|fasl)[._\- ]?(\d{1,2})[._\- ]?(?:block|part|ghesmat)[._\- ]?(\d{1,4})")
        .unwrap()
});

static RE_SQUASHED_S_E: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)s(\d{1,2})e(\d{1,4})").unwrap());

static RE_EP_NEXT_TO_QUALITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9])(\d{1,4})[._\- ](?:\d{3,4}p|x26[45])").unwrap()
});

static RE_SEASON_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9])(?:season[._\- ]?|s)(\d{1,2})(?:[^0-9]|$)").unwrap()
});

static RE_EPISODE_ANYWHERE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9])(?:episode|ep|e)[._\- ]?(\d{1,4})").unwrap()
});

static RE_SQUASHED_DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|[^a-z0-9])s(\d{3,4})(?:[^0-9]|$)").unwrap());

static RE_BONUS_INDEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9])(?:nced|ncop|ova|ona|oad|special|sp|redial)[._\- ]?(\d{1,3})")
        .unwrap()
});

static RE_EP_FALLBACK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|[^a-z0-9])ep[._\- ]?(\d{1,4})").unwrap());

static RE_DASH_CONVENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d{1,2})[._ ]*-[._ ]*e?(\d{1,4})").unwrap());

/// Resolve season/episode from raw text or a target address.
///
/// A first-match cascade: rules are tried in strict priority order and the
/// first one that fires wins. `is_address` tells the resolver the input is a
/// URL whose query string and escapes should be shed first.
///
/// Post-conditions independent of the rule that fired:
/// - season inside the year-guard range collapses to 0
/// - episode above `EPISODE_CAP` collapses to 0
/// - nothing fired on non-empty input → season 1, episode 0
pub fn resolve(input: &str, is_address: bool) -> SeasonEpisode {
    let text = preprocess(input, is_address);
    if text.is_empty() {
        return SeasonEpisode {
            season: 0,
            episode: 0,
            explicit: false,
        };
    }

    let raw = try_ordinal_season(&text)
        .or_else(|| try_s_e(&text))
        .or_else(|| try_back_to_back(&text))
        .or_else(|| try_season_block(&text))
        .or_else(|| try_dotted(&text))
        .or_else(|| try_episode_next_to_quality(&text))
        .or_else(|| try_season_with_separate_episode(&text))
        .or_else(|| try_bonus_index(&text))
        .or_else(|| try_ep_fallback(&text))
        .or_else(|| try_dash_convention(&text));

    let mut result = raw.unwrap_or(SeasonEpisode {
        season: 1,
        episode: 0,
        explicit: false,
    });

    if SEASON_YEAR_GUARD.contains(&result.season) {
        result.season = 0;
    }
    if result.episode > EPISODE_CAP {
        result.episode = 0;
    }
    result
}

fn preprocess(input: &str, is_address: bool) -> String {
    let mut s = input.trim().to_lowercase();
    if is_address {
        if let Some(pos) = s.find('?') {
            s.truncate(pos);
        }
        s = s.replace("%20", " ");
    }
    s
}

fn explicit(season: u32, episode: u32) -> Option<SeasonEpisode> {
    Some(SeasonEpisode {
        season,
        episode,
        explicit: true,
    })
}

/// A 4-digit season reading that is actually a pre-2000 year means the site
/// tagged the release year where the season belongs; treat as season 1.
/// Years in the guard range are zeroed by the shared post-condition.
fn degrade_year_season(season: u32) -> u32 {
    if (1900..2000).contains(&season) {
        1
    } else {
        season
    }
}

// ── Rule 1: ordinal "2nd-season-05" ─────────────────────────────

fn try_ordinal_season(text: &str) -> Option<SeasonEpisode> {
    let caps = RE_ORDINAL_SEASON.captures(text)?;
    let season: u32 = caps[1].parse().ok()?;
    let episode: u32 = caps
        .get(2)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    explicit(season, episode)
}

// ── Rule 2: explicit "s02e05" ───────────────────────────────────

fn try_s_e(text: &str) -> Option<SeasonEpisode> {
    let caps = RE_S_E.captures(text)?;
    let season: u32 = caps[1].parse().ok()?;
    let episode: u32 = caps[2].parse().ok()?;
    explicit(degrade_year_season(season), episode)
}

// ── Rule 3: back-to-back malformed "s02s05" / "e02e05" ──────────

fn try_back_to_back(text: &str) -> Option<SeasonEpisode> {
    if let Some(caps) = RE_S_S.captures(text) {
        let season: u32 = caps[1].parse().ok()?;
        let episode: u32 = caps[2].parse().ok()?;
        return explicit(degrade_year_season(season), episode);
    }
    if let Some(caps) = RE_E_E.captures(text) {
        let episode: u32 = caps[2].parse().ok()?;
        return explicit(1, episode);
    }
    None
}

// ── Rule 4: alternate-site "season 2 block 5" ───────────────────

fn try_season_block(text: &str) -> Option<SeasonEpisode> {
    let caps = RE_SEASON_BLOCK.captures(text)?;
    let season: u32 = caps[1].parse().ok()?;
    let episode: u32 = caps[2].parse().ok()?;
    explicit(season, episode)
}

// ── Rule 5: dotted "s2.e5" after separator squashing ────────────

fn try_dotted(text: &str) -> Option<SeasonEpisode> {
    let squashed: String = text
        .chars()
        .filter(|c| !matches!(c, '.' | '_' | '-' | ' '))
        .collect();
    let caps = RE_SQUASHED_S_E.captures(&squashed)?;
    let season: u32 = caps[1].parse().ok()?;
    let episode: u32 = caps[2].parse().ok()?;
    explicit(season, episode)
}

// ── Rule 6: episode adjacent to a resolution/codec marker ───────

fn try_episode_next_to_quality(text: &str) -> Option<SeasonEpisode> {
    let caps = RE_EP_NEXT_TO_QUALITY.captures(text)?;
    let episode: u32 = caps[1].parse().ok()?;
    // Years next to quality markers are release years, not episodes.
    if (1900..=2050).contains(&episode) {
        return None;
    }
    explicit(1, episode)
}

// ── Rule 7: season marker + separately located episode ──────────

fn try_season_with_separate_episode(text: &str) -> Option<SeasonEpisode> {
    if let Some(caps) = RE_SEASON_ONLY.captures(text) {
        let season: u32 = caps[1].parse().ok()?;
        let episode = RE_EPISODE_ANYWHERE
            .captures(text)
            .and_then(|c| c[1].parse().ok())
            .unwrap_or(0);
        return explicit(season, episode);
    }

    // Squashed "s205" → season 2, episode 05; "s1012" → season 10, episode 12.
    let caps = RE_SQUASHED_DIGIT_RUN.captures(text)?;
    let digits = &caps[1];
    let split = digits.len() - 2;
    let season: u32 = digits[..split].parse().ok()?;
    let episode: u32 = digits[split..].parse().ok()?;
    explicit(season, episode)
}

// ── Rule 8: bonus-content marker with numeric index ─────────────

fn try_bonus_index(text: &str) -> Option<SeasonEpisode> {
    let caps = RE_BONUS_INDEX.captures(text)?;
    let episode: u32 = caps[1].parse().ok()?;
    // Bonus content lives in the extras bucket, encoded as season 0.
    explicit(0, episode)
}

// ── Rule 9: "ep5" fallback with ambiguity veto ──────────────────

fn try_ep_fallback(text: &str) -> Option<SeasonEpisode> {
    let mut iter = RE_EP_FALLBACK.captures_iter(text);
    let first = iter.next()?;
    if iter.next().is_some() {
        // More than one candidate: too ambiguous to trust.
        return None;
    }
    let episode: u32 = first[1].parse().ok()?;
    explicit(1, episode)
}

// ── Rule 10: dash convention "title 2 - e5" ─────────────────────

fn try_dash_convention(text: &str) -> Option<SeasonEpisode> {
    let caps = RE_DASH_CONVENTION.captures(text)?;
    let season: u32 = caps[1].parse().ok()?;
    let episode: u32 = caps[2].parse().ok()?;
    explicit(season, episode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn se(input: &str) -> (u32, u32) {
        let r = resolve(input, false);
        (r.season, r.episode)
    }

    #[test]
    fn test_explicit_s_e() {
        assert_eq!(se("show.s02e05.720p"), (2, 5));
        assert_eq!(se("show S2 E5"), (2, 5));
        assert_eq!(se("show.s02-e05"), (2, 5));
    }

    #[test]
    fn test_ordinal_season() {
        assert_eq!(se("show.2nd-season-08.480p"), (2, 8));
        assert_eq!(se("show 3rd season"), (3, 0));
    }

    #[test]
    fn test_back_to_back_malformed() {
        assert_eq!(se("show.s02s05.720p"), (2, 5));
        assert_eq!(se("show.e02e05.720p"), (1, 5));
    }

    #[test]
    fn test_season_block() {
        assert_eq!(se("show season 2 block 5"), (2, 5));
        assert_eq!(se("show fasl 2 ghesmat 12"), (2, 12));
    }

    #[test]
    fn test_dotted() {
        assert_eq!(se("show s2 . e5 extra"), (2, 5));
    }

    #[test]
    fn test_episode_next_to_quality() {
        assert_eq!(se("show.05.720p.web-dl"), (1, 5));
        assert_eq!(se("show.05.x265"), (1, 5));
        // A year next to a quality marker is not an episode.
        assert_eq!(se("movie.2019.720p.web-dl"), (1, 0));
    }

    #[test]
    fn test_season_with_separate_episode() {
        assert_eq!(se("show.s02.of.ep12"), (2, 12));
        assert_eq!(se("show season 3"), (3, 0));
    }

    #[test]
    fn test_squashed_digit_run() {
        assert_eq!(se("show.s205.480p"), (2, 5));
        assert_eq!(se("show.s1012.480p"), (10, 12));
    }

    #[test]
    fn test_bonus_index() {
        assert_eq!(se("show ova 2"), (0, 2));
        assert_eq!(se("show.ncop.1"), (0, 1));
    }

    #[test]
    fn test_ep_fallback_ambiguity_veto() {
        assert_eq!(se("show ep5"), (1, 5));
        // Two candidates: the rule refuses, the default kicks in.
        assert_eq!(se("show ep5 ep6"), (1, 0));
    }

    #[test]
    fn test_dash_convention() {
        assert_eq!(se("title 2 - e5"), (2, 5));
        assert_eq!(se("title 2 - 14"), (2, 14));
    }

    #[test]
    fn test_year_guard() {
        // Season reading of 2020 is a misread year.
        assert_eq!(se("show.s2020e05.720p").0, 0);
        // Pre-2000 year in the season slot means season 1.
        assert_eq!(se("show.s1999e05.720p"), (1, 5));
    }

    #[test]
    fn test_episode_cap() {
        assert_eq!(se("show.s01e3050.720p"), (1, 0));
    }

    #[test]
    fn test_default_when_nothing_fires() {
        let r = resolve("just a movie title", false);
        assert_eq!((r.season, r.episode), (1, 0));
        assert!(!r.explicit);
    }

    #[test]
    fn test_empty_input() {
        let r = resolve("", false);
        assert_eq!((r.season, r.episode), (0, 0));
        assert!(!r.explicit);
    }

    #[test]
    fn test_address_query_string_shed() {
        let r = resolve("https://x.com/show.s03e09.720p.mkv?dl=1&e=99", true);
        assert_eq!((r.season, r.episode), (3, 9));
    }

    #[test]
    fn test_cascade_priority() {
        // Rule 2 (s02e05) outranks rule 6 (number next to quality).
        assert_eq!(se("show.s02e05.07.720p"), (2, 5));
    }
}
