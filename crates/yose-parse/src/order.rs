use std::sync::LazyLock;

use regex::Regex;

use crate::keyword;

/// Priority class of a label token. Declaration order is output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TokenClass {
    /// `2160p`, `1080p`, ...
    Resolution,
    /// `HD`, `FHD`, `2K`, `4K` — corroborates the leading resolution.
    Corroboration,
    /// `10bit`, `x265`, `6CH`, `3D`, ...
    EncodingFlag,
    /// `Episode(1-5)` — several episodes packed in one file.
    EpisodeRange,
    /// `OVA`, `NCED(2)`, `Special`, ...
    Bonus,
    /// Award/ceremony marker.
    Ceremony,
    /// `DirectorsCut`, `Uncut`, ...
    CutEdition,
    /// `Extended`, `Theatrical`, `Extras`, `REPACK`, ...
    Extras,
    /// `Part(2)`, `Chapter(1)`.
    PartChapter,
    /// Distribution type from the closed ladder.
    ReleaseType,
    /// Encoder/release-group name.
    Encoder,
    /// `Censored` / `Uncensored`.
    Censorship,
    /// Dub and sub markers.
    SubDub,
    /// Anything the vocabulary does not know.
    Other,
    /// `v2`, `v3`, ...
    Version,
    /// Trailing size suffix: `550MB`, `1.4GB`.
    SizeSuffix,
}

static RE_EPISODE_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Episode\(\d{1,4}-\d{1,4}\)$").unwrap());

static RE_BONUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:NCED|NCOP|OVA|ONA|OAD|SP|Special|Redial)(?:\(\d{1,4}\))?$").unwrap()
});

static RE_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:Part|Chapter)\(\d{1,3}\)$").unwrap());

static RE_VERSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^v\d{1,2}$").unwrap());

static RE_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\d+(?:\.\d+)?(?:MB|GB)$").unwrap());

static RE_SUBDUB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:Dubbed(?:\([A-Za-z]+\))?|DualAudio|HardSub(?:\([A-Za-z]+\))?|SoftSub|KorSub)$")
        .unwrap()
});

const ENCODING_FLAGS: &[&str] = &[
    "10bit", "12bit", "x265", "x264", "HEVC", "AV1", "6CH", "8CH", "2CH", "3D",
];

const CORROBORATIONS: &[&str] = &["HD", "FHD", "FullHD", "2K", "4K"];

const CEREMONIES: &[&str] = &["Oscar", "Oscars", "GoldenGlobe", "Cannes", "Emmy"];

const CUT_EDITIONS: &[&str] = &["DirectorsCut", "FinalCut", "UltimateCut", "Uncut", "NoirCut"];

const EXTRAS: &[&str] = &["Extras", "Theatrical", "Extended", "REPACK", "PROPER"];

fn in_list(list: &[&str], token: &str) -> bool {
    list.iter().any(|t| t.eq_ignore_ascii_case(token))
}

/// Classify a single label token.
pub fn classify(token: &str) -> TokenClass {
    if keyword::is_resolution(token) {
        TokenClass::Resolution
    } else if in_list(CORROBORATIONS, token) {
        TokenClass::Corroboration
    } else if in_list(ENCODING_FLAGS, token) {
        TokenClass::EncodingFlag
    } else if RE_EPISODE_RANGE.is_match(token) {
        TokenClass::EpisodeRange
    } else if RE_BONUS.is_match(token) {
        TokenClass::Bonus
    } else if in_list(CEREMONIES, token) {
        TokenClass::Ceremony
    } else if in_list(CUT_EDITIONS, token) {
        TokenClass::CutEdition
    } else if in_list(EXTRAS, token) {
        TokenClass::Extras
    } else if RE_PART.is_match(token) {
        TokenClass::PartChapter
    } else if keyword::canonical_release_type(token).is_some() {
        TokenClass::ReleaseType
    } else if keyword::canonical_encoder(token).is_some() {
        TokenClass::Encoder
    } else if token.eq_ignore_ascii_case("Censored") || token.eq_ignore_ascii_case("Uncensored") {
        TokenClass::Censorship
    } else if RE_SUBDUB.is_match(token) {
        TokenClass::SubDub
    } else if RE_VERSION.is_match(token) {
        TokenClass::Version
    } else if RE_SIZE.is_match(token) {
        TokenClass::SizeSuffix
    } else {
        TokenClass::Other
    }
}

static RE_SIZE_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\d+(?:MB|GB)$").unwrap());

/// Split a label on separator characters, dropping empty fragments.
/// A dotted size suffix ("1.4GB") is re-joined after the split.
pub fn split_tokens(label: &str) -> Vec<String> {
    let mut tokens: Vec<String> = label
        .split(['.', ' ', '_'])
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect();

    let mut i = 0;
    while i + 1 < tokens.len() {
        if tokens[i].chars().all(|c| c.is_ascii_digit()) && RE_SIZE_TAIL.is_match(&tokens[i + 1]) {
            let tail = tokens.remove(i + 1);
            tokens[i] = format!("{}.{tail}", tokens[i]);
        }
        i += 1;
    }

    tokens
}

/// Reorder a token bag into the fixed canonical sequence.
///
/// - Stable sort by `TokenClass`, so unrecognized tokens keep their relative
///   input order.
/// - Only the first resolution token survives.
/// - Corroboration residue that conflicts with the resolution (a stray `4K`
///   without `2160p`) is stripped.
/// - Adjacent duplicate tokens collapse to one.
/// - The result never starts or ends with a separator. Idempotent.
pub fn reorder(label: &str) -> String {
    let mut tokens = split_tokens(label);

    // Keep only the first resolution token.
    let mut seen_resolution = false;
    tokens.retain(|t| {
        if classify(t) == TokenClass::Resolution {
            if seen_resolution {
                return false;
            }
            seen_resolution = true;
        }
        true
    });

    let resolution = tokens
        .iter()
        .find(|t| classify(t) == TokenClass::Resolution)
        .map(|t| t.to_lowercase());

    // Strip corroboration tokens the resolution does not back up.
    tokens.retain(|t| {
        if classify(t) != TokenClass::Corroboration {
            return true;
        }
        match (t.to_uppercase().as_str(), resolution.as_deref()) {
            ("4K", Some("2160p")) => true,
            ("2K", Some("1440p")) => true,
            ("HD", Some("720p" | "1080p")) => true,
            ("FHD" | "FULLHD", Some("1080p")) => true,
            _ => false,
        }
    });

    tokens.sort_by_key(|t| classify(t));

    tokens.dedup_by(|a, b| a.eq_ignore_ascii_case(b));

    tokens.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_order() {
        assert_eq!(reorder("x265.1080p.WEB-DL"), "1080p.x265.WEB-DL");
        assert_eq!(
            reorder("PSA.720p.HardSub.BluRay.10bit"),
            "720p.10bit.BluRay.PSA.HardSub"
        );
    }

    #[test]
    fn test_idempotent() {
        let once = reorder("BluRay.1080p.x265.YIFY.HardSub");
        assert_eq!(reorder(&once), once);
    }

    #[test]
    fn test_adjacent_duplicates_collapse() {
        assert_eq!(reorder("1080p.1080p.WEB-DL.WEB-DL"), "1080p.WEB-DL");
    }

    #[test]
    fn test_stray_4k_stripped() {
        assert_eq!(reorder("1080p.4K.WEB-DL"), "1080p.WEB-DL");
        assert_eq!(reorder("2160p.4K.WEB-DL"), "2160p.4K.WEB-DL");
    }

    #[test]
    fn test_hd_kept_only_on_hd_resolutions() {
        assert_eq!(reorder("480p.HD.WEB-DL"), "480p.WEB-DL");
        assert_eq!(reorder("720p.HD.WEB-DL"), "720p.HD.WEB-DL");
    }

    #[test]
    fn test_unrecognized_keep_relative_order() {
        // "Foo" and "Bar" are unknown; their input order must survive.
        assert_eq!(reorder("Foo.1080p.Bar.WEB-DL"), "1080p.WEB-DL.Foo.Bar");
    }

    #[test]
    fn test_no_dangling_separators() {
        let out = reorder(".1080p..WEB-DL.");
        assert!(!out.starts_with('.'));
        assert!(!out.ends_with('.'));
        assert_eq!(out, "1080p.WEB-DL");
    }

    #[test]
    fn test_only_first_resolution_survives() {
        assert_eq!(reorder("1080p.720p.WEB-DL"), "1080p.WEB-DL");
    }

    #[test]
    fn test_size_suffix_last() {
        assert_eq!(reorder("550MB.1080p.WEB-DL"), "1080p.WEB-DL.550MB");
    }

    #[test]
    fn test_version_before_size() {
        assert_eq!(reorder("v2.1080p.1.4GB.WEB-DL"), "1080p.WEB-DL.v2.1.4GB");
    }

    #[test]
    fn test_range_and_bonus_order() {
        assert_eq!(
            reorder("OVA.Episode(1-5).1080p.WEB-DL"),
            "1080p.Episode(1-5).OVA.WEB-DL"
        );
    }
}
