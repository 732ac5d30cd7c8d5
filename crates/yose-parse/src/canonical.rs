use std::sync::LazyLock;

use bitflags::bitflags;
use regex::Regex;

use crate::keyword;
use crate::media::MediaKind;
use crate::order::{self, TokenClass};

bitflags! {
    /// Orthogonal flags detected from the target address in one scan.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AddressFlags: u8 {
        const TEN_BIT = 1;
        const X265 = 1 << 1;
        const SIX_CH = 1 << 2;
        const THREE_D = 1 << 3;
    }
}

// ── Address regexes ─────────────────────────────────────────────

static RE_BRACKET_RES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[(\d{3,4})p\]").unwrap());

static RE_DELIM_RES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[._\-](\d{3,4})p(?:[._\-]|$)").unwrap());

static RE_EPISODE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:episode|ep|e)[._\- ]?(\d{1,4})[._\- ]?(?:to|[-~])[._\- ]?(?:ep|e)?(\d{1,4})")
        .unwrap()
});

static RE_BONUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[._\-/ ])(nced|ncop|ova|ona|oad|special|sp|redial)(?:[._\- ]?(\d{1,3}))?(?:[._\-/ ]|$)")
        .unwrap()
});

static RE_DUB_FARSI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:farsi[._\- ]?dub|dub(?:bed)?[._\- ]?(?:fa|farsi))").unwrap());

static RE_DUB_ENGLISH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)eng(?:lish)?[._\- ]?dub(?:bed)?").unwrap());

static RE_DUAL_AUDIO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)dual[._\- ]?audio").unwrap());

static RE_DUB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|[._\-/ ])dub(?:bed)?(?:[._\-/ ]|$)").unwrap());

static RE_HARDSUB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)hard[._\- ]?sub").unwrap());

static RE_SOFTSUB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)soft[._\- ]?sub").unwrap());

static RE_KORSUB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:kor[._\- ]?sub|hc[._\- ]?kor)").unwrap());

static RE_IS_DUB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:Dubbed(?:\([A-Za-z]+\))?|DualAudio)$").unwrap()
});

static RE_IS_SUB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:HardSub(?:\([A-Za-z]+\))?|SoftSub|KorSub)$").unwrap()
});

/// Characters collapsed to a space before tokenization. Hyphen, dot and
/// underscore are token-internal and handled by the splitter.
fn is_noise_char(c: char) -> bool {
    matches!(
        c,
        '(' | ')' | '[' | ']' | '{' | '}' | '«' | '»' | '،' | '؛' | '؟' | '!' | ',' | ':' | '|'
            | '/' | '\\' | '+' | '~' | '"' | '\''
    )
}

/// Turn a raw (label, address) pair into a canonical info label.
///
/// # Example
/// ```
/// use yose_parse::{canonical::canonicalize, media::MediaKind};
/// let label = canonicalize(
///     "دانلود با کیفیت 1080p",
///     "https://cdn.example.com/My.Movie.2019.1080p.WEB-DL.x265.PSA.mkv",
///     MediaKind::Movie,
/// );
/// assert_eq!(label, "1080p.x265.WEB-DL.PSA");
/// ```
pub fn canonicalize(raw_label: &str, target_address: &str, kind: MediaKind) -> String {
    // Step 1: strip localized boilerplate, translate structural tokens.
    let mut tokens = normalize_text(raw_label);

    // Step 2: resolution, from text or address fallback cascade.
    resolve_resolution(&mut tokens, target_address);

    // Step 3: orthogonal flags present in the address but not the text.
    append_address_flags(&mut tokens, target_address);

    // Step 4: distribution/release type, text first then address.
    append_release_type(&mut tokens, target_address);

    // Step 5: encoder by vocabulary match, housekeeping names discarded.
    append_encoder(&mut tokens, target_address);

    // Step 6: multi-episode range marker.
    append_episode_range(&mut tokens, target_address);

    // Step 7: bonus-content marker.
    append_bonus_marker(&mut tokens, target_address);

    // Step 8: censorship marker (anime releases only).
    if kind.is_anime() {
        append_censorship(&mut tokens, target_address);
    }

    // Step 9: dub and sub markers, at most one of each.
    resolve_sub_dub(&mut tokens, target_address);

    order::reorder(&tokens.join("."))
}

// ── Step 1 ──────────────────────────────────────────────────────

/// Translate localized structural tokens, strip boilerplate words, collapse
/// punctuation and whitespace, and split into tokens.
fn normalize_text(raw: &str) -> Vec<String> {
    let cleaned: String = raw
        .chars()
        .map(|c| if is_noise_char(c) { ' ' } else { c })
        .collect();

    let mut translated = cleaned;
    for (needle, replacement) in keyword::TRANSLATIONS {
        if translated.contains(needle) {
            translated = translated.replace(needle, &format!(" {replacement} "));
        }
    }

    let mut tokens: Vec<String> = order::split_tokens(&translated)
        .into_iter()
        .filter(|t| !keyword::STRIP_WORDS.iter().any(|w| w == t))
        .collect();

    fold_structural_pairs(&mut tokens);
    tokens
}

/// Fold "Part 2" into `Part(2)` and drop "Season N" / "Episode N" pairs,
/// which belong to the season/episode resolver, not the info label.
fn fold_structural_pairs(tokens: &mut Vec<String>) {
    let mut i = 0;
    while i < tokens.len() {
        let next_is_number = tokens
            .get(i + 1)
            .is_some_and(|t| !t.is_empty() && t.chars().all(|c| c.is_ascii_digit()));

        if tokens[i].eq_ignore_ascii_case("part") || tokens[i].eq_ignore_ascii_case("chapter") {
            if next_is_number {
                let n = tokens.remove(i + 1);
                let word = if tokens[i].eq_ignore_ascii_case("part") {
                    "Part"
                } else {
                    "Chapter"
                };
                tokens[i] = format!("{word}({n})");
            }
            i += 1;
            continue;
        }

        if tokens[i].eq_ignore_ascii_case("season") || tokens[i].eq_ignore_ascii_case("episode") {
            tokens.remove(i);
            if next_is_number {
                // The number shifted into position i.
                if i < tokens.len() && tokens[i].chars().all(|c| c.is_ascii_digit()) {
                    tokens.remove(i);
                }
            }
            continue;
        }

        i += 1;
    }
}

// ── Step 2 ──────────────────────────────────────────────────────

fn valid_resolution(digits: &str) -> Option<String> {
    let token = format!("{digits}p");
    keyword::is_resolution(&token).then_some(token)
}

/// A `1440p`/`2160p` read out of the address is kept only when an
/// independent 2K/4K marker backs it up; unrelated numbers in file names
/// produce too many false positives otherwise.
fn corroborated(token: &str, address_lower: &str) -> bool {
    match token {
        "1440p" => address_lower.contains("2k"),
        "2160p" => address_lower.contains("4k"),
        _ => true,
    }
}

fn resolve_resolution(tokens: &mut Vec<String>, address: &str) {
    if tokens.iter().any(|t| keyword::is_resolution(t)) {
        return;
    }

    let lower = address.to_lowercase();

    for re in [&*RE_BRACKET_RES, &*RE_DELIM_RES] {
        if let Some(caps) = re.captures(&lower) {
            if let Some(token) = valid_resolution(&caps[1]) {
                if corroborated(&token, &lower) {
                    tokens.insert(0, token);
                    return;
                }
            }
        }
    }

    let fallback = if lower.contains("dvdrip") { "576p" } else { "480p" };
    tokens.insert(0, fallback.to_string());
}

// ── Step 3 ──────────────────────────────────────────────────────

impl AddressFlags {
    /// One pass over the lowercased address.
    pub fn scan(address: &str) -> Self {
        let lower = address.to_lowercase();
        let mut flags = Self::empty();
        if lower.contains("10bit") || lower.contains("10-bit") || lower.contains("10.bit") {
            flags |= Self::TEN_BIT;
        }
        if lower.contains("x265") || lower.contains("h265") || lower.contains("hevc") {
            flags |= Self::X265;
        }
        if lower.contains("6ch") || lower.contains("5.1") {
            flags |= Self::SIX_CH;
        }
        if lower.contains(".3d.") || lower.contains("hsbs") || lower.contains("half-sbs") {
            flags |= Self::THREE_D;
        }
        flags
    }
}

fn has_token(tokens: &[String], token: &str) -> bool {
    tokens.iter().any(|t| t.eq_ignore_ascii_case(token))
}

fn append_address_flags(tokens: &mut Vec<String>, address: &str) {
    let flags = AddressFlags::scan(address);
    if flags.contains(AddressFlags::TEN_BIT) && !has_token(tokens, "10bit") {
        tokens.push("10bit".into());
    }
    if flags.contains(AddressFlags::X265)
        && !has_token(tokens, "x265")
        && !has_token(tokens, "HEVC")
    {
        tokens.push("x265".into());
    }
    if flags.contains(AddressFlags::SIX_CH) && !has_token(tokens, "6CH") {
        tokens.push("6CH".into());
    }
    if flags.contains(AddressFlags::THREE_D) && !has_token(tokens, "3D") {
        tokens.push("3D".into());
    }
}

// ── Step 4 ──────────────────────────────────────────────────────

/// Address segments: maximal alphanumeric runs.
fn address_segments(address: &str) -> Vec<String> {
    address
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn append_release_type(tokens: &mut Vec<String>, address: &str) {
    // Text first: canonicalize the spelling of an existing token in place.
    for t in tokens.iter_mut() {
        if let Some(canonical) = keyword::canonical_release_type(t) {
            *t = canonical.to_string();
            return;
        }
    }

    // Address second: single segments, then joined adjacent pairs so that
    // hyphen-split forms ("web-dl", "blu-ray") still resolve.
    let segments = address_segments(address);
    for seg in &segments {
        // A lone "web" segment is almost always the hostname, not a type.
        if seg.eq_ignore_ascii_case("web") || seg.eq_ignore_ascii_case("ts") {
            continue;
        }
        if let Some(canonical) = keyword::canonical_release_type(seg) {
            tokens.push(canonical.to_string());
            return;
        }
    }
    for pair in segments.windows(2) {
        let joined = format!("{}{}", pair[0], pair[1]);
        if let Some(canonical) = keyword::canonical_release_type(&joined) {
            tokens.push(canonical.to_string());
            return;
        }
    }
}

// ── Step 5 ──────────────────────────────────────────────────────

fn append_encoder(tokens: &mut Vec<String>, address: &str) {
    for t in tokens.iter_mut() {
        if let Some(canonical) = keyword::canonical_encoder(t) {
            *t = canonical.to_string();
            return;
        }
    }

    let segments = address_segments(address);
    let mut candidates: Vec<&'static str> = segments
        .iter()
        .filter_map(|seg| keyword::canonical_encoder(seg))
        .collect();
    candidates.dedup();

    if candidates.len() > 1 {
        candidates.retain(|c| !keyword::is_site_housekeeping(c));
    }
    if let Some(first) = candidates.first() {
        tokens.push((*first).to_string());
    }
}

// ── Step 6 ──────────────────────────────────────────────────────

fn append_episode_range(tokens: &mut Vec<String>, address: &str) {
    if tokens
        .iter()
        .any(|t| order::classify(t) == TokenClass::EpisodeRange)
    {
        return;
    }
    if let Some(caps) = RE_EPISODE_RANGE.captures(address) {
        let start: u32 = caps[1].parse().unwrap_or(0);
        let end: u32 = caps[2].parse().unwrap_or(0);
        // Only a real range; "E05-E05" and reversed junk are dropped.
        if end > start {
            tokens.push(format!("Episode({start}-{end})"));
        }
    }
}

// ── Step 7 ──────────────────────────────────────────────────────

fn append_bonus_marker(tokens: &mut Vec<String>, address: &str) {
    if tokens.iter().any(|t| order::classify(t) == TokenClass::Bonus) {
        return;
    }
    if let Some(caps) = RE_BONUS.captures(address) {
        if let Some(marker) = keyword::canonical_bonus_marker(&caps[1]) {
            match caps.get(2) {
                Some(n) => tokens.push(format!("{marker}({})", n.as_str())),
                None => tokens.push(marker.to_string()),
            }
        }
    }
}

// ── Step 8 ──────────────────────────────────────────────────────

fn append_censorship(tokens: &mut Vec<String>, address: &str) {
    if tokens
        .iter()
        .any(|t| order::classify(t) == TokenClass::Censorship)
    {
        return;
    }
    let lower = address.to_lowercase();
    if lower.contains("uncensored") {
        tokens.push("Uncensored".into());
    } else if lower.contains("censored") {
        tokens.push("Censored".into());
    }
}

// ── Step 9 ──────────────────────────────────────────────────────

pub(crate) fn is_dub_marker(token: &str) -> bool {
    RE_IS_DUB.is_match(token)
}

pub(crate) fn is_sub_marker(token: &str) -> bool {
    RE_IS_SUB.is_match(token)
}

fn resolve_sub_dub(tokens: &mut Vec<String>, address: &str) {
    if !tokens.iter().any(|t| is_dub_marker(t)) {
        if RE_DUB_FARSI.is_match(address) {
            tokens.push("Dubbed(Farsi)".into());
        } else if RE_DUB_ENGLISH.is_match(address) {
            tokens.push("Dubbed(English)".into());
        } else if RE_DUAL_AUDIO.is_match(address) {
            tokens.push("DualAudio".into());
        } else if RE_DUB.is_match(address) {
            tokens.push("Dubbed".into());
        }
    }

    if !tokens.iter().any(|t| is_sub_marker(t)) {
        if RE_KORSUB.is_match(address) {
            tokens.push("KorSub".into());
        } else if RE_HARDSUB.is_match(address) {
            tokens.push("HardSub".into());
        } else if RE_SOFTSUB.is_match(address) {
            tokens.push("SoftSub".into());
        }
    }

    // At most one dub and one sub marker survive.
    let mut seen_dub = false;
    let mut seen_sub = false;
    tokens.retain(|t| {
        if is_dub_marker(t) {
            if seen_dub {
                return false;
            }
            seen_dub = true;
        } else if is_sub_marker(t) {
            if seen_sub {
                return false;
            }
            seen_sub = true;
        }
        true
    });
}

static RE_SIZE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)(MB|GB)").unwrap());

/// Extract a size suffix from a canonical label, in megabytes.
pub fn parse_size_mb(label: &str) -> Option<u64> {
    let caps = RE_SIZE_SUFFIX.captures(label)?;
    let value: f64 = caps[1].parse().ok()?;
    let mb = if caps[2].eq_ignore_ascii_case("GB") {
        value * 1024.0
    } else {
        value
    };
    Some(mb.round() as u64)
}
