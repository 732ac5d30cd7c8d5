use yose_parse::keyword;
use yose_parse::order::split_tokens;

use crate::config::RankPolicy;
use crate::models::CanonicalLink;

/// Rank of a sub/dub/censorship marker: censored < dubbed < hard-sub <
/// soft-sub. Used only to break ties when both labels carry one.
fn marker_rank(token: &str) -> Option<u8> {
    let lower = token.to_lowercase();
    if lower == "censored" || lower == "uncensored" {
        Some(0)
    } else if lower.starts_with("dubbed") || lower == "dualaudio" {
        Some(1)
    } else if lower.starts_with("hardsub") || lower == "korsub" {
        Some(2)
    } else if lower == "softsub" {
        Some(3)
    } else {
        None
    }
}

fn is_efficient(token: &str) -> bool {
    token.eq_ignore_ascii_case("x265")
        || token.eq_ignore_ascii_case("hevc")
        || token.eq_ignore_ascii_case("10bit")
}

/// Comparison-relevant features of one info label.
#[derive(Debug, Default)]
struct LabelTraits {
    resolution: Option<usize>,
    release_type: Option<usize>,
    efficient: bool,
    marker: Option<u8>,
    encoder: Option<usize>,
}

fn traits(label: &str) -> LabelTraits {
    let mut t = LabelTraits::default();
    for token in split_tokens(label) {
        if t.resolution.is_none() {
            t.resolution = keyword::resolution_rank(&token);
        }
        if t.release_type.is_none() {
            t.release_type = keyword::release_type_rank(&token);
        }
        if !t.efficient {
            t.efficient = is_efficient(&token);
        }
        if t.marker.is_none() {
            t.marker = marker_rank(&token);
        }
        if t.encoder.is_none() {
            t.encoder = keyword::encoder_rank(&token);
        }
    }
    t
}

/// As `traits`, but a bare resolution number anywhere in the label counts.
/// Torrent labels routinely drop the trailing "p".
fn traits_tolerant(label: &str) -> LabelTraits {
    let mut t = traits(label);
    if t.resolution.is_none() {
        for token in split_tokens(label) {
            if token.chars().all(|c| c.is_ascii_digit()) {
                if let Some(rank) = keyword::resolution_rank(&format!("{token}p")) {
                    t.resolution = Some(rank);
                    break;
                }
            }
        }
    }
    t
}

fn compare(a: &LabelTraits, b: &LabelTraits, policy: &RankPolicy) -> bool {
    // Rule 1: a higher resolution wins, irrespective of everything else.
    if a.resolution != b.resolution {
        return a.resolution > b.resolution;
    }

    // Rule 2: the distribution-type ladder.
    if a.release_type != b.release_type {
        return a.release_type > b.release_type;
    }

    // Rule 3: efficiency bonus for x265/10bit.
    if a.efficient != b.efficient {
        return a.efficient;
    }

    // Rule 4: sub/dub/censorship markers. One-sided presence is decided by
    // policy; two-sided by the fixed marker ranking.
    match (a.marker, b.marker) {
        (Some(x), Some(y)) if x != y => return x > y,
        (Some(_), None) => return policy.sub_is_better,
        (None, Some(_)) => return !policy.sub_is_better,
        _ => {}
    }

    // Rule 5: reputable-encoder ranking; otherwise neither is better.
    match (a.encoder, b.encoder) {
        (Some(x), Some(y)) if x != y => x > y,
        (Some(_), None) => true,
        (None, Some(_)) => false,
        _ => false,
    }
}

/// Strict "is `a` a better release than `b`" comparator.
/// Never true both ways; equal labels are not better than each other.
pub fn is_better(a: &str, b: &str, policy: &RankPolicy) -> bool {
    compare(&traits(a), &traits(b), policy)
}

/// Malformed-info-tolerant variant for torrent labels: a bare resolution
/// number found anywhere in the label is honored before the usual rules.
pub fn is_better_tolerant(a: &str, b: &str, policy: &RankPolicy) -> bool {
    compare(&traits_tolerant(a), &traits_tolerant(b), policy)
}

/// Sort links best-first.
pub fn sort_best_first(links: &mut [CanonicalLink], policy: &RankPolicy, tolerant: bool) {
    links.sort_by(|x, y| {
        let better = if tolerant {
            is_better_tolerant(&x.info_label, &y.info_label, policy)
        } else {
            is_better(&x.info_label, &y.info_label, policy)
        };
        let worse = if tolerant {
            is_better_tolerant(&y.info_label, &x.info_label, policy)
        } else {
            is_better(&y.info_label, &x.info_label, policy)
        };
        if better {
            std::cmp::Ordering::Less
        } else if worse {
            std::cmp::Ordering::Greater
        } else {
            std::cmp::Ordering::Equal
        }
    });
}
