use std::collections::HashMap;

use yose_parse::keyword;
use yose_parse::order::split_tokens;

use crate::models::CanonicalLink;

/// What to do when a later entry shares a target address with a kept one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupMode {
    /// First occurrence wins outright.
    KeepFirst,
    /// Adopt the later label when it is strictly longer. Length is not
    /// correctness, but longer labels usually carry more metadata.
    ReplaceInfo,
    /// Adopt the later label only when it fixes a concrete deficiency:
    /// a missing leading resolution token, or non-Latin script the later
    /// label does not have.
    ReplaceBadInfoOnly,
}

fn starts_with_resolution(label: &str) -> bool {
    split_tokens(label)
        .first()
        .is_some_and(|t| keyword::is_resolution(t))
}

fn has_non_latin(label: &str) -> bool {
    label.chars().any(|c| c.is_alphabetic() && !c.is_ascii())
}

/// Deduplicate a link list by target address, preserving first-seen order.
pub fn dedup_links(links: Vec<CanonicalLink>, mode: DedupMode) -> Vec<CanonicalLink> {
    let mut kept: Vec<CanonicalLink> = Vec::with_capacity(links.len());
    let mut by_address: HashMap<String, usize> = HashMap::new();

    for link in links {
        match by_address.get(&link.target_address) {
            None => {
                by_address.insert(link.target_address.clone(), kept.len());
                kept.push(link);
            }
            Some(&i) => {
                let current = &mut kept[i];
                let adopt = match mode {
                    DedupMode::KeepFirst => false,
                    DedupMode::ReplaceInfo => {
                        link.info_label.len() > current.info_label.len()
                    }
                    DedupMode::ReplaceBadInfoOnly => {
                        (!starts_with_resolution(&current.info_label)
                            && starts_with_resolution(&link.info_label))
                            || (has_non_latin(&current.info_label)
                                && !has_non_latin(&link.info_label))
                    }
                };
                if adopt {
                    current.info_label = link.info_label;
                }
            }
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LinkKind, SeasonKind};

    fn mk(address: &str, label: &str) -> CanonicalLink {
        CanonicalLink {
            target_address: address.into(),
            info_label: label.into(),
            season: SeasonKind::NotApplicable,
            episode: 0,
            source_name: "s".into(),
            link_kind: LinkKind::Direct,
            size_mb: None,
            quality_sample: None,
        }
    }

    #[test]
    fn test_keep_first() {
        let out = dedup_links(
            vec![mk("a", "720p"), mk("a", "720p.WEB-DL.x265"), mk("b", "480p")],
            DedupMode::KeepFirst,
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].info_label, "720p");
        assert_eq!(out[1].info_label, "480p");
    }

    #[test]
    fn test_replace_info_longer_wins() {
        let out = dedup_links(
            vec![mk("a", "720p"), mk("a", "720p.WEB-DL.x265")],
            DedupMode::ReplaceInfo,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].info_label, "720p.WEB-DL.x265");
    }

    #[test]
    fn test_replace_info_equal_length_keeps_first() {
        let out = dedup_links(
            vec![mk("a", "720p.BluRay"), mk("a", "720p.WEB-DL")],
            DedupMode::ReplaceInfo,
        );
        assert_eq!(out[0].info_label, "720p.BluRay");
    }

    #[test]
    fn test_replace_bad_info_missing_resolution() {
        let out = dedup_links(
            vec![mk("a", "WEB-DL.x265"), mk("a", "720p.WEB-DL")],
            DedupMode::ReplaceBadInfoOnly,
        );
        assert_eq!(out[0].info_label, "720p.WEB-DL");
    }

    #[test]
    fn test_replace_bad_info_non_latin() {
        let out = dedup_links(
            vec![mk("a", "720p.نامشخص"), mk("a", "720p.WEB-DL")],
            DedupMode::ReplaceBadInfoOnly,
        );
        assert_eq!(out[0].info_label, "720p.WEB-DL");
    }

    #[test]
    fn test_replace_bad_info_keeps_good_label() {
        // The kept label has no deficiency: a longer later label changes nothing.
        let out = dedup_links(
            vec![mk("a", "720p.WEB-DL"), mk("a", "720p.WEB-DL.x265.PSA")],
            DedupMode::ReplaceBadInfoOnly,
        );
        assert_eq!(out[0].info_label, "720p.WEB-DL");
    }
}
