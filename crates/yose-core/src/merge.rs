use std::collections::HashSet;

use tracing::debug;

use crate::config::EnginePolicy;
use crate::models::{Bucket, BucketKey, Catalog, CanonicalLink, SeasonKind};
use crate::quality;

/// Which replaceable sub-list a patch op targets. Torrent links are never
/// replaced; their provenance is not reliably re-crawlable per source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Direct,
    WatchOnline,
}

/// One mutation the diff pass derived.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOp {
    /// A fresh bucket with no persisted counterpart.
    CreateBucket(Bucket),
    /// Swap one source's contribution to one sub-list.
    ReplaceSourceLinks {
        key: BucketKey,
        slot: SlotKind,
        links: Vec<CanonicalLink>,
    },
    /// Write-once union into the torrent sub-list.
    AppendTorrents {
        key: BucketKey,
        links: Vec<CanonicalLink>,
    },
    /// The source stopped serving this bucket; shed its direct and
    /// watch-online entries.
    StripSource { key: BucketKey },
}

/// Everything one merge cycle wants to do to the catalog, computed without
/// touching it.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPatch {
    pub source: String,
    pub ops: Vec<PatchOp>,
}

impl CatalogPatch {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

fn source_links<'a>(links: &'a [CanonicalLink], source: &str) -> Vec<&'a CanonicalLink> {
    links.iter().filter(|l| l.source_name == source).collect()
}

/// Deep positional comparison: differs in count or in any field.
fn differs(prior: &[&CanonicalLink], fresh: &[CanonicalLink]) -> bool {
    prior.len() != fresh.len() || prior.iter().zip(fresh).any(|(a, b)| *a != b)
}

/// The furthest episode of `season` that has non-torrent content, looking at
/// both the persisted catalog and the fresh buckets.
fn non_torrent_frontier(catalog: &Catalog, fresh: &[Bucket], season: SeasonKind) -> Option<u32> {
    catalog
        .buckets
        .iter()
        .chain(fresh.iter())
        .filter(|b| b.has_non_torrent_content())
        .filter_map(|b| match b.key {
            BucketKey::Episode {
                season: s,
                episode,
            } if s == season => Some(episode),
            _ => None,
        })
        .max()
}

/// A torrent-only episode far past everything a direct link confirms is a
/// near-duplicate misread (a batch pack, a mislabeled special), not news.
fn is_torrent_outlier(
    catalog: &Catalog,
    fresh: &[Bucket],
    bucket: &Bucket,
    policy: &EnginePolicy,
) -> bool {
    if bucket.has_non_torrent_content() || bucket.torrent_links.is_empty() {
        return false;
    }
    let BucketKey::Episode { season, episode } = bucket.key else {
        return false;
    };
    match non_torrent_frontier(catalog, fresh, season) {
        Some(frontier) => episode > frontier + policy.torrent_episode_gap,
        None => false,
    }
}

/// Compute the patch that reconciles one source's freshly grouped buckets
/// against the persisted catalog. Pure: the catalog is not touched.
pub fn diff(
    catalog: &Catalog,
    fresh_buckets: &[Bucket],
    source: &str,
    policy: &EnginePolicy,
) -> CatalogPatch {
    let mut ops = Vec::new();
    let mut touched: HashSet<BucketKey> = HashSet::new();

    for fresh in fresh_buckets {
        if fresh.is_empty() {
            continue;
        }
        if is_torrent_outlier(catalog, fresh_buckets, fresh, policy) {
            debug!(key = ?fresh.key, "Dropping torrent-only outlier bucket");
            continue;
        }
        touched.insert(fresh.key);

        let Some(existing) = catalog.find(fresh.key) else {
            ops.push(PatchOp::CreateBucket(fresh.clone()));
            continue;
        };

        let prior_direct = source_links(&existing.direct_links, source);
        if differs(&prior_direct, &fresh.direct_links) {
            ops.push(PatchOp::ReplaceSourceLinks {
                key: fresh.key,
                slot: SlotKind::Direct,
                links: fresh.direct_links.clone(),
            });
        }

        let prior_watch = source_links(&existing.watch_online_links, source);
        if differs(&prior_watch, &fresh.watch_online_links) {
            ops.push(PatchOp::ReplaceSourceLinks {
                key: fresh.key,
                slot: SlotKind::WatchOnline,
                links: fresh.watch_online_links.clone(),
            });
        }

        let new_torrents: Vec<CanonicalLink> = fresh
            .torrent_links
            .iter()
            .filter(|l| {
                !existing
                    .torrent_links
                    .iter()
                    .any(|e| e.target_address == l.target_address)
            })
            .cloned()
            .collect();
        if !new_torrents.is_empty() {
            ops.push(PatchOp::AppendTorrents {
                key: fresh.key,
                links: new_torrents,
            });
        }
    }

    // Buckets this source used to feed but did not touch this cycle: the
    // release was removed or renamed on the site.
    for persisted in &catalog.buckets {
        if touched.contains(&persisted.key) {
            continue;
        }
        let had_any = persisted
            .direct_links
            .iter()
            .chain(&persisted.watch_online_links)
            .any(|l| l.source_name == source);
        if had_any {
            ops.push(PatchOp::StripSource { key: persisted.key });
        }
    }

    CatalogPatch {
        source: source.to_string(),
        ops,
    }
}

/// Apply a patch, re-sorting the sub-lists it touched.
/// Returns whether anything actually changed.
pub fn apply(catalog: &mut Catalog, patch: &CatalogPatch, policy: &EnginePolicy) -> bool {
    let mut changed = false;

    for op in &patch.ops {
        match op {
            PatchOp::CreateBucket(bucket) => {
                if catalog.find(bucket.key).is_some() {
                    continue;
                }
                debug!(key = ?bucket.key, "New bucket");
                let mut bucket = bucket.clone();
                quality::sort_best_first(&mut bucket.direct_links, &policy.rank, false);
                quality::sort_best_first(&mut bucket.watch_online_links, &policy.rank, false);
                quality::sort_best_first(&mut bucket.torrent_links, &policy.rank, true);
                catalog.insert(bucket);
                changed = true;
            }
            PatchOp::ReplaceSourceLinks { key, slot, links } => {
                let Some(bucket) = catalog.find_mut(*key) else {
                    continue;
                };
                let list = match slot {
                    SlotKind::Direct => &mut bucket.direct_links,
                    SlotKind::WatchOnline => &mut bucket.watch_online_links,
                };
                debug!(key = ?key, slot = ?slot, count = links.len(), "Replacing source links");
                list.retain(|l| l.source_name != patch.source);
                list.extend(links.iter().cloned());
                quality::sort_best_first(list, &policy.rank, false);
                changed = true;
            }
            PatchOp::AppendTorrents { key, links } => {
                let Some(bucket) = catalog.find_mut(*key) else {
                    continue;
                };
                let before = bucket.torrent_links.len();
                for link in links {
                    if !bucket
                        .torrent_links
                        .iter()
                        .any(|e| e.target_address == link.target_address)
                    {
                        bucket.torrent_links.push(link.clone());
                    }
                }
                if bucket.torrent_links.len() != before {
                    debug!(key = ?key, added = bucket.torrent_links.len() - before, "Appended torrents");
                    quality::sort_best_first(&mut bucket.torrent_links, &policy.rank, true);
                    changed = true;
                }
            }
            PatchOp::StripSource { key } => {
                let Some(bucket) = catalog.find_mut(*key) else {
                    continue;
                };
                let before =
                    bucket.direct_links.len() + bucket.watch_online_links.len();
                bucket.direct_links.retain(|l| l.source_name != patch.source);
                bucket
                    .watch_online_links
                    .retain(|l| l.source_name != patch.source);
                if bucket.direct_links.len() + bucket.watch_online_links.len() != before {
                    debug!(key = ?key, source = %patch.source, "Stripped stale source links");
                    changed = true;
                }
            }
        }
    }

    changed
}

/// One merge cycle: reconcile one source's fresh buckets into the catalog.
///
/// The caller owns the single-writer-per-title contract: the `&mut Catalog`
/// it passes must be the only in-flight handle for this title. The engine
/// itself takes no locks.
pub fn merge(
    catalog: &mut Catalog,
    fresh_buckets: &[Bucket],
    source: &str,
    policy: &EnginePolicy,
) -> bool {
    let patch = diff(catalog, fresh_buckets, source, policy);
    apply(catalog, &patch, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RankPolicy;
    use crate::group::group_serial_links;
    use crate::models::{LinkKind, SeasonKind};

    fn mk(address: &str, label: &str, source: &str, season: u32, episode: u32, kind: LinkKind) -> CanonicalLink {
        CanonicalLink {
            target_address: address.into(),
            info_label: label.into(),
            season: SeasonKind::Numbered(season),
            episode,
            source_name: source.into(),
            link_kind: kind,
            size_mb: None,
            quality_sample: None,
        }
    }

    fn grouped(links: Vec<CanonicalLink>) -> Vec<Bucket> {
        group_serial_links(links, &RankPolicy::default())
    }

    #[test]
    fn test_first_merge_creates_buckets() {
        let mut catalog = Catalog::default();
        let fresh = grouped(vec![
            mk("a", "720p.WEB-DL", "siteA", 1, 1, LinkKind::Direct),
            mk("b", "720p.WEB-DL", "siteA", 1, 2, LinkKind::Direct),
        ]);
        let changed = merge(&mut catalog, &fresh, "siteA", &EnginePolicy::default());
        assert!(changed);
        assert_eq!(catalog.buckets.len(), 2);
    }

    #[test]
    fn test_idempotent_second_merge() {
        let mut catalog = Catalog::default();
        let fresh = grouped(vec![mk("a", "720p.WEB-DL", "siteA", 1, 1, LinkKind::Direct)]);
        assert!(merge(&mut catalog, &fresh, "siteA", &EnginePolicy::default()));
        assert!(!merge(&mut catalog, &fresh, "siteA", &EnginePolicy::default()));
    }

    #[test]
    fn test_merge_removal_moves_source() {
        // Source A's link moves from episode 1 to episode 2: the old bucket
        // loses A's entries, the new bucket appears, changed is true.
        let mut catalog = Catalog::default();
        let policy = EnginePolicy::default();
        let first = grouped(vec![
            mk("a1", "720p.WEB-DL", "siteA", 1, 1, LinkKind::Direct),
            mk("b1", "720p.WEB-DL", "siteB", 1, 1, LinkKind::Direct),
        ]);
        merge(&mut catalog, &first, "siteA", &policy);

        let second = grouped(vec![mk("a2", "720p.WEB-DL", "siteA", 1, 2, LinkKind::Direct)]);
        let changed = merge(&mut catalog, &second, "siteA", &policy);
        assert!(changed);

        let ep1 = catalog
            .find(BucketKey::Episode {
                season: SeasonKind::Numbered(1),
                episode: 1,
            })
            .unwrap();
        assert!(ep1.direct_links.iter().all(|l| l.source_name != "siteA"));
        assert!(ep1.direct_links.iter().any(|l| l.source_name == "siteB"));

        let ep2 = catalog
            .find(BucketKey::Episode {
                season: SeasonKind::Numbered(1),
                episode: 2,
            })
            .unwrap();
        assert_eq!(ep2.direct_links.len(), 1);
    }

    #[test]
    fn test_other_sources_untouched_by_replace() {
        let mut catalog = Catalog::default();
        let policy = EnginePolicy::default();
        merge(
            &mut catalog,
            &grouped(vec![mk("b1", "1080p.WEB-DL", "siteB", 1, 1, LinkKind::Direct)]),
            "siteB",
            &policy,
        );
        merge(
            &mut catalog,
            &grouped(vec![mk("a1", "720p.WEB-DL", "siteA", 1, 1, LinkKind::Direct)]),
            "siteA",
            &policy,
        );

        let bucket = &catalog.buckets[0];
        assert_eq!(bucket.direct_links.len(), 2);
        // Sorted best-first across sources.
        assert_eq!(bucket.direct_links[0].info_label, "1080p.WEB-DL");
    }

    #[test]
    fn test_replace_on_label_change() {
        let mut catalog = Catalog::default();
        let policy = EnginePolicy::default();
        merge(
            &mut catalog,
            &grouped(vec![mk("a1", "720p.WEB-DL", "siteA", 1, 1, LinkKind::Direct)]),
            "siteA",
            &policy,
        );
        // Same address, better label: deep comparison sees the difference.
        let changed = merge(
            &mut catalog,
            &grouped(vec![mk("a1", "720p.BluRay", "siteA", 1, 1, LinkKind::Direct)]),
            "siteA",
            &policy,
        );
        assert!(changed);
        assert_eq!(catalog.buckets[0].direct_links[0].info_label, "720p.BluRay");
    }

    #[test]
    fn test_torrent_append_union_never_shrinks() {
        let mut catalog = Catalog::default();
        let policy = EnginePolicy::default();
        merge(
            &mut catalog,
            &grouped(vec![
                mk("t1", "720p.WEB-DL", "siteA", 1, 1, LinkKind::Torrent),
                mk("t2", "1080p.WEB-DL", "siteA", 1, 1, LinkKind::Torrent),
            ]),
            "siteA",
            &policy,
        );
        // Overlapping second crawl with one entry missing.
        let changed = merge(
            &mut catalog,
            &grouped(vec![mk("t1", "720p.WEB-DL", "siteA", 1, 1, LinkKind::Torrent)]),
            "siteA",
            &policy,
        );
        assert!(!changed);
        assert_eq!(catalog.buckets[0].torrent_links.len(), 2);
    }

    #[test]
    fn test_torrent_only_bucket_not_stripped() {
        // Torrent contributions survive a cycle that does not mention them.
        let mut catalog = Catalog::default();
        let policy = EnginePolicy::default();
        merge(
            &mut catalog,
            &grouped(vec![mk("t1", "720p.WEB-DL", "siteA", 1, 1, LinkKind::Torrent)]),
            "siteA",
            &policy,
        );
        let changed = merge(
            &mut catalog,
            &grouped(vec![mk("a2", "720p.WEB-DL", "siteA", 1, 2, LinkKind::Direct)]),
            "siteA",
            &policy,
        );
        assert!(changed);
        let ep1 = catalog
            .find(BucketKey::Episode {
                season: SeasonKind::Numbered(1),
                episode: 1,
            })
            .unwrap();
        assert_eq!(ep1.torrent_links.len(), 1);
    }

    #[test]
    fn test_torrent_outlier_dropped() {
        let mut catalog = Catalog::default();
        let policy = EnginePolicy::default();
        merge(
            &mut catalog,
            &grouped(vec![mk("a1", "720p.WEB-DL", "siteA", 1, 3, LinkKind::Direct)]),
            "siteA",
            &policy,
        );
        // Episode 3 is the direct frontier; a torrent-only episode 20 is an
        // outlier (gap 6), episode 9 is not.
        let changed = merge(
            &mut catalog,
            &grouped(vec![
                mk("t20", "720p.WEB-DL", "siteB", 1, 20, LinkKind::Torrent),
                mk("t9", "720p.WEB-DL", "siteB", 1, 9, LinkKind::Torrent),
            ]),
            "siteB",
            &policy,
        );
        assert!(changed);
        assert!(catalog
            .find(BucketKey::Episode {
                season: SeasonKind::Numbered(1),
                episode: 20,
            })
            .is_none());
        assert!(catalog
            .find(BucketKey::Episode {
                season: SeasonKind::Numbered(1),
                episode: 9,
            })
            .is_some());
    }

    #[test]
    fn test_diff_is_pure() {
        let catalog = Catalog::default();
        let fresh = grouped(vec![mk("a", "720p.WEB-DL", "siteA", 1, 1, LinkKind::Direct)]);
        let before = catalog.clone();
        let patch = diff(&catalog, &fresh, "siteA", &EnginePolicy::default());
        assert_eq!(catalog, before);
        assert_eq!(patch.ops.len(), 1);
    }
}
