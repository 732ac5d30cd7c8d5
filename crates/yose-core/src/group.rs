use crate::config::RankPolicy;
use crate::dedup::{dedup_links, DedupMode};
use crate::models::{Bucket, BucketKey, CanonicalLink, QualityTier};
use crate::quality;

fn push_into(bucket: &mut Bucket, link: CanonicalLink) {
    if link.link_kind.is_torrent() {
        bucket.torrent_links.push(link);
    } else if link.link_kind == crate::models::LinkKind::WatchOnline {
        bucket.watch_online_links.push(link);
    } else {
        bucket.direct_links.push(link);
    }
}

fn finish(buckets: &mut [Bucket], policy: &RankPolicy) {
    for bucket in buckets.iter_mut() {
        bucket.direct_links = dedup_links(std::mem::take(&mut bucket.direct_links), DedupMode::KeepFirst);
        bucket.watch_online_links =
            dedup_links(std::mem::take(&mut bucket.watch_online_links), DedupMode::KeepFirst);
        bucket.torrent_links =
            dedup_links(std::mem::take(&mut bucket.torrent_links), DedupMode::KeepFirst);

        quality::sort_best_first(&mut bucket.direct_links, policy, false);
        quality::sort_best_first(&mut bucket.watch_online_links, policy, false);
        // Torrent labels are noisier; use the tolerant ranker.
        quality::sort_best_first(&mut bucket.torrent_links, policy, true);
    }
}

/// Partition movie links into the six fixed quality tiers.
/// The first tier whose token appears in the label wins; no match → others.
pub fn group_movie_links(links: Vec<CanonicalLink>, policy: &RankPolicy) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = Vec::new();

    for link in links {
        let tier = QualityTier::match_label(&link.info_label);
        let key = BucketKey::Tier(tier);
        let bucket = match buckets.iter_mut().find(|b| b.key == key) {
            Some(b) => b,
            None => {
                buckets.push(Bucket::new(key));
                buckets.last_mut().unwrap()
            }
        };
        push_into(bucket, link);
    }

    buckets.sort_by_key(|b| b.key);
    finish(&mut buckets, policy);
    buckets
}

/// Partition serial links by (season, episode), buckets created lazily and
/// sorted season-then-episode ascending.
pub fn group_serial_links(links: Vec<CanonicalLink>, policy: &RankPolicy) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = Vec::new();

    for link in links {
        let key = BucketKey::Episode {
            season: link.season,
            episode: link.episode,
        };
        let bucket = match buckets.iter_mut().find(|b| b.key == key) {
            Some(b) => b,
            None => {
                buckets.push(Bucket::new(key));
                buckets.last_mut().unwrap()
            }
        };
        push_into(bucket, link);
    }

    buckets.sort_by_key(|b| b.key);
    finish(&mut buckets, policy);
    buckets
}
