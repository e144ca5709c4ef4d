use std::time::Duration;

use jarvisx::memory::ResponseCache;

#[test]
fn capacity_is_a_hard_bound() {
    let mut cache = ResponseCache::new(16, false);
    for i in 0..1000u64 {
        let hash = ResponseCache::query_hash("model", "standard", &format!("question {i}"));
        cache.insert(hash, format!("answer {i}"));
        assert!(cache.len() <= 16, "cache grew past capacity at insert {i}");
    }
    assert_eq!(cache.len(), 16);
}

#[test]
fn eviction_removes_the_oldest_insert() {
    let mut cache = ResponseCache::new(3, false);
    let hashes: Vec<u64> = (0..4)
        .map(|i| ResponseCache::query_hash("m", "standard", &format!("q{i}")))
        .collect();

    for (i, hash) in hashes.iter().enumerate() {
        cache.insert(*hash, format!("a{i}"));
    }

    assert!(cache.get(hashes[0]).is_none(), "oldest entry should be gone");
    assert_eq!(cache.get(hashes[1]).as_deref(), Some("a1"));
    assert_eq!(cache.get(hashes[3]).as_deref(), Some("a3"));
}

#[test]
fn reinserting_a_key_refreshes_its_age() {
    let mut cache = ResponseCache::new(2, false);
    let a = ResponseCache::query_hash("m", "standard", "a");
    let b = ResponseCache::query_hash("m", "standard", "b");
    let c = ResponseCache::query_hash("m", "standard", "c");

    cache.insert(a, "1");
    cache.insert(b, "2");
    // a becomes the newest insert, so b is evicted next.
    cache.insert(a, "1-again");
    cache.insert(c, "3");

    assert_eq!(cache.get(a).as_deref(), Some("1-again"));
    assert!(cache.get(b).is_none());
    assert_eq!(cache.get(c).as_deref(), Some("3"));
}

#[test]
fn hits_bump_the_access_count() {
    let mut cache = ResponseCache::new(4, false);
    let hash = ResponseCache::query_hash("m", "standard", "q");
    cache.insert(hash, "a");
    assert_eq!(cache.access_count(hash), Some(1));

    cache.get(hash);
    cache.get(hash);
    assert_eq!(cache.access_count(hash), Some(3));
}

#[test]
fn hash_differs_across_model_and_personality() {
    let base = ResponseCache::query_hash("m1", "standard", "q");
    assert_ne!(base, ResponseCache::query_hash("m2", "standard", "q"));
    assert_ne!(base, ResponseCache::query_hash("m1", "sarcastic", "q"));
    assert_eq!(base, ResponseCache::query_hash("m1", "standard", "q"));
}

#[test]
fn zero_ttl_entries_expire_on_the_next_sweep() {
    let mut cache = ResponseCache::with_policy(16, false, Duration::ZERO, 1);
    let hash = ResponseCache::query_hash("m", "standard", "q");
    cache.insert(hash, "a");

    let removed = cache.cleanup();
    assert_eq!(removed, 1);
    assert!(cache.is_empty());
}

#[test]
fn frequently_read_entries_survive_expiry() {
    let mut cache = ResponseCache::with_policy(16, false, Duration::ZERO, 1);
    let hash = ResponseCache::query_hash("m", "standard", "q");
    cache.insert(hash, "a");
    cache.get(hash);
    cache.get(hash);

    let removed = cache.cleanup();
    assert_eq!(removed, 0);
    assert_eq!(cache.get(hash).as_deref(), Some("a"));
}

#[test]
fn aggressive_mode_prunes_when_nearly_full() {
    // Interval high enough that only the aggressive path runs.
    let mut cache = ResponseCache::with_policy(10, true, Duration::from_secs(3600), 1000);
    let hashes: Vec<u64> = (0..9)
        .map(|i| ResponseCache::query_hash("m", "standard", &format!("q{i}")))
        .collect();
    for (i, hash) in hashes.iter().enumerate() {
        cache.insert(*hash, format!("a{i}"));
    }
    // Everything except the first entry gets extra reads.
    for hash in &hashes[1..] {
        cache.get(*hash);
        cache.get(*hash);
    }

    let removed = cache.cleanup();
    assert_eq!(removed, 1);
    assert!(cache.get(hashes[0]).is_none(), "least-used entry should be pruned");
    assert_eq!(cache.len(), 8);
}

#[test]
fn non_aggressive_mode_never_prunes_for_pressure() {
    let mut cache = ResponseCache::with_policy(10, false, Duration::from_secs(3600), 1000);
    for i in 0..9u64 {
        let hash = ResponseCache::query_hash("m", "standard", &format!("q{i}"));
        cache.insert(hash, "a");
    }
    assert_eq!(cache.cleanup(), 0);
    assert_eq!(cache.len(), 9);
}
