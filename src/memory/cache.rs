use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};
use tracing::debug;

/// Interactions between cleanup passes.
const DEFAULT_CLEANUP_INTERVAL: u64 = 50;
/// Entries younger than this survive the expiry sweep regardless of use.
const DEFAULT_ENTRY_TTL: Duration = Duration::from_secs(3600);
/// Entries accessed at least this often survive the expiry sweep.
const MIN_ACCESS_TO_KEEP: u32 = 3;

#[derive(Debug, Clone)]
struct CacheEntry {
    response: String,
    inserted_at: Instant,
    last_accessed: Instant,
    access_count: u32,
}

/// Bounded response cache keyed by query hash.
///
/// Capacity is a hard bound: an insert at capacity evicts the
/// oldest-inserted entry first. `cleanup` runs two additional policies:
/// an expiry sweep every `cleanup_interval` interactions, and (in
/// aggressive mode) pruning the least-used 20% once the cache passes
/// 80% full.
pub struct ResponseCache {
    entries: HashMap<u64, CacheEntry>,
    insertion_order: VecDeque<u64>,
    capacity: usize,
    aggressive: bool,
    interaction_count: u64,
    cleanup_interval: u64,
    entry_ttl: Duration,
}

impl ResponseCache {
    pub fn new(capacity: usize, aggressive: bool) -> Self {
        Self {
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
            capacity: capacity.max(1),
            aggressive,
            interaction_count: 0,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            entry_ttl: DEFAULT_ENTRY_TTL,
        }
    }

    pub fn with_policy(capacity: usize, aggressive: bool, ttl: Duration, interval: u64) -> Self {
        let mut cache = Self::new(capacity, aggressive);
        cache.entry_ttl = ttl;
        cache.cleanup_interval = interval.max(1);
        cache
    }

    /// Hash a query together with the model and personality it was answered
    /// under, so a mode switch never replays a stale reply.
    pub fn query_hash(model: &str, personality: &str, message: &str) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        model.hash(&mut hasher);
        personality.hash(&mut hasher);
        message.hash(&mut hasher);
        hasher.finish()
    }

    /// Store a response. Evicts the oldest-inserted entry when at capacity.
    pub fn insert(&mut self, hash: u64, response: impl Into<String>) {
        if self.entries.contains_key(&hash) {
            self.insertion_order.retain(|h| *h != hash);
        } else if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.insertion_order.pop_front() {
                self.entries.remove(&oldest);
                debug!(oldest, "evicted oldest cache entry");
            }
        }

        let now = Instant::now();
        self.entries.insert(
            hash,
            CacheEntry {
                response: response.into(),
                inserted_at: now,
                last_accessed: now,
                access_count: 1,
            },
        );
        self.insertion_order.push_back(hash);
    }

    /// Fetch a cached response, bumping its access count.
    pub fn get(&mut self, hash: u64) -> Option<String> {
        let entry = self.entries.get_mut(&hash)?;
        entry.access_count += 1;
        entry.last_accessed = Instant::now();
        Some(entry.response.clone())
    }

    /// Record one interaction and run the periodic policies.
    /// Returns the number of entries removed by this call.
    pub fn cleanup(&mut self) -> usize {
        self.interaction_count += 1;
        let mut removed = 0;

        if self.interaction_count % self.cleanup_interval == 0 {
            removed += self.sweep_expired();
        }

        if self.aggressive && self.entries.len() * 10 > self.capacity * 8 {
            removed += self.prune_least_used();
        }

        removed
    }

    /// Drop entries past the TTL that were rarely read.
    fn sweep_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired: Vec<u64> = self
            .entries
            .iter()
            .filter(|(_, e)| {
                now.duration_since(e.inserted_at) >= self.entry_ttl
                    && e.access_count < MIN_ACCESS_TO_KEEP
            })
            .map(|(h, _)| *h)
            .collect();

        for hash in &expired {
            self.entries.remove(hash);
        }
        self.insertion_order.retain(|h| self.entries.contains_key(h));

        if !expired.is_empty() {
            debug!(count = expired.len(), "expired cache entries removed");
        }
        expired.len()
    }

    /// Drop the bottom 20% of entries by access count.
    fn prune_least_used(&mut self) -> usize {
        let mut ranked: Vec<(u64, u32)> = self
            .entries
            .iter()
            .map(|(h, e)| (*h, e.access_count))
            .collect();
        ranked.sort_by_key(|(_, count)| *count);

        let to_remove = ranked.len() / 5;
        for (hash, _) in ranked.into_iter().take(to_remove) {
            self.entries.remove(&hash);
        }
        self.insertion_order.retain(|h| self.entries.contains_key(h));

        if to_remove > 0 {
            debug!(count = to_remove, "pruned least-used cache entries");
        }
        to_remove
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn access_count(&self, hash: u64) -> Option<u32> {
        self.entries.get(&hash).map(|e| e.access_count)
    }

    pub fn interaction_count(&self) -> u64 {
        self.interaction_count
    }
}
