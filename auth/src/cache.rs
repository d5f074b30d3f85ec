//! Short-lived store of already authenticated principals.
//!
//! Entries expire `ttl` after insertion. Expiry is checked on every read, so an
//! expired entry is never returned even if no sweep has removed it yet. When a
//! capacity is configured, inserting a new key into a full cache evicts the
//! oldest inserted entry first.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use parking_lot::Mutex;

use crate::clock::Clock;
use crate::identity::Identity;

/// Default entry lifetime (1 minute).
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

struct CacheEntry<V> {
    value: V,
    inserted_at: DateTime<Utc>,
    sequence: u64,
}

struct CacheState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    /// Insertion order. Holds stale (key, sequence) pairs after overwrites,
    /// skipped on eviction and dropped by `compact`.
    order: VecDeque<(String, u64)>,
    next_sequence: u64,
}

impl<V> CacheState<V> {
    fn is_current(&self, key: &str, sequence: u64) -> bool {
        self.entries
            .get(key)
            .map_or(false, |entry| entry.sequence == sequence)
    }

    fn evict_oldest(&mut self) -> Option<String> {
        while let Some((key, sequence)) = self.order.pop_front() {
            if self.is_current(&key, sequence) {
                self.entries.remove(&key);
                return Some(key);
            }
        }
        None
    }

    fn sweep_front(&mut self, now: DateTime<Utc>, ttl: Duration) {
        while let Some((key, sequence)) = self.order.front() {
            match self.entries.get(key) {
                Some(entry) if entry.sequence == *sequence => {
                    if !is_expired(entry.inserted_at, now, ttl) {
                        break;
                    }
                    self.entries.remove(key);
                }
                _ => {}
            }
            self.order.pop_front();
        }
    }

    fn compact(&mut self) {
        if self.order.len() <= self.entries.len() * 2 + 32 {
            return;
        }
        let entries = &self.entries;
        self.order.retain(|(key, sequence)| {
            entries
                .get(key)
                .map_or(false, |entry| entry.sequence == *sequence)
        });
    }
}

fn is_expired(inserted_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    // A clock that moved backwards counts as no time elapsed.
    match (now - inserted_at).to_std() {
        Ok(elapsed) => elapsed > ttl,
        Err(_) => false,
    }
}

/// Capacity and TTL bounded map from principal name to a cached value.
///
/// All operations take a single lock, so concurrent `get`/`put` calls are
/// linearizable and an entry is visible only once fully inserted.
pub struct AuthCache<V = Identity> {
    state: Mutex<CacheState<V>>,
    ttl: Duration,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> AuthCache<V> {
    /// Create a new cache.
    ///
    /// # Arguments
    /// * `ttl` - Lifetime of an entry after insertion
    /// * `capacity` - Maximum number of entries (0 = bounded only by TTL)
    /// * `clock` - Time source for insertion and expiry
    pub fn new(ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                order: VecDeque::new(),
                next_sequence: 0,
            }),
            ttl,
            capacity,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a live entry. Expired entries are removed and reported absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut state = self.state.lock();

        let expired = is_expired(state.entries.get(key)?.inserted_at, now, self.ttl);
        if expired {
            state.entries.remove(key);
            tracing::trace!(principal = %key, "Auth cache entry expired");
            return None;
        }

        state.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Insert or overwrite an entry, stamping it with the current time.
    pub fn put(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let now = self.clock.now();
        let mut state = self.state.lock();

        state.sweep_front(now, self.ttl);

        if self.capacity > 0 && !state.entries.contains_key(&key) {
            while state.entries.len() >= self.capacity {
                match state.evict_oldest() {
                    Some(evicted) => {
                        tracing::trace!(principal = %evicted, "Auth cache entry evicted")
                    }
                    None => break,
                }
            }
        }

        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.order.push_back((key.clone(), sequence));
        state.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: now,
                sequence,
            },
        );

        state.compact();
    }

    /// Drop a single entry.
    pub fn remove(&self, key: &str) -> Option<V> {
        self.state.lock().entries.remove(key).map(|entry| entry.value)
    }

    /// Remove every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let before = state.entries.len();
        let ttl = self.ttl;
        state
            .entries
            .retain(|_, entry| !is_expired(entry.inserted_at, now, ttl));
        let removed = before - state.entries.len();
        state.compact();
        removed
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
