//! # Cache Store Module
//!
//! Key/value cache boundary used by the rate limiter, plus the in-memory
//! implementation that ships with the crate.
//!
//! ## Overview
//!
//! The dispatch core never talks to a concrete cache backend; it programs
//! against [`CacheStore`]. The trait is deliberately small:
//!
//! - `get` / `set`: TTL'd JSON values
//! - `incr`: atomic increment-and-get of a counter slot, creating it with
//!   the given TTL on first touch
//!
//! `incr` is the primitive the fixed-window rate limiter is built on: the
//! increment and the read happen under one per-key lock, so two concurrent
//! requests can never both observe the pre-increment count.
//!
//! ## MemoryCache
//!
//! [`MemoryCache`] backs the trait with a `DashMap`. Expiry is lazy: slots
//! past their deadline are treated as absent and rewritten on next touch.
//! TTLs too large for `Instant` arithmetic clamp to a year. Long-idle
//! processes can call [`MemoryCache::purge_expired`] to reclaim memory
//! eagerly.

use dashmap::DashMap;
use serde_json::Value;
use std::time::{Duration, Instant};

/// Counter state returned by [`CacheStore::incr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter {
    /// Value after this increment (1 on first touch of a window).
    pub count: u64,
    /// Time left until the slot expires.
    pub ttl_remaining: Duration,
}

/// Key/value cache with TTL'd entries and an atomic counter primitive.
///
/// Implementations must be safe to share across threads; `incr` must be
/// atomic per key.
pub trait CacheStore: Send + Sync {
    /// Fetch a live value. Expired entries read as absent.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store a value, replacing any previous entry and restarting its TTL.
    fn set(&self, key: &str, value: Value, ttl: Duration);

    /// Atomically increment the counter at `key` and return the new state.
    ///
    /// A missing or expired slot restarts at 1 with a fresh `ttl`; a live
    /// slot keeps its original deadline.
    fn incr(&self, key: &str, ttl: Duration) -> Counter;

    /// Drop an entry if present.
    fn remove(&self, key: &str);
}

enum SlotValue {
    Json(Value),
    Count(u64),
}

struct Slot {
    value: SlotValue,
    expires_at: Instant,
}

impl Slot {
    fn live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Deadline distance used when `now + ttl` overflows `Instant`.
const MAX_SLOT_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Slot deadline for a TTL starting now. `Instant` has no saturating add;
/// a TTL too large to represent clamps to [`MAX_SLOT_TTL`].
fn deadline(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl).unwrap_or_else(|| now + MAX_SLOT_TTL)
}

/// In-memory [`CacheStore`] on a lock-free concurrent map.
#[derive(Default)]
pub struct MemoryCache {
    slots: DashMap<String, Slot>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored slots, live or not yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Eagerly drop every expired slot.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.slots.retain(|_, slot| slot.live(now));
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        {
            let slot = self.slots.get(key)?;
            if slot.live(Instant::now()) {
                return Some(match &slot.value {
                    SlotValue::Json(value) => value.clone(),
                    SlotValue::Count(count) => Value::from(*count),
                });
            }
        }
        // Re-check expiry under the shard lock: a concurrent incr may have
        // replaced the slot since the read guard dropped.
        self.slots.remove_if(key, |_, slot| !slot.live(Instant::now()));
        None
    }

    fn set(&self, key: &str, value: Value, ttl: Duration) {
        self.slots.insert(
            key.to_string(),
            Slot {
                value: SlotValue::Json(value),
                expires_at: deadline(Instant::now(), ttl),
            },
        );
    }

    fn incr(&self, key: &str, ttl: Duration) -> Counter {
        let now = Instant::now();
        // The entry guard holds the shard lock for this key, making the
        // reset-check plus increment one atomic step.
        let mut slot = self.slots.entry(key.to_string()).or_insert_with(|| Slot {
            value: SlotValue::Count(0),
            expires_at: deadline(now, ttl),
        });
        if !slot.live(now) {
            slot.value = SlotValue::Count(0);
            slot.expires_at = deadline(now, ttl);
        }
        let count = match &mut slot.value {
            SlotValue::Count(count) => {
                *count += 1;
                *count
            }
            other => {
                *other = SlotValue::Count(1);
                1
            }
        };
        Counter {
            count,
            ttl_remaining: slot.expires_at.saturating_duration_since(now),
        }
    }

    fn remove(&self, key: &str) {
        self.slots.remove(key);
    }
}
