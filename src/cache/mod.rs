//! Process-local key/value cache with a fixed time-to-live.
//!
//! Entries expire lazily: an expired entry is treated as absent on read and
//! removed at that point. Every key also carries a generation counter that
//! is bumped on delete, so a reader can fill the cache only if nothing
//! invalidated the key while it was querying the store.

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache lock poisoned")]
    Poisoned,
}

impl<T> From<std::sync::PoisonError<T>> for CacheError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::Poisoned
    }
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

#[derive(Debug)]
struct Slots<V> {
    entries: HashMap<String, Entry<V>>,
    generations: HashMap<String, u64>,
}

#[derive(Debug)]
pub struct TtlCache<V> {
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
    slots: RwLock<Slots<V>>,
}

impl<V: Clone> TtlCache<V> {
    #[must_use]
    pub fn new(ttl: TimeDelta, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            slots: RwLock::new(Slots {
                entries: HashMap::new(),
                generations: HashMap::new(),
            }),
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    fn expiry(&self) -> DateTime<Utc> {
        self.clock
            .now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn get(&self, key: &str) -> Result<Option<V>, CacheError> {
        let now = self.clock.now();

        {
            let slots = self.slots.read()?;
            match slots.entries.get(key) {
                None => return Ok(None),
                Some(entry) if now < entry.expires_at => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        let mut slots = self.slots.write()?;
        if slots
            .entries
            .get(key)
            .is_some_and(|entry| now >= entry.expires_at)
        {
            slots.entries.remove(key);
        }
        Ok(None)
    }

    /// Stores `value` under `key`, resetting its time-to-live.
    pub fn set(&self, key: &str, value: V) -> Result<(), CacheError> {
        let expires_at = self.expiry();
        let mut slots = self.slots.write()?;
        slots
            .entries
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    /// Removes `key` and bumps its generation. Returns whether an entry existed.
    pub fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut slots = self.slots.write()?;
        *slots.generations.entry(key.to_string()).or_default() += 1;
        Ok(slots.entries.remove(key).is_some())
    }

    pub fn generation(&self, key: &str) -> Result<u64, CacheError> {
        let slots = self.slots.read()?;
        Ok(slots.generations.get(key).copied().unwrap_or_default())
    }

    /// Stores `value` only if `key` has not been deleted since `generation`
    /// was observed. Returns whether the value was stored.
    pub fn set_if_generation(
        &self,
        key: &str,
        generation: u64,
        value: V,
    ) -> Result<bool, CacheError> {
        let expires_at = self.expiry();
        let mut slots = self.slots.write()?;
        let current = slots.generations.get(key).copied().unwrap_or_default();
        if current != generation {
            return Ok(false);
        }
        slots
            .entries
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_with_clock() -> (TtlCache<Vec<i32>>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = TtlCache::new(TimeDelta::seconds(1800), clock.clone());
        (cache, clock)
    }

    #[test]
    fn returns_value_until_ttl_elapses() {
        let (cache, clock) = cache_with_clock();
        cache.set("allrequirements", vec![1, 2]).unwrap();

        clock.advance(TimeDelta::seconds(1799));
        assert_eq!(cache.get("allrequirements").unwrap(), Some(vec![1, 2]));

        clock.advance(TimeDelta::seconds(1));
        assert_eq!(cache.get("allrequirements").unwrap(), None);
    }

    #[test]
    fn set_resets_ttl() {
        let (cache, clock) = cache_with_clock();
        cache.set("k", vec![1]).unwrap();
        clock.advance(TimeDelta::seconds(1000));
        cache.set("k", vec![2]).unwrap();
        clock.advance(TimeDelta::seconds(1000));
        assert_eq!(cache.get("k").unwrap(), Some(vec![2]));
    }

    #[test]
    fn delete_removes_entry() {
        let (cache, _) = cache_with_clock();
        cache.set("k", vec![1]).unwrap();
        assert!(cache.delete("k").unwrap());
        assert!(!cache.delete("k").unwrap());
        assert_eq!(cache.get("k").unwrap(), None);
    }

    #[test]
    fn fill_is_dropped_after_concurrent_invalidation() {
        let (cache, _) = cache_with_clock();

        let observed = cache.generation("k").unwrap();
        cache.delete("k").unwrap();
        assert!(!cache.set_if_generation("k", observed, vec![9]).unwrap());
        assert_eq!(cache.get("k").unwrap(), None);

        let observed = cache.generation("k").unwrap();
        assert!(cache.set_if_generation("k", observed, vec![9]).unwrap());
        assert_eq!(cache.get("k").unwrap(), Some(vec![9]));
    }

    #[test]
    fn keys_are_independent() {
        let (cache, _) = cache_with_clock();
        cache.set("a", vec![1]).unwrap();
        cache.delete("b").unwrap();
        assert_eq!(cache.get("a").unwrap(), Some(vec![1]));
        assert_eq!(cache.generation("a").unwrap(), 0);
        assert_eq!(cache.generation("b").unwrap(), 1);
    }
}
