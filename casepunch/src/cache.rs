use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Small key-value cache whose entries expire a fixed time after insertion.
///
/// Owned by the session; the client never consults it, so dropping or
/// replacing the cache changes request counts only.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: HashMap<K, (Instant, V)>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Live value for `key`. An expired entry is dropped on lookup.
    pub fn get(&mut self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    pub fn invalidate(&mut self, key: &K) {
        self.entries.remove(key);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop every expired entry.
    pub fn purge_expired(&mut self) {
        let now = Instant::now();
        let ttl = self.ttl;
        self.entries
            .retain(|_, (inserted, _)| now.saturating_duration_since(*inserted) < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get_at(&mut self, key: &K, now: Instant) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some((inserted, value)) if now.saturating_duration_since(*inserted) < self.ttl => {
                return Some(value.clone())
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    fn insert_at(&mut self, key: K, value: V, now: Instant) {
        self.entries.insert(key, (now, value));
    }
}
