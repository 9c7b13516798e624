// In-memory registry of issued key pairs
//
// The store is the only place that decides whether a key is expired: a key
// is valid at `now` iff `valid_until >= now`. Mutations hold the write half
// of the lock, so a purge is never observed half-done and a concurrent
// insert is never lost.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::types::KeyPair;

impl KeyPair {
    /// A key is expired once `valid_until` lies strictly before `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.valid_until < now
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired_at(now)
    }
}

struct StoredKey {
    seq: u64,
    key: Arc<KeyPair>,
}

#[derive(Default)]
struct Inner {
    keys: HashMap<String, StoredKey>,
    next_seq: u64,
}

impl Inner {
    fn purge(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.keys.len();
        self.keys.retain(|_, stored| stored.key.is_valid_at(now));
        before - self.keys.len()
    }

    /// Keys matching `pred`, oldest insertion first
    fn collect(&self, pred: impl Fn(&KeyPair) -> bool) -> Vec<Arc<KeyPair>> {
        let mut matching: Vec<&StoredKey> =
            self.keys.values().filter(|stored| pred(&stored.key)).collect();
        matching.sort_by_key(|stored| stored.seq);
        matching
            .into_iter()
            .map(|stored| Arc::clone(&stored.key))
            .collect()
    }
}

/// Thread-safe key registry shared by all request handlers.
#[derive(Default)]
pub struct KeyStore {
    inner: RwLock<Inner>,
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key under its kid. An existing kid is never overwritten.
    #[tracing::instrument(skip(self, key), fields(kid = %key.kid))]
    pub fn insert(&self, key: KeyPair) -> Result<Arc<KeyPair>> {
        let mut inner = self.inner.write();
        if inner.keys.contains_key(&key.kid) {
            return Err(Error::DuplicateKeyId(key.kid));
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;

        let key = Arc::new(key);
        inner.keys.insert(
            key.kid.clone(),
            StoredKey {
                seq,
                key: Arc::clone(&key),
            },
        );
        Ok(key)
    }

    /// Remove every key whose validity ended before `now`.
    /// Returns how many keys were dropped.
    #[tracing::instrument(skip(self))]
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let purged = self.inner.write().purge(now);
        if purged > 0 {
            tracing::debug!(purged, "purged expired keys");
        }
        purged
    }

    /// Keys still valid at `now`, in insertion order
    pub fn list_valid(&self, now: DateTime<Utc>) -> Vec<Arc<KeyPair>> {
        self.inner.read().collect(|key| key.is_valid_at(now))
    }

    /// Purge and list under a single write lock, so no other request can
    /// interleave between the two steps.
    #[tracing::instrument(skip(self))]
    pub fn purge_and_list_valid(&self, now: DateTime<Utc>) -> Vec<Arc<KeyPair>> {
        let mut inner = self.inner.write();
        let purged = inner.purge(now);
        if purged > 0 {
            tracing::debug!(purged, "purged expired keys");
        }
        inner.collect(|key| key.is_valid_at(now))
    }

    /// Some key that is already expired at `now` (the oldest one), if any
    pub fn find_expired(&self, now: DateTime<Utc>) -> Option<Arc<KeyPair>> {
        let inner = self.inner.read();
        inner
            .keys
            .values()
            .filter(|stored| stored.key.is_expired_at(now))
            .min_by_key(|stored| stored.seq)
            .map(|stored| Arc::clone(&stored.key))
    }

    pub fn get(&self, kid: &str) -> Option<Arc<KeyPair>> {
        self.inner
            .read()
            .keys
            .get(kid)
            .map(|stored| Arc::clone(&stored.key))
    }

    pub fn len(&self) -> usize {
        self.inner.read().keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sample_key;
    use chrono::Duration;

    fn kids(keys: &[Arc<KeyPair>]) -> Vec<&str> {
        keys.iter().map(|k| k.kid.as_str()).collect()
    }

    #[test]
    fn test_insert_and_get() {
        let store = KeyStore::new();
        assert!(store.is_empty());
        let now = Utc::now();
        store.insert(sample_key("a", now + Duration::hours(1))).unwrap();
        assert!(!store.is_empty());

        assert_eq!(store.get("a").map(|k| k.kid.clone()).as_deref(), Some("a"));
        assert!(store.get("missing").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_insert_rejects_duplicate_kid() {
        let store = KeyStore::new();
        let now = Utc::now();
        let first_until = now + Duration::hours(1);
        store.insert(sample_key("dup", first_until)).unwrap();

        let err = store
            .insert(sample_key("dup", now - Duration::minutes(5)))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKeyId(ref kid) if kid == "dup"));

        // The original entry is untouched
        assert_eq!(store.get("dup").unwrap().valid_until, first_until);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_list_valid_includes_boundary_and_keeps_order() {
        let store = KeyStore::new();
        let now = Utc::now();
        store.insert(sample_key("later", now + Duration::hours(1))).unwrap();
        store.insert(sample_key("expired", now - Duration::seconds(1))).unwrap();
        store.insert(sample_key("boundary", now)).unwrap();

        let valid = store.list_valid(now);
        assert_eq!(kids(&valid), vec!["later", "boundary"]);
        // Listing never removes anything
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_purge_removes_only_expired() {
        let store = KeyStore::new();
        let now = Utc::now();
        store.insert(sample_key("valid", now + Duration::hours(1))).unwrap();
        store.insert(sample_key("old", now - Duration::minutes(5))).unwrap();
        store.insert(sample_key("older", now - Duration::hours(2))).unwrap();
        store.insert(sample_key("boundary", now)).unwrap();

        assert_eq!(store.purge_expired(now), 2);
        assert!(store.get("old").is_none());
        assert!(store.get("older").is_none());
        assert!(store.get("valid").is_some());
        assert!(store.get("boundary").is_some());

        // Second purge at the same instant is a no-op
        assert_eq!(store.purge_expired(now), 0);
    }

    #[test]
    fn test_purge_and_list_valid() {
        let store = KeyStore::new();
        let now = Utc::now();
        store.insert(sample_key("expired", now - Duration::minutes(5))).unwrap();
        store.insert(sample_key("valid", now + Duration::hours(1))).unwrap();

        let listed = store.purge_and_list_valid(now);
        assert_eq!(kids(&listed), vec!["valid"]);
        assert!(store.get("expired").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_find_expired() {
        let store = KeyStore::new();
        let now = Utc::now();
        assert!(store.find_expired(now).is_none());

        store.insert(sample_key("valid", now + Duration::hours(1))).unwrap();
        assert!(store.find_expired(now).is_none());

        store.insert(sample_key("first", now - Duration::minutes(5))).unwrap();
        store.insert(sample_key("second", now - Duration::minutes(1))).unwrap();

        let found = store.find_expired(now).unwrap();
        assert_eq!(found.kid, "first");
        // Lookup does not consume the key
        assert!(store.get("first").is_some());
    }

    #[test]
    fn test_expiry_is_evaluated_against_given_time() {
        let store = KeyStore::new();
        let now = Utc::now();
        store.insert(sample_key("k", now + Duration::minutes(10))).unwrap();

        assert_eq!(store.list_valid(now).len(), 1);
        let later = now + Duration::minutes(11);
        assert!(store.list_valid(later).is_empty());
        assert_eq!(store.find_expired(later).unwrap().kid, "k");
    }

    #[test]
    fn test_concurrent_inserts_survive_purges() {
        let store = KeyStore::new();
        let now = Utc::now();
        let valid_until = now + Duration::hours(1);
        let expired_until = now - Duration::minutes(5);

        std::thread::scope(|scope| {
            for t in 0..4 {
                let store = &store;
                scope.spawn(move || {
                    for i in 0..50 {
                        let until = if i % 2 == 0 { valid_until } else { expired_until };
                        store.insert(sample_key(&format!("{t}-{i}"), until)).unwrap();
                    }
                });
            }
            for _ in 0..4 {
                let store = &store;
                scope.spawn(move || {
                    for _ in 0..50 {
                        store.purge_expired(now);
                        for key in store.list_valid(now) {
                            assert!(key.is_valid_at(now));
                        }
                    }
                });
            }
        });

        store.purge_expired(now);
        // Every valid insert is still present, every expired one is gone
        assert_eq!(store.len(), 4 * 25);
        for t in 0..4 {
            for i in 0..50 {
                let present = store.get(&format!("{t}-{i}")).is_some();
                assert_eq!(present, i % 2 == 0);
            }
        }
    }
}
