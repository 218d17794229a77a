//! In-memory store adapter.
//!
//! Backs unit tests and local development without a Redis instance. Expiry
//! is enforced lazily on access; every operation takes the single map lock,
//! which gives `fetch_and_delete` the same at-most-once guarantee as GETDEL.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use palisade_common::AdminError;

use super::ExpiringStore;

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Mutex-guarded map with per-entry deadlines.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ExpiringStore for MemoryStore {
    async fn set_with_expiry(
        &self,
        key: &str,
        ttl_secs: u64,
        value: &str,
    ) -> Result<(), AdminError> {
        let mut entries = self.lock();
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + Duration::from_secs(ttl_secs),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, AdminError> {
        let mut entries = self.lock();
        let live = entries.get(key).map(|e| (e.is_live(), e.value.clone()));
        match live {
            Some((true, value)) => Ok(Some(value)),
            Some((false, _)) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn fetch_and_delete(&self, key: &str) -> Result<Option<String>, AdminError> {
        let mut entries = self.lock();
        match entries.remove(key) {
            Some(entry) if entry.is_live() => Ok(Some(entry.value)),
            _ => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, AdminError> {
        let mut entries = self.lock();
        Ok(entries.remove(key).is_some_and(|e| e.is_live()))
    }

    async fn incr_with_expiry(&self, key: &str, ttl_secs: u64) -> Result<u64, AdminError> {
        let mut entries = self.lock();
        let next = match entries.remove(key) {
            Some(entry) if entry.is_live() => {
                let count = entry.value.parse::<u64>().unwrap_or(0) + 1;
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: count.to_string(),
                        // Window keeps its original deadline.
                        expires_at: entry.expires_at,
                    },
                );
                count
            }
            _ => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: "1".to_string(),
                        expires_at: Instant::now() + Duration::from_secs(ttl_secs),
                    },
                );
                1
            }
        };
        Ok(next)
    }

    async fn ping(&self) -> Result<(), AdminError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_roundtrip() {
        let store = MemoryStore::new();
        store.set_with_expiry("k", 60, "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn expired_entry_reads_as_absent() {
        let store = MemoryStore::new();
        store.set_with_expiry("k", 60, "v").await.unwrap();
        // Backdate the deadline instead of sleeping.
        store.lock().get_mut("k").unwrap().expires_at = Instant::now() - Duration::from_secs(1);

        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.fetch_and_delete("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn fetch_and_delete_consumes_once() {
        let store = MemoryStore::new();
        store.set_with_expiry("k", 60, "v").await.unwrap();

        assert_eq!(
            store.fetch_and_delete("k").await.unwrap(),
            Some("v".to_string())
        );
        assert_eq!(store.fetch_and_delete("k").await.unwrap(), None);
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_reports_whether_live_value_existed() {
        let store = MemoryStore::new();
        store.set_with_expiry("k", 60, "v").await.unwrap();

        assert!(store.delete("k").await.unwrap());
        assert!(!store.delete("k").await.unwrap());
        assert!(!store.delete("never-set").await.unwrap());
    }

    #[tokio::test]
    async fn incr_counts_within_window() {
        let store = MemoryStore::new();
        assert_eq!(store.incr_with_expiry("c", 60).await.unwrap(), 1);
        assert_eq!(store.incr_with_expiry("c", 60).await.unwrap(), 2);
        assert_eq!(store.incr_with_expiry("c", 60).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn incr_restarts_after_window_expires() {
        let store = MemoryStore::new();
        store.incr_with_expiry("c", 60).await.unwrap();
        store.lock().get_mut("c").unwrap().expires_at = Instant::now() - Duration::from_secs(1);

        assert_eq!(store.incr_with_expiry("c", 60).await.unwrap(), 1);
    }
}
