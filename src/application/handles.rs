//! # Handle Store
//!
//! Built commands waiting for confirmation, keyed by an opaque id.
//! Entries expire after a TTL and the store never holds more than
//! `capacity` of them; the oldest is evicted first.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::types::BuiltCommand;

pub const DEFAULT_CAPACITY: usize = 256;

struct Entry {
    command: BuiltCommand,
    created: Instant,
}

pub struct HandleStore {
    entries: Mutex<HashMap<String, Entry>>,
    ttl: Duration,
    capacity: usize,
}

impl HandleStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    fn evict_expired(&self, entries: &mut HashMap<String, Entry>, now: Instant) {
        let before = entries.len();
        entries.retain(|_, e| now.duration_since(e.created) < self.ttl);
        let evicted = before - entries.len();
        if evicted > 0 {
            tracing::debug!("Evicted {} expired command handle(s)", evicted);
        }
    }

    /// Stores `command` and returns its new handle.
    pub async fn insert(&self, command: BuiltCommand) -> String {
        let handle = Uuid::new_v4().to_string();
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        self.evict_expired(&mut entries, now);

        while entries.len() >= self.capacity {
            let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, e)| e.created)
                .map(|(k, _)| k.clone())
            else {
                break;
            };
            tracing::debug!("Handle store full, evicting {}", oldest);
            entries.remove(&oldest);
        }

        entries.insert(
            handle.clone(),
            Entry {
                command,
                created: now,
            },
        );
        handle
    }

    /// Removes and returns the command for `handle`. A handle can be taken once.
    pub async fn take(&self, handle: &str) -> Option<BuiltCommand> {
        let mut entries = self.entries.lock().await;
        self.evict_expired(&mut entries, Instant::now());
        entries.remove(handle).map(|e| e.command)
    }

    #[cfg(test)]
    pub async fn contains(&self, handle: &str) -> bool {
        let mut entries = self.entries.lock().await;
        self.evict_expired(&mut entries, Instant::now());
        entries.contains_key(handle)
    }

    pub async fn len(&self) -> usize {
        let mut entries = self.entries.lock().await;
        self.evict_expired(&mut entries, Instant::now());
        entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn command(tag: &str) -> BuiltCommand {
        BuiltCommand::new(PathBuf::from("MigratorXpress"), vec![tag.to_string()], vec![])
    }

    #[tokio::test]
    async fn test_take_consumes_once() {
        let store = HandleStore::new(Duration::from_secs(60), DEFAULT_CAPACITY);
        let handle = store.insert(command("a")).await;
        assert!(store.contains(&handle).await);
        assert_eq!(store.take(&handle).await.unwrap().args(), ["a"]);
        assert!(store.take(&handle).await.is_none());
        assert!(store.take("never-issued").await.is_none());
    }

    #[tokio::test]
    async fn test_handles_are_unique() {
        let store = HandleStore::new(Duration::from_secs(60), DEFAULT_CAPACITY);
        let a = store.insert(command("a")).await;
        let b = store.insert(command("a")).await;
        assert_ne!(a, b);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_expired_handles_are_evicted() {
        let store = HandleStore::new(Duration::from_millis(50), DEFAULT_CAPACITY);
        let handle = store.insert(command("a")).await;
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(store.take(&handle).await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let store = HandleStore::new(Duration::from_secs(60), 2);
        let first = store.insert(command("1")).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = store.insert(command("2")).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let third = store.insert(command("3")).await;
        assert!(!store.contains(&first).await);
        assert!(store.contains(&second).await);
        assert!(store.contains(&third).await);
    }

    #[tokio::test]
    async fn test_concurrent_inserts() {
        let store = std::sync::Arc::new(HandleStore::new(Duration::from_secs(60), DEFAULT_CAPACITY));
        let mut tasks = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move { store.insert(command(&i.to_string())).await }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(store.len().await, 16);
    }
}
