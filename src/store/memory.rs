use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
};

use anyhow::{bail, Result};

use super::KeyValueStore;

/// In-process store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blobs<I, K, V>(blobs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::default();
        store.lock().extend(
            blobs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into())),
        );
        store
    }

    /// Makes every subsequent `put` fail, for exercising best-effort saves.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> HashMap<String, String> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.blobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("memory store rejected write of '{key}'");
        }
        self.lock().insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.put("streak", "{}".into()).await.expect("put");
        assert_eq!(store.get("streak").await.expect("get").as_deref(), Some("{}"));
        assert_eq!(store.get("missing").await.expect("get"), None);
    }

    #[tokio::test]
    async fn clones_share_contents() {
        let store = MemoryStore::with_blobs([("settings", "{}")]);
        let other = store.clone();
        other.put("streak", "{}".into()).await.expect("put");
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn failing_writes_leave_contents_untouched() {
        let store = MemoryStore::with_blobs([("streak", "old")]);
        store.set_fail_writes(true);
        assert!(store.put("streak", "new".into()).await.is_err());
        assert_eq!(store.snapshot().get("streak").map(String::as_str), Some("old"));
    }
}
