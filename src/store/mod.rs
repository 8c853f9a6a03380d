//! Persistence port for application data.
//!
//! The core never performs I/O itself; the application state serializes its
//! data into JSON blobs and hands them to a [`KeyValueStore`].

mod data;
mod memory;

use std::future::Future;

use anyhow::Result;
use chrono::Utc;

use crate::db::Database;

pub use data::{blob_keys, AppData};
pub use memory::MemoryStore;

/// Async key/value storage of JSON strings.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    fn put(&self, key: &str, value: String) -> impl Future<Output = Result<()>> + Send;
}

impl KeyValueStore for Database {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.get_blob(key).await
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        self.put_blob(key, value, Utc::now()).await
    }
}
