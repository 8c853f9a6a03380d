use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

pub struct BlobRepository<'a> {
    conn: &'a Connection,
}

impl<'a> BlobRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM app_blobs WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Insert or replace the value stored under `key`.
    pub fn put(&self, key: &str, value: &str, updated_at: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "INSERT INTO app_blobs (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 updated_at = excluded.updated_at",
            params![key, value, updated_at.to_rfc3339()],
        )?;
        Ok(())
    }
}
