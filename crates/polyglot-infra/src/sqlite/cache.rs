//! SQLite-backed implementation of `Cache`.
//!
//! Lets several worker processes on one host share idempotency markers and
//! conversation state through one database file. Expiry is stored as unix
//! milliseconds and checked on every read; expired rows are treated as absent
//! and removed by [`SqliteCache::purge_expired`] or reclaimed by `set_nx`.

use std::time::Duration;

use chrono::Utc;
use polyglot_core::cache::Cache;
use polyglot_types::error::CacheError;
use sqlx::Row;

use super::pool::DatabasePool;

/// Shared cache over the `cache_entries` table.
pub struct SqliteCache {
    pool: DatabasePool,
}

impl SqliteCache {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Delete every expired row. Returns how many were removed.
    pub async fn purge_expired(&self) -> Result<u64, CacheError> {
        let result = sqlx::query(
            "DELETE FROM cache_entries WHERE expires_at IS NOT NULL AND expires_at <= ?",
        )
        .bind(now_millis())
        .execute(&self.pool.writer)
        .await
        .map_err(unavailable)?;
        Ok(result.rows_affected())
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn expiry(ttl: Option<Duration>) -> Option<i64> {
    ttl.map(|ttl| {
        let ttl = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        now_millis().saturating_add(ttl)
    })
}

fn unavailable(e: sqlx::Error) -> CacheError {
    CacheError::Unavailable(e.to_string())
}

impl Cache for SqliteCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let row = sqlx::query(
            "SELECT value FROM cache_entries WHERE key = ? AND (expires_at IS NULL OR expires_at > ?)",
        )
        .bind(key)
        .bind(now_millis())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(unavailable)?;

        row.map(|row| row.try_get::<String, _>("value").map_err(unavailable))
            .transpose()
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        sqlx::query(
            r#"INSERT INTO cache_entries (key, value, expires_at) VALUES (?, ?, ?)
               ON CONFLICT (key) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at"#,
        )
        .bind(key)
        .bind(value)
        .bind(expiry(ttl))
        .execute(&self.pool.writer)
        .await
        .map_err(unavailable)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        sqlx::query("DELETE FROM cache_entries WHERE key = ?")
            .bind(key)
            .execute(&self.pool.writer)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<bool, CacheError> {
        // One statement: insert, or take over the row only if it has expired.
        let result = sqlx::query(
            r#"INSERT INTO cache_entries (key, value, expires_at) VALUES (?, ?, ?)
               ON CONFLICT (key) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at
               WHERE cache_entries.expires_at IS NOT NULL AND cache_entries.expires_at <= ?"#,
        )
        .bind(key)
        .bind(value)
        .bind(expiry(ttl))
        .bind(now_millis())
        .execute(&self.pool.writer)
        .await
        .map_err(unavailable)?;
        Ok(result.rows_affected() == 1)
    }
}
