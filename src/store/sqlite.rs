//! `SQLite` preference backend

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OptionalExtension;

use super::{PreferenceStore, StoreError, UserPreference, is_plain_name};
use crate::{Error, Result};

type DbPool = Pool<SqliteConnectionManager>;
type DbConn = PooledConnection<SqliteConnectionManager>;

/// Preferences in a single `SQLite` table keyed by user id
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
    /// Quoted table identifier, safe to splice into SQL
    table: String,
}

impl SqliteStore {
    /// Open (and create if needed) a database file
    ///
    /// # Errors
    ///
    /// Returns error if the table name is invalid or the database cannot be initialized
    pub fn open<P: AsRef<Path>>(path: P, table: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        Self::with_manager(manager, 4, table)
    }

    /// In-memory database (for testing)
    ///
    /// # Errors
    ///
    /// Returns error if the table name is invalid or the database cannot be initialized
    pub fn in_memory(table: &str) -> Result<Self> {
        Self::with_manager(SqliteConnectionManager::memory(), 1, table)
    }

    fn with_manager(manager: SqliteConnectionManager, max_size: u32, table: &str) -> Result<Self> {
        let table = quote_table_name(table)?;
        let pool = Pool::builder()
            .max_size(max_size)
            .build(manager)
            .map_err(|e| Error::Database(e.to_string()))?;

        let conn = pool.get().map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(&format!(
            r"
            CREATE TABLE IF NOT EXISTS {table} (
                user_id TEXT PRIMARY KEY,
                stop_id TEXT NOT NULL,
                line_id TEXT NOT NULL,
                direction TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "
        ))?;

        Ok(Self { pool, table })
    }

    fn conn(&self) -> std::result::Result<DbConn, StoreError> {
        self.pool
            .get()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl PreferenceStore for SqliteStore {
    async fn get(&self, user_id: &str) -> std::result::Result<Option<UserPreference>, StoreError> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT user_id, stop_id, line_id, direction FROM {} WHERE user_id = ?1",
                self.table
            ),
            [user_id],
            |row| {
                Ok(UserPreference {
                    user_id: row.get(0)?,
                    stop_id: row.get(1)?,
                    line_id: row.get(2)?,
                    direction: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    async fn put(&self, preference: &UserPreference) -> std::result::Result<(), StoreError> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            &format!(
                "INSERT INTO {} (user_id, stop_id, line_id, direction, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(user_id) DO UPDATE SET
                    stop_id = ?2, line_id = ?3, direction = ?4, updated_at = ?5",
                self.table
            ),
            rusqlite::params![
                preference.user_id,
                preference.stop_id,
                preference.line_id,
                preference.direction,
                now
            ],
        )
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        tracing::debug!(user_id = %preference.user_id, "preference saved");
        Ok(())
    }
}

/// Validate a table name and quote it as an identifier
fn quote_table_name(table: &str) -> Result<String> {
    if !is_plain_name(table) {
        return Err(Error::Config(format!("invalid store table name: {table:?}")));
    }
    Ok(format!("\"{table}\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preference(stop: &str) -> UserPreference {
        UserPreference {
            user_id: "amzn1.ask.account.TEST".to_string(),
            stop_id: stop.to_string(),
            line_id: "L61".to_string(),
            direction: "L61-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let store = SqliteStore::in_memory("users").unwrap();
        assert!(store.get("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = SqliteStore::in_memory("tbm-horaires-users").unwrap();
        store.put(&preference("S1")).await.unwrap();
        store.put(&preference("S2")).await.unwrap();

        let saved = store.get("amzn1.ask.account.TEST").await.unwrap().unwrap();
        assert_eq!(saved, preference("S2"));
    }

    #[test]
    fn test_table_name_validation() {
        assert_eq!(quote_table_name("tbm_users").unwrap(), "\"tbm_users\"");
        assert!(quote_table_name("").is_err());
        assert!(quote_table_name("users; DROP TABLE x").is_err());
        assert!(quote_table_name("a\"b").is_err());
    }
}
