//! Document store connection
//!
//! Owns the SQLite connection pool and hands out collection handles.

use crate::store::collection::Collection;
use crate::store::error::StoreError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

/// Connection pool for the document store
#[derive(Clone)]
pub struct DocumentStore {
    pool: SqlitePool,
}

impl DocumentStore {
    /// Open (or create) the database `<url>/<name>.db` and run migrations
    ///
    /// # Arguments
    /// * `url` - Store URL, e.g. `sqlite://./data` or a plain directory path
    /// * `name` - Database name; becomes the file stem
    ///
    /// # Returns
    /// * `Ok(DocumentStore)` if successful
    /// * `Err(StoreError)` if the directory, connection or migration failed
    pub async fn connect(url: &str, name: &str) -> Result<Self, StoreError> {
        let base = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url)
            .trim_end_matches('/');
        let db_path = PathBuf::from(base).join(format!("{}.db", name));

        Self::open(&db_path).await
    }

    /// Open a database file directly
    pub async fn open(db_path: &std::path::Path) -> Result<Self, StoreError> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Connection(format!("Failed to create db directory: {}", e))
                })?;
            }
        }

        let connection_string = format!("sqlite:{}", db_path.display());
        let options = SqliteConnectOptions::from_str(&connection_string)
            .map_err(|e| StoreError::Connection(format!("Invalid database path: {}", e)))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        info!("Connected to document store at: {}", db_path.display());

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Get a handle to a named collection
    pub fn collection(&self, name: &str) -> Collection {
        Collection::new(self.pool.clone(), name)
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<(), StoreError> {
        let migration_sql = include_str!("../../migrations/001_create_documents.sql");

        // Strip comments, then execute one statement at a time
        let mut cleaned_sql = String::new();
        for line in migration_sql.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with("--") {
                continue;
            }
            let without_comments = match trimmed.find("--") {
                Some(comment_pos) => &trimmed[..comment_pos],
                None => trimmed,
            };
            cleaned_sql.push_str(without_comments.trim());
            cleaned_sql.push(' ');
        }

        for statement in cleaned_sql
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    StoreError::Migration(format!(
                        "{} - Statement: {}",
                        e,
                        statement.chars().take(100).collect::<String>()
                    ))
                })?;
        }

        info!("Document store migrations completed");
        Ok(())
    }
}
