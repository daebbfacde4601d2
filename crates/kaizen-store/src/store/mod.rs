//! SQLite-backed view of the two tables the notification core touches.
//!
//! Split into focused submodules:
//! - `tasks` — overdue scan and per-user window queries
//! - `preferences` — report subscribers and the `last_report_sent_at` stamp

mod preferences;
mod tasks;


use chrono::{DateTime, SecondsFormat, Utc};
use kaizen_core::{config::StoreConfig, error::KaizenError, shellexpand};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Persistent store backed by SQLite.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
    query_timeout: Duration,
}

impl Store {
    /// Open the store, running migrations on first use.
    ///
    /// `db_path = ":memory:"` gives a private in-memory database (single connection).
    pub async fn new(config: &StoreConfig) -> Result<Self, KaizenError> {
        let in_memory = config.db_path == ":memory:";

        let (opts, max_connections) = if in_memory {
            let opts = SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| KaizenError::Store(format!("invalid db path: {e}")))?;
            (opts, 1)
        } else {
            let db_path = shellexpand(&config.db_path);

            // Ensure parent directory exists.
            if let Some(parent) = std::path::Path::new(&db_path).parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| KaizenError::Store(format!("failed to create data dir: {e}")))?;
            }

            let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
                .map_err(|e| KaizenError::Store(format!("invalid db path: {e}")))?
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal);
            (opts, 4)
        };

        // In-memory databases vanish with their connection, so never recycle it.
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await
            .map_err(|e| KaizenError::Store(format!("failed to connect to sqlite: {e}")))?;

        Self::run_migrations(&pool).await?;

        info!("Store initialized at {}", config.db_path);

        Ok(Self {
            pool,
            query_timeout: Duration::from_secs(config.query_timeout_secs),
        })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Cheap reachability check used by `status`.
    pub async fn ping(&self) -> Result<(), KaizenError> {
        self.bounded("ping", async {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map(|_| ())
                .map_err(|e| KaizenError::Store(format!("ping failed: {e}")))
        })
        .await
    }

    /// Run a query future under the configured timeout.
    async fn bounded<T, F>(&self, what: &str, fut: F) -> Result<T, KaizenError>
    where
        F: Future<Output = Result<T, KaizenError>>,
    {
        let secs = self.query_timeout.as_secs();
        tokio::time::timeout(self.query_timeout, fut)
            .await
            .map_err(|_| KaizenError::Timeout(format!("{what} exceeded {secs}s")))?
    }

    /// Run SQL migrations, tracking which have already been applied.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), KaizenError> {
        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS _migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )
        .execute(pool)
        .await
        .map_err(|e| KaizenError::Store(format!("failed to create migrations table: {e}")))?;

        let migrations: &[(&str, &str)] =
            &[("001_init", include_str!("../../migrations/001_init.sql"))];

        for (name, sql) in migrations {
            let applied: Option<(String,)> =
                sqlx::query_as("SELECT name FROM _migrations WHERE name = ?")
                    .bind(name)
                    .fetch_optional(pool)
                    .await
                    .map_err(|e| {
                        KaizenError::Store(format!("failed to check migration {name}: {e}"))
                    })?;

            if applied.is_some() {
                continue;
            }

            sqlx::raw_sql(sql)
                .execute(pool)
                .await
                .map_err(|e| KaizenError::Store(format!("migration {name} failed: {e}")))?;

            sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
                .bind(name)
                .execute(pool)
                .await
                .map_err(|e| {
                    KaizenError::Store(format!("failed to record migration {name}: {e}"))
                })?;

            info!("store: applied migration {name}");
        }

        Ok(())
    }
}

/// Fixed-width UTC timestamp, so text comparison in SQL matches time order.
pub(crate) fn to_db_time(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn from_db_time(raw: &str) -> Result<DateTime<Utc>, KaizenError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| KaizenError::Store(format!("bad timestamp '{raw}': {e}")))
}

pub(crate) fn from_db_time_opt(raw: Option<String>) -> Result<Option<DateTime<Utc>>, KaizenError> {
    raw.as_deref().map(from_db_time).transpose()
}
