//! Store handle: connection pool + schema lifecycle.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::config::{StoreConfig, StoreLocation};
use crate::error::LedgerResult;
use crate::schema;

/// Handle to the ledger database.
///
/// Cheap to clone; clones share one connection pool. Obtain it with
/// [`LedgerStore::open`], hand it to the services, and call
/// [`LedgerStore::close`] on shutdown.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    pool: SqlitePool,
}

impl LedgerStore {
    /// Connect and make sure the schema exists.
    pub async fn open(config: &StoreConfig) -> LedgerResult<Self> {
        let (options, max_connections) = match &config.location {
            StoreLocation::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
                }
                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal);
                (options, config.max_connections.max(1))
            }
            StoreLocation::Memory => (SqliteConnectOptions::from_str("sqlite::memory:")?, 1),
        };
        let options = options
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout);

        // The in-memory database lives exactly as long as its one connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        for statement in schema::STATEMENTS {
            sqlx::query(statement).execute(&pool).await?;
        }

        tracing::info!(
            location = ?config.location,
            max_connections,
            "ledger store opened"
        );

        Ok(Self { pool })
    }

    pub async fn open_in_memory() -> LedgerResult<Self> {
        Self::open(&StoreConfig::in_memory()).await
    }

    /// Start a write transaction. Dropping it without commit rolls back.
    ///
    /// `BEGIN IMMEDIATE` takes the write lock before the first read, so
    /// concurrent writers queue behind the busy timeout instead of failing
    /// when they try to upgrade a read snapshot.
    pub async fn begin(&self) -> LedgerResult<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }

    /// Close every connection; waits for in-flight work to finish.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("ledger store closed");
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
