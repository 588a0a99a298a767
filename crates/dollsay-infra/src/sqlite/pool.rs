//! SQLite connection setup for the session store.
//!
//! One writer connection and a small read-only pool over the same WAL
//! database file.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Readers allowed to run concurrently against the WAL file.
const READER_CONNECTIONS: u32 = 8;

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Session database handle with split access paths.
///
/// `reader` serves session lookups; `writer` is a single connection, so
/// quota admissions and increments are serialized.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open the session database at `database_url`, creating it if needed.
    ///
    /// The schema is migrated through the writer before any reader connects.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = connect_options(database_url)?;

        let writer = open_pool(options.clone(), 1).await?;
        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = open_pool(options.read_only(true), READER_CONNECTIONS).await?;

        tracing::debug!(url = %database_url, "Session database opened");
        Ok(Self { reader, writer })
    }
}

fn connect_options(database_url: &str) -> Result<SqliteConnectOptions, sqlx::Error> {
    Ok(SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT)
        .foreign_keys(true))
}

async fn open_pool(options: SqliteConnectOptions, size: u32) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(size)
        .connect_with(options)
        .await
}

/// SQLite URL for `{data_dir}/dollsay.db`.
pub fn database_url(data_dir: &Path) -> String {
    format!("sqlite://{}?mode=rwc", data_dir.join("dollsay.db").display())
}
