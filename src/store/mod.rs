pub mod entries;
pub mod feeds;
pub mod pull;
pub mod stats;
pub mod subscription;

pub use entries::EntryEditOp;
pub use feeds::{AddFeedRequest, FeedEditOp};
pub use pull::{CancelGuard, PullFeedsRequest, PullResult};

use crate::errors::{AppError, AppResult, DbResultExt};
use crate::fetch::Fetcher;
use crate::DbPool;
use diesel::connection::{AnsiTransactionManager, SimpleConnection, TransactionManager};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::sync::Arc;
use tokio::sync::RwLock;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/migrations");

pub type Conn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// PRAGMAs every pooled connection needs: cascade deletes rely on foreign
/// keys, and the busy timeout covers reader/writer overlap.
#[derive(Debug)]
struct ConnectionOptions;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn init_pool(database_url: &str) -> Result<DbPool, r2d2::Error> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    diesel::r2d2::Pool::builder()
        .connection_customizer(Box::new(ConnectionOptions))
        .build(manager)
}

/// Runs all pending migrations (tolerating "no change") and logs the
/// schema version the database ends up at.
pub fn run_migrations(conn: &mut SqliteConnection) -> AppResult<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| AppError::Internal(format!("running migrations: {e}")))?;
    if applied.is_empty() {
        log::info!("No pending migrations");
    }
    for version in &applied {
        log::info!("Applied migration {version}");
    }

    let versions = conn
        .applied_migrations()
        .map_err(|e| AppError::Internal(format!("reading schema version: {e}")))?;
    match versions.iter().map(|v| v.to_string()).max() {
        Some(version) => log::info!("Schema at version {version}"),
        None => log::warn!("Schema has no applied migrations"),
    }
    Ok(())
}

/// The storage engine. Owns the database handle; all writes serialize
/// behind `write_gate` while reads share it. Everything handed back to
/// callers is a value copy.
#[derive(Clone)]
pub struct Store {
    pool: DbPool,
    write_gate: Arc<RwLock<()>>,
    fetcher: Arc<dyn Fetcher>,
}

impl Store {
    pub fn new(pool: DbPool, fetcher: Arc<dyn Fetcher>) -> Self {
        Store {
            pool,
            write_gate: Arc::new(RwLock::new(())),
            fetcher,
        }
    }

    pub(crate) fn conn(&self) -> AppResult<Conn> {
        Ok(self.pool.get()?)
    }

    /// Cheap connectivity probe for health reporting.
    pub fn ping(&self) -> bool {
        match self.pool.get() {
            Ok(mut conn) => diesel::sql_query("SELECT 1").execute(&mut conn).is_ok(),
            Err(_) => false,
        }
    }
}

/// Explicit transaction for code that must await between statements (the
/// pull engine keeps one open across fetch completions). Rolls back on
/// drop unless committed, so a panic can't leak an open transaction back
/// into the pool.
pub(crate) struct Txn {
    conn: Conn,
    open: bool,
}

impl Txn {
    pub fn begin(mut conn: Conn) -> AppResult<Self> {
        AnsiTransactionManager::begin_transaction(&mut *conn).op("begin transaction")?;
        Ok(Txn { conn, open: true })
    }

    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }

    pub fn commit(mut self) -> AppResult<()> {
        self.open = false;
        AnsiTransactionManager::commit_transaction(&mut *self.conn).op("commit transaction")
    }

    pub fn rollback(mut self) -> AppResult<()> {
        self.open = false;
        AnsiTransactionManager::rollback_transaction(&mut *self.conn).op("rollback transaction")
    }
}

impl Drop for Txn {
    fn drop(&mut self) {
        if self.open {
            let _ = AnsiTransactionManager::rollback_transaction(&mut *self.conn);
        }
    }
}
