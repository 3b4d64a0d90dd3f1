//! Lifequest Storage Layer
//!
//! Implements the [`AchievementStore`] and [`XpLedger`] traits on SQLite, plus
//! the activity records and their idempotent completion flows.
//!
//! # Architecture
//!
//! - One [`SqliteStore`] per thread; connections are never shared
//! - Every XP-producing flow runs in a `BEGIN IMMEDIATE` transaction: the write
//!   lock is taken before the "already awarded" flag is read, so two concurrent
//!   completions of the same record serialize and only one awards XP
//! - Errors drop the transaction uncommitted, which rolls everything back
//!
//! # Examples
//!
//! ```no_run
//! use lifequest_store::SqliteStore;
//!
//! let mut store = SqliteStore::new("lifequest.db").unwrap();
//! let user = store.default_user().unwrap();
//! println!("level {}", user.current_level);
//! ```
//!
//! [`AchievementStore`]: lifequest_domain::traits::AchievementStore
//! [`XpLedger`]: lifequest_domain::traits::XpLedger

#![warn(missing_docs)]

mod achievements;
mod activity;
mod journal;
mod ledger;
mod users;

pub use achievements::AchievementUpdate;
pub use activity::HabitToggle;

use lifequest_domain::{XpError, XpRules};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Busy timeout used when none is configured
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Referenced entity does not exist (for this user)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// XP formula rejected the inputs
    #[error(transparent)]
    Xp(#[from] XpError),

    /// Condition config could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn not_found(what: &str, id: impl std::fmt::Display) -> Self {
        StoreError::NotFound(format!("{} {}", what, id))
    }
}

/// SQLite-based store for users, activity, the XP ledger and achievements
///
/// Holds the deployment's [`XpRules`]; every completion flow computes XP with
/// them and recomputes levels on their curve.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// SqliteStore instance; the busy timeout makes writers wait for each other.
pub struct SqliteStore {
    conn: Connection,
    rules: XpRules,
}

impl SqliteStore {
    /// Open a store with the default XP rules
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use lifequest_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("lifequest.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::open(path, XpRules::default(), DEFAULT_BUSY_TIMEOUT)
    }

    /// Open a store with explicit rules and busy timeout
    ///
    /// The rules are validated before the database is touched.
    pub fn open<P: AsRef<Path>>(
        path: P,
        rules: XpRules,
        busy_timeout: Duration,
    ) -> Result<Self, StoreError> {
        rules.validate()?;

        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;

        let mut store = Self { conn, rules };
        store.initialize_schema()?;
        Ok(store)
    }

    /// The XP rules this store awards with
    pub fn rules(&self) -> &XpRules {
        &self.rules
    }

    /// Run `f` as one write unit: its changes commit together or roll back together
    ///
    /// The write lock is taken up front. `f` must not call the completion
    /// flows or `award_xp`, which open their own transaction.
    pub fn atomically<T, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(StoreError::from)?;

        let result = f(self).and_then(|value| {
            self.conn
                .execute_batch("COMMIT")
                .map_err(StoreError::from)?;
            Ok(value)
        });

        if result.is_err() && !self.conn.is_autocommit() {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                tracing::warn!(error = %e, "rollback failed");
            }
        }
        result
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }
}

/// Start a write transaction that holds the database write lock from the start
pub(crate) fn immediate(conn: &mut Connection) -> Result<Transaction<'_>, StoreError> {
    Ok(conn.transaction_with_behavior(TransactionBehavior::Immediate)?)
}

/// Wrap a decode failure for a text column so it can leave a row mapper
pub(crate) fn invalid_column(index: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        index,
        rusqlite::types::Type::Text,
        Box::new(StoreError::InvalidData(message)),
    )
}

/// Decode an enum stored as text
pub(crate) fn parse_column<T>(
    row: &rusqlite::Row<'_>,
    index: usize,
    what: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(index)?;
    parse(&raw).ok_or_else(|| invalid_column(index, format!("Unknown {}: {}", what, raw)))
}

/// Narrow a COUNT(*) result
pub(crate) fn count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}
