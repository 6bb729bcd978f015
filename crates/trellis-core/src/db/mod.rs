//! Database operations and SQLite management for action plans.
//!
//! This module provides the low-level persistence layer: connection setup,
//! schema management, and specialized query interfaces for plans, phases,
//! tasks, dependency edges, and progress snapshots.
//!
//! Every mutating method runs inside one [`TransactionBehavior::Immediate`]
//! transaction. SQLite takes the write lock at `BEGIN`, so a cycle check and
//! the edge insert it guards (or a status change and the snapshot it appends)
//! can never interleave with another writer.

use std::{path::Path, time::Duration};

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::error::{DatabaseResultExt, Result};

pub mod dependency_queries;
pub mod migrations;
pub mod phase_queries;
pub mod plan_queries;
pub mod progress_queries;
pub mod task_queries;
pub mod utils;

/// How long a connection waits for another writer before giving up.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_busy_timeout(path, DEFAULT_BUSY_TIMEOUT)
    }

    /// Opens the database at `path`, waiting up to `timeout` for locks.
    pub fn with_busy_timeout<P: AsRef<Path>>(path: P, timeout: Duration) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;
        Self::from_connection(connection, timeout)
    }

    /// Opens a private in-memory database. Nothing is persisted.
    pub fn open_in_memory() -> Result<Self> {
        let connection =
            Connection::open_in_memory().db_context("Failed to open in-memory database")?;
        Self::from_connection(connection, DEFAULT_BUSY_TIMEOUT)
    }

    fn from_connection(connection: Connection, timeout: Duration) -> Result<Self> {
        connection
            .busy_timeout(timeout)
            .db_context("Failed to set busy timeout")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Begins a transaction that holds the write lock from the start.
    fn write_transaction(&mut self) -> Result<Transaction<'_>> {
        self.connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")
    }
}
