//! SQLite note storage.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{params, Connection};
use serde::Serialize;

use crate::error::AppError;

/// Most recent notes returned by a list request.
pub const LIST_LIMIT: i64 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteRow {
    pub id: i64,
    pub content: String,
    pub owner_email: String,
    pub created_at: i64,
}

#[derive(Debug)]
pub struct NoteStore {
    connection: Mutex<Connection>,
}

impl NoteStore {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, AppError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(connection: Connection) -> Result<Self, AppError> {
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS notes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                owner_email TEXT NOT NULL,
                created_at INTEGER DEFAULT (strftime('%s','now'))
            );",
        )?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn connection(&self) -> MutexGuard<'_, Connection> {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Newest first.
    pub fn list_recent(&self) -> Result<Vec<NoteRow>, AppError> {
        let connection = self.connection();
        let mut statement = connection.prepare(
            "SELECT id, content, owner_email, created_at FROM notes ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = statement.query_map(params![LIST_LIMIT], |row| {
            Ok(NoteRow {
                id: row.get(0)?,
                content: row.get(1)?,
                owner_email: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;
        let notes = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(notes)
    }

    pub fn insert(&self, content: &str, owner_email: &str) -> Result<i64, AppError> {
        let connection = self.connection();
        connection.execute(
            "INSERT INTO notes (content, owner_email) VALUES (?1, ?2)",
            params![content, owner_email],
        )?;
        Ok(connection.last_insert_rowid())
    }
}
