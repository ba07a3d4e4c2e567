pub mod migrations;
pub mod orders;
pub mod queries;
pub mod sessions;

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use tokio::sync::{Mutex, MutexGuard};

/// Open or create the SQLite database at the given path and apply migrations.
///
/// Sets WAL journal mode. Creates parent directories if needed.
pub fn open_or_create(path: &Path) -> rusqlite::Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                Some(format!("Cannot create directory {}: {}", parent.display(), e)),
            )
        })?;
    }

    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    migrations::migrate(&conn)?;
    Ok(conn)
}

/// Open an existing database for reading. Never creates, migrates or writes.
pub fn open_read_only(path: &Path) -> rusqlite::Result<Connection> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
}

/// Open a private in-memory database with migrations applied.
pub fn open_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    migrations::migrate(&conn)?;
    Ok(conn)
}

/// Returns the default database path: `~/.local/share/parcel/orders.db`
pub fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    data_dir.join("parcel").join("orders.db")
}

/// Shared handle to the order database.
///
/// All access goes through one lock, so every write (a single statement or an
/// explicit transaction) is serialized against readers.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        open_or_create(path).map(Self::new)
    }

    pub fn in_memory() -> rusqlite::Result<Self> {
        open_in_memory().map(Self::new)
    }

    /// Lock the connection. Do not hold the guard across chat I/O.
    pub async fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}

/// Create an in-memory database with migrations applied, for testing.
#[cfg(test)]
pub fn test_db() -> Connection {
    open_in_memory().expect("open in-memory db")
}
