pub mod migrations;
pub mod models;
pub mod queries;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Params, Row};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Store location that selects a non-persistent, in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

#[derive(Debug, Clone, Copy, Default)]
pub struct StoreOptions {
    /// Turn on `PRAGMA foreign_keys`. Without it SQLite accepts messages whose
    /// `user_id` matches no user.
    pub enforce_foreign_keys: bool,
}

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Opens (creating if needed) the store at `path` and applies migrations.
    /// A path of `:memory:` opens a throwaway in-memory store.
    pub fn open(path: &Path, options: StoreOptions) -> Result<Self> {
        if path == Path::new(MEMORY_PATH) {
            return Self::open_in_memory(options);
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating database directory {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("opening database at {}", path.display()))?;

        // WAL mode for concurrent reads
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!("journal_mode = {}", mode);

        let db = Self::init(conn, options)?;
        info!("Database opened at {}", path.display());
        Ok(db)
    }

    pub fn open_in_memory(options: StoreOptions) -> Result<Self> {
        let db = Self::init(Connection::open_in_memory()?, options)?;
        info!("In-memory database opened");
        Ok(db)
    }

    fn init(conn: Connection, options: StoreOptions) -> Result<Self> {
        let foreign_keys = if options.enforce_foreign_keys { "ON" } else { "OFF" };
        conn.pragma_update(None, "foreign_keys", foreign_keys)?;

        migrations::run(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&conn)
    }

    // -- Primitives --
    //
    // Every query goes through one of these three. Values are always bound as
    // positional parameters, never spliced into the SQL text.

    /// Runs a statement that returns no rows. Returns the rowid of the most
    /// recent successful insert on this connection.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(sql, params)?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Returns the first row of the result, or `None` when there is none.
    pub fn fetch_one<P, T, F>(&self, sql: &str, params: P, map: F) -> Result<Option<T>>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.with_conn(|conn| Ok(conn.query_row(sql, params, map).optional()?))
    }

    pub fn fetch_all<P, T, F>(&self, sql: &str, params: P, map: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt
                .query_map(params, map)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }
}

/// True when `err` is SQLite rejecting a row because of a foreign key.
pub fn is_foreign_key_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _))
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}
