//! SQLite connection and baseline schema provisioning.

use crate::error::AppError;
use crate::infra::live::ChangeHub;
use crate::infra::{live, vector};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const BASELINE_SCHEMA: &str = include_str!("../../schema/init.sql");

/// Optional store capabilities. Both off by default; enabling either must
/// not change baseline behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct DbOptions {
    /// Table change notification via the connection's update hook.
    pub live: bool,
    /// `vec_distance` similarity operator for embedding columns.
    pub vector: bool,
}

/// The single process-wide database handle. Created once at startup,
/// shared by every command through Tauri managed state, never closed.
#[derive(Debug)]
pub struct DbPool {
    conn: Mutex<Connection>,
    options: DbOptions,
    changes: ChangeHub,
}

impl DbPool {
    pub fn options(&self) -> DbOptions {
        self.options
    }

    pub fn changes(&self) -> &ChangeHub {
        &self.changes
    }
}

/// Open (or create) the store at `db_path`, configure the requested
/// capabilities, make sure the baseline schema is present, and return the
/// managed handle.
pub fn init_db(db_path: &Path, options: DbOptions) -> Result<DbPool, AppError> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AppError::Db(e.to_string()))?;
    }
    let conn = Connection::open(db_path).map_err(|e| AppError::Db(e.to_string()))?;
    provision(conn, options)
}

/// In-memory pool with every capability enabled, for tests.
pub fn init_test_db() -> DbPool {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    let options = DbOptions {
        live: true,
        vector: true,
    };
    provision(conn, options).expect("provision in-memory db")
}

fn provision(conn: Connection, options: DbOptions) -> Result<DbPool, AppError> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|e| AppError::Db(e.to_string()))?;

    let changes = ChangeHub::default();
    if options.vector {
        vector::install(&conn).map_err(|e| AppError::Db(e.to_string()))?;
    }
    if options.live {
        live::install(&conn, changes.clone());
    }

    ensure_schema(&conn)?;

    Ok(DbPool {
        conn: Mutex::new(conn),
        options,
        changes,
    })
}

/// Probe the sentinel table and apply the baseline schema when the store
/// turns out to be unprovisioned. Safe to call on every startup: the schema
/// script only contains `IF NOT EXISTS` statements.
///
/// The two unprovisioned cases stay distinct: a probe that succeeds with
/// zero rows is the normal first-run shape and logs at info, while a probe
/// that fails outright (sentinel table missing) logs a warning first. Both
/// converge on the same schema application, and a failure there is not
/// caught — a store that cannot be provisioned is fatal for startup.
pub fn ensure_schema(conn: &Connection) -> Result<(), AppError> {
    match probe_productos(conn) {
        Ok(true) => {
            log::debug!("productos populated, schema assumed present");
        }
        Ok(false) => {
            log::info!("productos empty, applying baseline schema");
            conn.execute_batch(BASELINE_SCHEMA)
                .map_err(|e| AppError::Db(e.to_string()))?;
        }
        Err(e) => {
            log::warn!("schema probe failed ({e}), applying baseline schema");
            conn.execute_batch(BASELINE_SCHEMA)
                .map_err(|e| AppError::Db(e.to_string()))?;
        }
    }
    Ok(())
}

/// At most one row. Errors when the table itself is missing, which
/// `ensure_schema` treats differently from "present but empty".
fn probe_productos(conn: &Connection) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare("SELECT * FROM productos LIMIT 1")?;
    let mut rows = stmt.query([])?;
    Ok(rows.next()?.is_some())
}

/// Get connection from pool (for use in commands).
pub fn get_connection(pool: &DbPool) -> MutexGuard<'_, Connection> {
    pool.conn.lock().expect("db lock")
}
