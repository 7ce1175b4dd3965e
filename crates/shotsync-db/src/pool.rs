//! r2d2 pools over SQLite.
//!
//! Both constructors migrate the schema before handing the pool out, so every
//! connection taken from a pool sees the `entities` table.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use shotsync_common::StoreError;

use crate::migrations;

pub type DbPool = Pool<SqliteConnectionManager>;

pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Open (creating if needed) the database file at `db_path`.
///
/// Connections enable foreign keys and wait up to five seconds on a locked
/// database. Pending migrations run before the pool is returned.
///
/// ```no_run
/// use shotsync_db::pool::init_pool;
///
/// let pool = init_pool("/var/lib/shotsync/entities.sqlite").unwrap();
/// assert!(pool.max_size() > 1);
/// ```
pub fn init_pool(db_path: &str) -> Result<DbPool, StoreError> {
    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
    });

    let pool = Pool::builder()
        .max_size(4)
        .build(manager)
        .map_err(|e| StoreError::database(format!("Failed to create connection pool: {}", e)))?;

    migrate(&pool)?;
    Ok(pool)
}

/// Initialize an in-memory database pool for testing and dry runs.
///
/// Every SQLite in-memory connection is its own database, so the pool holds a
/// single connection. The data is lost when the pool is dropped.
///
/// # Example
///
/// ```
/// use shotsync_db::pool::init_memory_pool;
///
/// let pool = init_memory_pool().unwrap();
/// assert_eq!(pool.max_size(), 1);
/// ```
pub fn init_memory_pool() -> Result<DbPool, StoreError> {
    let manager = SqliteConnectionManager::memory()
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

    let pool = Pool::builder()
        .max_size(1)
        .build(manager)
        .map_err(|e| StoreError::database(format!("Failed to create in-memory pool: {}", e)))?;

    migrate(&pool)?;
    Ok(pool)
}

fn migrate(pool: &DbPool) -> Result<(), StoreError> {
    let conn = get_conn(pool)?;
    migrations::run_migrations(&conn)
        .map_err(|e| StoreError::database(format!("Failed to run migrations: {}", e)))?;
    Ok(())
}

/// Check a connection out of `pool`, reporting pool exhaustion as a [`StoreError`].
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection, StoreError> {
    pool.get()
        .map_err(|e| StoreError::database(format!("Failed to get connection from pool: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_memory_pool() {
        let pool = init_memory_pool().unwrap();
        assert_eq!(pool.max_size(), 1);
    }

    #[test]
    fn test_get_conn() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let enabled: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_migrations_run_on_init() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='entities'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_file_pool_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entities.sqlite");
        let pool = init_pool(&path.to_string_lossy()).unwrap();

        {
            let conn = get_conn(&pool).unwrap();
            conn.execute(
                "INSERT INTO entities (entity_type, code, fields, created_at) VALUES (?, ?, ?, ?)",
                rusqlite::params!["Shot", "SH010", "{}", "2024-01-01T00:00:00Z"],
            )
            .unwrap();
        }

        let conn = get_conn(&pool).unwrap();
        let code: String = conn
            .query_row(
                "SELECT code FROM entities WHERE entity_type = ?",
                ["Shot"],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(code, "SH010");
    }
}
