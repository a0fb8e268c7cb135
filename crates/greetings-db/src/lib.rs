pub mod error;
pub mod migrations;
pub mod models;
pub mod queries;

pub use error::DbError;

use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::info;

pub const DEFAULT_READER_POOL_SIZE: usize = 4;

/// Connection pool with a reader/writer split.
///
/// All writes go through the single writer connection. Reads are spread
/// round-robin over read-only connections; an in-memory database has no
/// readers and serves reads from the writer.
pub struct Database {
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    reader_idx: AtomicUsize,
}

impl Database {
    /// Opens (or creates) the database at `path` and applies pending migrations.
    /// `:memory:` yields a private in-memory database.
    pub fn open(path: &Path, reader_pool_size: usize) -> anyhow::Result<Self> {
        if path.as_os_str() == ":memory:" {
            return Self::open_in_memory();
        }

        let writer = Connection::open(path)?;
        writer.pragma_update(None, "journal_mode", "WAL")?;
        migrations::run(&writer)?;

        let mut readers = Vec::with_capacity(reader_pool_size);
        for _ in 0..reader_pool_size {
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            readers.push(Mutex::new(conn));
        }

        info!(
            "Database opened at {} (1 writer + {} readers)",
            path.display(),
            reader_pool_size
        );
        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            reader_idx: AtomicUsize::new(0),
        })
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        let writer = Connection::open_in_memory()?;
        migrations::run(&writer)?;

        info!("In-memory database opened");
        Ok(Self {
            writer: Mutex::new(writer),
            readers: Vec::new(),
            reader_idx: AtomicUsize::new(0),
        })
    }

    pub fn reader_count(&self) -> usize {
        self.readers.len()
    }

    /// Runs `f` on a reader connection. The connection is released when `f` returns.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        if self.readers.is_empty() {
            return self.with_conn_mut(f);
        }
        let idx = self.reader_idx.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let conn = self.readers[idx]
            .lock()
            .map_err(|e| DbError::Poisoned(e.to_string()))?;
        f(&conn)
    }

    /// Runs `f` on the writer connection.
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        let conn = self
            .writer
            .lock()
            .map_err(|e| DbError::Poisoned(e.to_string()))?;
        f(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// Scratch database path unique to this test run; stale files are removed.
    fn scratch_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir()
            .join(format!("greetings-{}-{}.db", name, std::process::id()));
        remove_db_files(&path);
        path
    }

    fn remove_db_files(path: &Path) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = path.as_os_str().to_owned();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }

    fn exercise_file_pool(readers: usize) {
        let path = scratch_path(&format!("pool{}", readers));

        {
            let db = Database::open(&path, readers).unwrap();
            assert_eq!(db.reader_count(), readers);

            let created = db.create_greeting("Hi", "There").unwrap();

            // Every reader must observe the writer's commit.
            for _ in 0..readers.max(1) * 2 {
                let row = db.get_greeting(created.id).unwrap().unwrap();
                assert_eq!(row.title, "Hi");
            }

            db.update_greeting(created.id, "Hello", "World").unwrap().unwrap();
            for _ in 0..readers.max(1) * 2 {
                let row = db.get_greeting(created.id).unwrap().unwrap();
                assert_eq!(row.title, "Hello");
            }
            db.ping().unwrap();
        }

        let reopened = Database::open(&path, readers).unwrap();
        let rows = reopened.list_greetings().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].message, "World");

        let version = reopened
            .with_conn(|conn| {
                let v: i64 =
                    conn.query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))?;
                Ok(v)
            })
            .unwrap();
        assert_eq!(version, 1);

        drop(reopened);
        remove_db_files(&path);
    }

    #[test]
    fn file_pool_with_readers() {
        exercise_file_pool(2);
    }

    #[test]
    fn file_pool_without_readers_reads_from_writer() {
        exercise_file_pool(0);
    }

    #[test]
    fn memory_path_opens_in_memory() {
        let db = Database::open(Path::new(":memory:"), 4).unwrap();
        assert_eq!(db.reader_count(), 0);
        db.create_user("Ann", "ann@example.com", "hash").unwrap();
        assert_eq!(db.list_users().unwrap().len(), 1);
    }
}
