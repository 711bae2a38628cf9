mod schema;
pub mod customers;
pub mod measurements;
pub mod orders;
pub mod settings;
pub mod workers;

use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;

pub use customers::Customer;
pub use measurements::{CustomerMeasurement, LegacyMeasurement};
pub use orders::{Order, OrderStatus, StatusPolicy, StatusPolicyError};
pub use schema::{MIGRATIONS, SCHEMA};
pub use settings::Settings;
pub use workers::{Worker, WorkerRole};

/// Handle to the shop database.
///
/// Owned by whichever component performs the writes; components receive a
/// `&Database` rather than reaching for a global. Open a second handle on
/// the same path for work running off the UI thread (the autosave worker
/// does this) - SQLite serializes the writes.
pub struct Database {
    pub(crate) conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(Self { conn })
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        self.run_migrations()?;
        Ok(())
    }

    /// Every migration uses IF NOT EXISTS, so re-runs are no-ops; a real
    /// failure (say a unique index over pre-existing duplicate rows) must
    /// abort startup rather than leave the invariant unenforced.
    fn run_migrations(&self) -> Result<()> {
        for migration in MIGRATIONS {
            self.conn.execute(migration, [])?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_db() -> Database {
    let db = Database::open_in_memory().expect("open in-memory db");
    db.initialize().expect("initialize schema");
    db
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.db");
        let db = Database::open(&path).unwrap();
        db.initialize().unwrap();
        db.initialize().unwrap();
        drop(db);

        let db = Database::open(&path).unwrap();
        db.initialize().unwrap();
        assert_eq!(db.count_customers().unwrap(), 0);
    }

    #[test]
    fn test_initialize_fails_on_duplicate_phones() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.db");
        {
            // Pre-index database with two customers sharing a phone
            let conn = rusqlite::Connection::open(&path).unwrap();
            conn.execute_batch(SCHEMA).unwrap();
            conn.execute(
                "INSERT INTO customers (name, phone) VALUES ('A', '0313-1111111'), ('B', '0313-1111111')",
                [],
            )
            .unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert!(db.initialize().is_err());
    }
}
