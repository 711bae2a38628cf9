//! Workshop staff records.

use anyhow::Result;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::Database;
use crate::format::now_iso;

/// Staff role on the shop floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerRole {
    Cutter,
    Checker,
    Karigar,
}

impl WorkerRole {
    pub const ALL: [WorkerRole; 3] = [WorkerRole::Cutter, WorkerRole::Checker, WorkerRole::Karigar];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerRole::Cutter => "cutter",
            WorkerRole::Checker => "checker",
            WorkerRole::Karigar => "karigar",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "cutter" => Some(WorkerRole::Cutter),
            "checker" => Some(WorkerRole::Checker),
            "karigar" => Some(WorkerRole::Karigar),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            WorkerRole::Cutter => "Cutter",
            WorkerRole::Checker => "Checker",
            WorkerRole::Karigar => "Karigar",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: WorkerRole,
    pub is_active: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

fn row_to_worker(row: &Row) -> rusqlite::Result<Worker> {
    let role: String = row.get(3)?;
    Ok(Worker {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        role: WorkerRole::from_str(&role).unwrap_or(WorkerRole::Karigar),
        is_active: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

const WORKER_COLUMNS: &str = "id, name, phone, role, is_active, created_at, updated_at";

impl Database {
    pub fn create_worker(&self, name: &str, phone: Option<&str>, role: WorkerRole) -> Result<i64> {
        let now = now_iso();
        self.conn.execute(
            "INSERT INTO workers (name, phone, role, is_active, created_at, updated_at) VALUES (?, ?, ?, 1, ?, ?)",
            rusqlite::params![name, phone, role.as_str(), now, now],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update_worker(&self, id: i64, name: &str, phone: Option<&str>, role: WorkerRole) -> Result<()> {
        self.conn.execute(
            "UPDATE workers SET name = ?, phone = ?, role = ?, updated_at = ? WHERE id = ?",
            rusqlite::params![name, phone, role.as_str(), now_iso(), id],
        )?;
        Ok(())
    }

    pub fn set_worker_active(&self, id: i64, active: bool) -> Result<()> {
        self.conn.execute(
            "UPDATE workers SET is_active = ?, updated_at = ? WHERE id = ?",
            rusqlite::params![active, now_iso(), id],
        )?;
        Ok(())
    }

    pub fn delete_worker(&self, id: i64) -> Result<()> {
        self.conn.execute("DELETE FROM workers WHERE id = ?", [id])?;
        Ok(())
    }

    pub fn get_worker(&self, id: i64) -> Result<Option<Worker>> {
        let result = self.conn.query_row(
            &format!("SELECT {} FROM workers WHERE id = ?", WORKER_COLUMNS),
            [id],
            row_to_worker,
        );
        match result {
            Ok(w) => Ok(Some(w)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_workers(&self) -> Result<Vec<Worker>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM workers ORDER BY role, name",
            WORKER_COLUMNS
        ))?;
        let workers = stmt
            .query_map([], row_to_worker)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(workers)
    }

    /// Active workers with the given role, for the order form pickers.
    pub fn active_workers_by_role(&self, role: WorkerRole) -> Result<Vec<Worker>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM workers WHERE role = ? AND is_active = 1 ORDER BY name",
            WORKER_COLUMNS
        ))?;
        let workers = stmt
            .query_map([role.as_str()], row_to_worker)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(workers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    #[test]
    fn test_worker_crud_and_role_filter() {
        let db = test_db();
        let cutter = db.create_worker("Rashid", None, WorkerRole::Cutter).unwrap();
        db.create_worker("Imran", Some("0313-1234567"), WorkerRole::Karigar).unwrap();

        let cutters = db.active_workers_by_role(WorkerRole::Cutter).unwrap();
        assert_eq!(cutters.len(), 1);
        assert_eq!(cutters[0].name, "Rashid");

        db.set_worker_active(cutter, false).unwrap();
        assert!(db.active_workers_by_role(WorkerRole::Cutter).unwrap().is_empty());
        assert_eq!(db.list_workers().unwrap().len(), 2);

        db.delete_worker(cutter).unwrap();
        assert!(db.get_worker(cutter).unwrap().is_none());
    }
}
