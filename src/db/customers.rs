//! Customer records and queries.

use anyhow::Result;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::Database;
use crate::format::now_iso;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
    /// Embedded photo bytes; omitted from backups when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<Vec<u8>>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

fn row_to_customer(row: &Row) -> rusqlite::Result<Customer> {
    Ok(Customer {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        address: row.get(3)?,
        photo: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

const CUSTOMER_COLUMNS: &str = "id, name, phone, address, photo, created_at, updated_at";

impl Database {
    pub fn create_customer(&self, name: &str, phone: &str, address: Option<&str>) -> Result<i64> {
        let now = now_iso();
        self.conn.execute(
            r#"
            INSERT INTO customers (name, phone, address, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
            rusqlite::params![name, phone, address, now, now],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update_customer(&self, id: i64, name: &str, phone: &str, address: Option<&str>) -> Result<()> {
        self.conn.execute(
            "UPDATE customers SET name = ?, phone = ?, address = ?, updated_at = ? WHERE id = ?",
            rusqlite::params![name, phone, address, now_iso(), id],
        )?;
        Ok(())
    }

    /// Delete a customer. Orders and measurements referencing it are left
    /// in place; there is no cascade.
    pub fn delete_customer(&self, id: i64) -> Result<()> {
        self.conn.execute("DELETE FROM customers WHERE id = ?", [id])?;
        Ok(())
    }

    pub fn get_customer(&self, id: i64) -> Result<Option<Customer>> {
        let result = self.conn.query_row(
            &format!("SELECT {} FROM customers WHERE id = ?", CUSTOMER_COLUMNS),
            [id],
            row_to_customer,
        );
        match result {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_customers(&self) -> Result<Vec<Customer>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM customers ORDER BY created_at DESC, id DESC",
            CUSTOMER_COLUMNS
        ))?;
        let customers = stmt
            .query_map([], row_to_customer)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(customers)
    }

    /// Case-insensitive substring search over name and phone.
    pub fn search_customers(&self, query: &str) -> Result<Vec<Customer>> {
        let pattern = format!("%{}%", query.trim());
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {} FROM customers
            WHERE name LIKE ?1 COLLATE NOCASE OR phone LIKE ?1
            ORDER BY created_at DESC, id DESC
            "#,
            CUSTOMER_COLUMNS
        ))?;
        let customers = stmt
            .query_map([pattern], row_to_customer)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(customers)
    }

    /// Whether a phone number is already taken by another customer.
    /// Used for inline form validation before hitting the unique index.
    pub fn phone_in_use(&self, phone: &str, exclude_id: Option<i64>) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM customers WHERE phone = ? AND id != ?",
            rusqlite::params![phone, exclude_id.unwrap_or(-1)],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn count_customers(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::test_db;

    #[test]
    fn test_customer_crud() {
        let db = test_db();
        let id = db.create_customer("Ahmed Khan", "0313-9003733", Some("Gul Plaza Road")).unwrap();

        let customer = db.get_customer(id).unwrap().unwrap();
        assert_eq!(customer.name, "Ahmed Khan");
        assert_eq!(customer.phone, "0313-9003733");
        assert_eq!(customer.address.as_deref(), Some("Gul Plaza Road"));

        db.update_customer(id, "Ahmed Khan", "0313-9003734", None).unwrap();
        let customer = db.get_customer(id).unwrap().unwrap();
        assert_eq!(customer.phone, "0313-9003734");
        assert_eq!(customer.address, None);

        db.delete_customer(id).unwrap();
        assert!(db.get_customer(id).unwrap().is_none());
    }

    #[test]
    fn test_phone_uniqueness_enforced() {
        let db = test_db();
        db.create_customer("A", "0313-1111111", None).unwrap();
        assert!(db.create_customer("B", "0313-1111111", None).is_err());
    }

    #[test]
    fn test_phone_in_use_excludes_self() {
        let db = test_db();
        let id = db.create_customer("A", "0313-1111111", None).unwrap();
        assert!(db.phone_in_use("0313-1111111", None).unwrap());
        assert!(!db.phone_in_use("0313-1111111", Some(id)).unwrap());
        assert!(!db.phone_in_use("0313-2222222", None).unwrap());
    }

    #[test]
    fn test_search_by_name_and_phone() {
        let db = test_db();
        db.create_customer("Ahmed Khan", "0313-1111111", None).unwrap();
        db.create_customer("Bilal Shah", "0345-2222222", None).unwrap();

        let hits = db.search_customers("ahmed").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Ahmed Khan");

        let hits = db.search_customers("0345").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Bilal Shah");

        assert!(db.search_customers("nobody").unwrap().is_empty());
    }
}
