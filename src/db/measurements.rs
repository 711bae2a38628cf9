//! Customer measurement records.
//!
//! Measurement fields and design options are stored as JSON maps in text
//! columns. A unique index on `customer_id` guarantees at most one record
//! per customer; writes go through an upsert so concurrent saves cannot
//! create duplicates.

use anyhow::Result;
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Database;
use crate::format::now_iso;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerMeasurement {
    #[serde(default)]
    pub id: Option<i64>,
    pub customer_id: i64,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub design_options: BTreeMap<String, bool>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl CustomerMeasurement {
    pub fn empty(customer_id: i64) -> Self {
        Self {
            id: None,
            customer_id,
            fields: BTreeMap::new(),
            design_options: BTreeMap::new(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    pub fn field(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn option(&self, key: &str) -> bool {
        self.design_options.get(key).copied().unwrap_or(false)
    }
}

/// Order-scoped measurement from schema versions before customer-level
/// measurements existed. Only read and written by backup import/export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyMeasurement {
    #[serde(default)]
    pub id: Option<i64>,
    pub order_id: i64,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

fn row_to_measurement(row: &Row) -> rusqlite::Result<CustomerMeasurement> {
    let fields_json: String = row.get(2)?;
    let options_json: String = row.get(3)?;
    Ok(CustomerMeasurement {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        fields: serde_json::from_str(&fields_json).unwrap_or_default(),
        design_options: serde_json::from_str(&options_json).unwrap_or_default(),
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

impl Database {
    /// First measurement record for a customer, if any.
    pub fn measurement_for_customer(&self, customer_id: i64) -> Result<Option<CustomerMeasurement>> {
        let result = self.conn.query_row(
            r#"
            SELECT id, customer_id, fields, design_options, created_at, updated_at
            FROM customer_measurements
            WHERE customer_id = ?
            ORDER BY id
            LIMIT 1
            "#,
            [customer_id],
            row_to_measurement,
        );
        match result {
            Ok(m) => Ok(Some(m)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert or update the single measurement record for a customer.
    /// Returns the record id.
    pub fn upsert_measurement(
        &self,
        customer_id: i64,
        fields: &BTreeMap<String, String>,
        design_options: &BTreeMap<String, bool>,
    ) -> Result<i64> {
        let now = now_iso();
        let fields_json = serde_json::to_string(fields)?;
        let options_json = serde_json::to_string(design_options)?;
        self.conn.execute(
            r#"
            INSERT INTO customer_measurements (customer_id, fields, design_options, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT(customer_id) DO UPDATE SET
                fields = excluded.fields,
                design_options = excluded.design_options,
                updated_at = excluded.updated_at
            "#,
            rusqlite::params![customer_id, fields_json, options_json, now],
        )?;
        let id = self.conn.query_row(
            "SELECT id FROM customer_measurements WHERE customer_id = ?",
            [customer_id],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    pub fn all_measurements(&self) -> Result<Vec<CustomerMeasurement>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, customer_id, fields, design_options, created_at, updated_at
            FROM customer_measurements
            ORDER BY id
            "#,
        )?;
        let measurements = stmt
            .query_map([], row_to_measurement)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(measurements)
    }

    pub fn all_legacy_measurements(&self) -> Result<Vec<LegacyMeasurement>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, order_id, fields FROM measurements ORDER BY id")?;
        let measurements = stmt
            .query_map([], |row| {
                let fields_json: String = row.get(2)?;
                Ok(LegacyMeasurement {
                    id: row.get(0)?,
                    order_id: row.get(1)?,
                    fields: serde_json::from_str(&fields_json).unwrap_or_default(),
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(measurements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    #[test]
    fn test_upsert_creates_then_updates_single_record() {
        let db = test_db();
        let cid = db.create_customer("A", "0313-1111111", None).unwrap();

        let mut fields = BTreeMap::new();
        fields.insert("length".to_string(), "42".to_string());
        let options = BTreeMap::new();

        let first = db.upsert_measurement(cid, &fields, &options).unwrap();

        fields.insert("chest".to_string(), "24.5".to_string());
        let second = db.upsert_measurement(cid, &fields, &options).unwrap();
        assert_eq!(first, second);

        let stored = db.measurement_for_customer(cid).unwrap().unwrap();
        assert_eq!(stored.field("length"), "42");
        assert_eq!(stored.field("chest"), "24.5");
        assert_eq!(db.all_measurements().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_measurement_is_none() {
        let db = test_db();
        let cid = db.create_customer("A", "0313-1111111", None).unwrap();
        assert!(db.measurement_for_customer(cid).unwrap().is_none());
    }

    #[test]
    fn test_design_options_round_trip() {
        let db = test_db();
        let cid = db.create_customer("A", "0313-1111111", None).unwrap();

        let fields = BTreeMap::new();
        let mut options = BTreeMap::new();
        options.insert("zip_shalwar".to_string(), true);
        options.insert("double_silai".to_string(), false);
        db.upsert_measurement(cid, &fields, &options).unwrap();

        let stored = db.measurement_for_customer(cid).unwrap().unwrap();
        assert!(stored.option("zip_shalwar"));
        assert!(!stored.option("double_silai"));
        assert!(!stored.option("never_set"));
    }
}
