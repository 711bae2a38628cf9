//! Backup export and restore.
//!
//! Backups are a single JSON document: an envelope with a format version
//! and timestamp wrapping the full table contents. Restore merges by
//! primary key inside one transaction: records in the file overwrite
//! their counterparts, records absent from the file are left in place,
//! and a rejected or failing import leaves the database untouched.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::db::{Customer, CustomerMeasurement, Database, LegacyMeasurement, Order};
use crate::format::{format_date, now_iso, today_ymd};
use crate::templates::CSV_MEASUREMENT_COLUMNS;

pub const BACKUP_VERSION: u32 = 1;

/// Byte order mark so Excel opens the CSV as UTF-8.
const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("backup file is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),
    #[error("backup file is missing the {0} section")]
    MissingSection(&'static str),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupData {
    pub customers: Vec<Customer>,
    pub orders: Vec<Order>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub measurements: Vec<LegacyMeasurement>,
    #[serde(default)]
    pub customer_measurements: Vec<CustomerMeasurement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupFile {
    pub version: u32,
    pub timestamp: String,
    pub data: BackupData,
}

/// Counts reported after a successful restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub customers: usize,
    pub orders: usize,
    pub measurements: usize,
}

/// Serialize the full database to a backup document.
pub fn export_backup(db: &Database) -> Result<String> {
    let file = BackupFile {
        version: BACKUP_VERSION,
        timestamp: now_iso(),
        data: BackupData {
            customers: db.list_customers()?,
            orders: db.list_orders(None)?,
            measurements: db.all_legacy_measurements()?,
            customer_measurements: db.all_measurements()?,
        },
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

fn parse_backup(json: &str) -> Result<BackupData, BackupError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    // The envelope is mandatory: a stray JSON file that happens to carry
    // top-level table lists must not be mistaken for a backup
    let Some(data) = value.get("data") else {
        return Err(BackupError::MissingSection("data"));
    };
    for section in ["customers", "orders"] {
        match data.get(section) {
            Some(v) if v.is_array() => {}
            _ => {
                return Err(BackupError::MissingSection(match section {
                    "customers" => "customers",
                    _ => "orders",
                }))
            }
        }
    }
    Ok(serde_json::from_value(data.clone())?)
}

/// Merge a backup into the database: every record in the file is written
/// over its primary-key counterpart, records the file does not name are
/// kept. Settings and workers are local to the machine and are never part
/// of a backup.
pub fn import_backup(db: &Database, json: &str) -> Result<ImportSummary> {
    let data = parse_backup(json)?;

    let tx = db.conn.unchecked_transaction()?;
    let now = now_iso();
    for c in &data.customers {
        tx.execute(
            r#"
            INSERT OR REPLACE INTO customers (id, name, phone, address, photo, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            rusqlite::params![
                c.id,
                c.name,
                c.phone,
                c.address,
                c.photo,
                if c.created_at.is_empty() { &now } else { &c.created_at },
                if c.updated_at.is_empty() { &now } else { &c.updated_at },
            ],
        )?;
    }
    for o in &data.orders {
        tx.execute(
            r#"
            INSERT OR REPLACE INTO orders (id, customer_id, status, due_date, advance_payment, delivery_notes,
                                           cutter_id, checker_id, karigar_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            rusqlite::params![
                o.id,
                o.customer_id,
                o.status.as_str(),
                o.due_date,
                o.advance_payment,
                o.delivery_notes,
                o.cutter_id,
                o.checker_id,
                o.karigar_id,
                if o.created_at.is_empty() { &now } else { &o.created_at },
                if o.updated_at.is_empty() { &now } else { &o.updated_at },
            ],
        )?;
    }
    // Order-scoped measurements from old backups, only when the file
    // carries no customer-level records
    if data.customer_measurements.is_empty() {
        for m in &data.measurements {
            tx.execute(
                "INSERT OR REPLACE INTO measurements (id, order_id, fields) VALUES (?, ?, ?)",
                rusqlite::params![m.id, m.order_id, serde_json::to_string(&m.fields)?],
            )?;
        }
    }
    for m in &data.customer_measurements {
        tx.execute(
            r#"
            INSERT OR REPLACE INTO customer_measurements (id, customer_id, fields, design_options, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            rusqlite::params![
                m.id,
                m.customer_id,
                serde_json::to_string(&m.fields)?,
                serde_json::to_string(&m.design_options)?,
                if m.created_at.is_empty() { &now } else { &m.created_at },
                if m.updated_at.is_empty() { &now } else { &m.updated_at },
            ],
        )?;
    }
    tx.commit()?;

    let summary = ImportSummary {
        customers: data.customers.len(),
        orders: data.orders.len(),
        measurements: data.customer_measurements.len(),
    };
    info!(
        "backup restored: {} customers, {} orders, {} measurements",
        summary.customers, summary.orders, summary.measurements
    );
    Ok(summary)
}

/// Customer list as CSV bytes, one row per customer with order totals and
/// measurement columns. Prefixed with a UTF-8 BOM for spreadsheet apps.
pub fn customers_csv(db: &Database) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.extend_from_slice(UTF8_BOM);

    let mut writer = csv::Writer::from_writer(buf);
    let mut header = vec!["Name", "Phone", "Address", "Total Orders", "Last Order Date"];
    header.extend(CSV_MEASUREMENT_COLUMNS.iter().map(|(label, _)| *label));
    writer.write_record(&header)?;

    for customer in db.list_customers()? {
        let Some(cid) = customer.id else { continue };
        let orders = db.orders_for_customer(cid)?;
        let last_order = orders
            .first()
            .map(|o| format_date(&o.created_at))
            .unwrap_or_default();
        let measurement = db.measurement_for_customer(cid)?;

        let mut record = vec![
            customer.name.clone(),
            customer.phone.clone(),
            customer.address.clone().unwrap_or_default(),
            orders.len().to_string(),
            last_order,
        ];
        for (_, key) in CSV_MEASUREMENT_COLUMNS {
            let value = measurement
                .as_ref()
                .map(|m| m.field(key).to_string())
                .unwrap_or_default();
            record.push(value);
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("finishing csv export: {}", e))
}

/// Suggested filename for a new backup.
pub fn backup_filename() -> String {
    format!("darzi-backup-{}.json", today_ymd())
}

/// Suggested filename for a customer CSV export.
pub fn csv_filename() -> String {
    format!("darzi-customers-{}.csv", today_ymd())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_db, OrderStatus, StatusPolicy};
    use std::collections::BTreeMap;

    fn seeded_db() -> Database {
        let db = test_db();
        let cid = db.create_customer("Bilal Ahmed", "0313-9001122", Some("Main Bazaar")).unwrap();
        let order = Order {
            id: None,
            customer_id: cid,
            status: OrderStatus::New,
            due_date: "2026-09-10".to_string(),
            advance_payment: Some("500".to_string()),
            delivery_notes: None,
            cutter_id: None,
            checker_id: None,
            karigar_id: None,
            created_at: String::new(),
            updated_at: String::new(),
        };
        let oid = db.create_order(&order).unwrap();
        db.update_order_status(oid, OrderStatus::Ready, StatusPolicy::Free).unwrap();

        let mut fields = BTreeMap::new();
        fields.insert("length".to_string(), "42".to_string());
        fields.insert("chest".to_string(), "24.5".to_string());
        let mut options = BTreeMap::new();
        options.insert("zip_shalwar".to_string(), true);
        db.upsert_measurement(cid, &fields, &options).unwrap();
        db
    }

    #[test]
    fn test_export_then_import_round_trip() {
        let source = seeded_db();
        let json = export_backup(&source).unwrap();

        let target = test_db();
        let summary = import_backup(&target, &json).unwrap();
        assert_eq!(summary.customers, 1);
        assert_eq!(summary.orders, 1);
        assert_eq!(summary.measurements, 1);

        let customers = target.list_customers().unwrap();
        assert_eq!(customers[0].name, "Bilal Ahmed");
        let cid = customers[0].id.unwrap();
        let orders = target.orders_for_customer(cid).unwrap();
        assert_eq!(orders[0].status, OrderStatus::Ready);
        let m = target.measurement_for_customer(cid).unwrap().unwrap();
        assert_eq!(m.field("length"), "42");
        assert!(m.option("zip_shalwar"));
    }

    #[test]
    fn test_import_overwrites_matching_ids_in_place() {
        let target = test_db();
        let cid = target.create_customer("Misspelt", "0313-9001122", None).unwrap();

        let json = format!(
            r#"{{"version": 1, "timestamp": "2026-01-01", "data": {{
                "customers": [{{"id": {}, "name": "Corrected", "phone": "0313-9001122"}}],
                "orders": []
            }}}}"#,
            cid
        );
        import_backup(&target, &json).unwrap();

        let customers = target.list_customers().unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].name, "Corrected");
    }

    #[test]
    fn test_import_keeps_records_absent_from_backup() {
        let target = test_db();
        target.create_customer("Keep Me", "0300-1234567", None).unwrap();

        let json = r#"{"version": 1, "timestamp": "2026-01-01", "data": {
            "customers": [{"id": 42, "name": "Incoming", "phone": "0313-5550000"}],
            "orders": []
        }}"#;
        import_backup(&target, json).unwrap();

        let names: Vec<String> = target
            .list_customers()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert!(names.contains(&"Keep Me".to_string()));
        assert!(names.contains(&"Incoming".to_string()));
    }

    #[test]
    fn test_malformed_json_leaves_database_untouched() {
        let db = seeded_db();
        let err = import_backup(&db, "{not json").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BackupError>(),
            Some(BackupError::MalformedJson(_))
        ));
        assert_eq!(db.count_customers().unwrap(), 1);
    }

    #[test]
    fn test_missing_orders_section_is_rejected() {
        let db = seeded_db();
        let err = import_backup(&db, r#"{"data": {"customers": []}}"#).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BackupError>(),
            Some(BackupError::MissingSection("orders"))
        ));
        assert_eq!(db.count_customers().unwrap(), 1);
    }

    #[test]
    fn test_payload_without_envelope_is_rejected() {
        let db = seeded_db();
        let err = import_backup(&db, r#"{"customers": [], "orders": []}"#).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BackupError>(),
            Some(BackupError::MissingSection("data"))
        ));
        assert_eq!(db.count_customers().unwrap(), 1);
    }

    #[test]
    fn test_legacy_order_measurements_imported_as_fallback() {
        let db = test_db();
        let json = r#"{"version": 1, "timestamp": "2024-01-01", "data": {
            "customers": [{"id": 1, "name": "Rafiq", "phone": "0313-5550000"}],
            "orders": [],
            "measurements": [{"orderId": 7, "fields": {"length": "40"}}]
        }}"#;
        let summary = import_backup(&db, json).unwrap();
        assert_eq!(summary.customers, 1);
        assert_eq!(db.all_legacy_measurements().unwrap().len(), 1);
    }

    #[test]
    fn test_legacy_measurements_ignored_when_customer_records_present() {
        let db = test_db();
        let json = r#"{"version": 1, "timestamp": "2024-01-01", "data": {
            "customers": [{"id": 1, "name": "Rafiq", "phone": "0313-5550000"}],
            "orders": [],
            "measurements": [{"orderId": 7, "fields": {"length": "40"}}],
            "customerMeasurements": [{"id": 1, "customerId": 1, "fields": {"length": "41"}}]
        }}"#;
        import_backup(&db, json).unwrap();
        assert!(db.all_legacy_measurements().unwrap().is_empty());
        let m = db.measurement_for_customer(1).unwrap().unwrap();
        assert_eq!(m.field("length"), "41");
    }

    #[test]
    fn test_csv_has_bom_headers_and_measurements() {
        let db = seeded_db();
        let bytes = customers_csv(&db).unwrap();
        assert!(bytes.starts_with(b"\xef\xbb\xbf"));

        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("Name,Phone,Address,Total Orders,Last Order Date"));
        assert!(header.ends_with("Pancha"));

        let row = lines.next().unwrap();
        assert!(row.contains("Bilal Ahmed"));
        assert!(row.contains(",1,")); // total orders
        assert!(row.contains("42")); // length
    }

    #[test]
    fn test_csv_customer_without_measurement_gets_empty_columns() {
        let db = test_db();
        db.create_customer("NoTape", "0313-7778888", None).unwrap();
        let bytes = customers_csv(&db).unwrap();
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert!(row.starts_with("NoTape,0313-7778888,,0,"));
    }
}
