//! Order records, status progression and queries.

use anyhow::Result;
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Database;
use crate::format::now_iso;

/// Lifecycle stage of an order. The variant order is the display order
/// used by the status filter and the forward-only policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    InProgress,
    Ready,
    Delivered,
    Completed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::New,
        OrderStatus::InProgress,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "new" => Some(OrderStatus::New),
            "in_progress" => Some(OrderStatus::InProgress),
            "ready" => Some(OrderStatus::Ready),
            "delivered" => Some(OrderStatus::Delivered),
            "completed" => Some(OrderStatus::Completed),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::New => "New",
            OrderStatus::InProgress => "In Progress",
            OrderStatus::Ready => "Ready",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Completed => "Completed",
        }
    }

    /// Position in the progression, for the forward-only policy.
    fn rank(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    /// An order still on the shop floor (not delivered or completed).
    pub fn is_open(&self) -> bool {
        !matches!(self, OrderStatus::Delivered | OrderStatus::Completed)
    }
}

/// Transition policy for order status changes.
///
/// The shop historically allowed arbitrary jumps (staff revert statuses
/// after mistakes), so `Free` is the default; `Forward` enforces
/// monotonic progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusPolicy {
    #[default]
    Free,
    Forward,
}

impl StatusPolicy {
    pub fn allows(&self, from: OrderStatus, to: OrderStatus) -> bool {
        match self {
            StatusPolicy::Free => true,
            StatusPolicy::Forward => to.rank() >= from.rank(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot move order from {} back to {}", from.display_name(), to.display_name())]
pub struct StatusPolicyError {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default)]
    pub id: Option<i64>,
    pub customer_id: i64,
    pub status: OrderStatus,
    /// Due date as YYYY-MM-DD.
    pub due_date: String,
    #[serde(default)]
    pub advance_payment: Option<String>,
    #[serde(default)]
    pub delivery_notes: Option<String>,
    #[serde(default)]
    pub cutter_id: Option<i64>,
    #[serde(default)]
    pub checker_id: Option<i64>,
    #[serde(default)]
    pub karigar_id: Option<i64>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

fn row_to_order(row: &Row) -> rusqlite::Result<Order> {
    let status: String = row.get(2)?;
    Ok(Order {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        status: OrderStatus::from_str(&status).unwrap_or(OrderStatus::New),
        due_date: row.get(3)?,
        advance_payment: row.get(4)?,
        delivery_notes: row.get(5)?,
        cutter_id: row.get(6)?,
        checker_id: row.get(7)?,
        karigar_id: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

const ORDER_COLUMNS: &str = "id, customer_id, status, due_date, advance_payment, delivery_notes, \
                             cutter_id, checker_id, karigar_id, created_at, updated_at";

impl Database {
    pub fn create_order(&self, order: &Order) -> Result<i64> {
        let now = now_iso();
        self.conn.execute(
            r#"
            INSERT INTO orders (customer_id, status, due_date, advance_payment, delivery_notes,
                                cutter_id, checker_id, karigar_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            rusqlite::params![
                order.customer_id,
                order.status.as_str(),
                order.due_date,
                order.advance_payment,
                order.delivery_notes,
                order.cutter_id,
                order.checker_id,
                order.karigar_id,
                now,
                now,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update_order(&self, id: i64, order: &Order) -> Result<()> {
        self.conn.execute(
            r#"
            UPDATE orders
            SET customer_id = ?, status = ?, due_date = ?, advance_payment = ?, delivery_notes = ?,
                cutter_id = ?, checker_id = ?, karigar_id = ?, updated_at = ?
            WHERE id = ?
            "#,
            rusqlite::params![
                order.customer_id,
                order.status.as_str(),
                order.due_date,
                order.advance_payment,
                order.delivery_notes,
                order.cutter_id,
                order.checker_id,
                order.karigar_id,
                now_iso(),
                id,
            ],
        )?;
        Ok(())
    }

    /// Change an order's status, enforcing the configured policy.
    pub fn update_order_status(
        &self,
        id: i64,
        to: OrderStatus,
        policy: StatusPolicy,
    ) -> Result<()> {
        let from: String = self
            .conn
            .query_row("SELECT status FROM orders WHERE id = ?", [id], |row| row.get(0))?;
        let from = OrderStatus::from_str(&from).unwrap_or(OrderStatus::New);
        if !policy.allows(from, to) {
            return Err(StatusPolicyError { from, to }.into());
        }
        self.conn.execute(
            "UPDATE orders SET status = ?, updated_at = ? WHERE id = ?",
            rusqlite::params![to.as_str(), now_iso(), id],
        )?;
        Ok(())
    }

    pub fn delete_order(&self, id: i64) -> Result<()> {
        self.conn.execute("DELETE FROM orders WHERE id = ?", [id])?;
        Ok(())
    }

    pub fn get_order(&self, id: i64) -> Result<Option<Order>> {
        let result = self.conn.query_row(
            &format!("SELECT {} FROM orders WHERE id = ?", ORDER_COLUMNS),
            [id],
            row_to_order,
        );
        match result {
            Ok(o) => Ok(Some(o)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List orders, newest first, optionally restricted to one status.
    /// `filter = None` means all statuses.
    pub fn list_orders(&self, filter: Option<OrderStatus>) -> Result<Vec<Order>> {
        match filter {
            Some(status) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM orders WHERE status = ? ORDER BY created_at DESC, id DESC",
                    ORDER_COLUMNS
                ))?;
                let orders = stmt
                    .query_map([status.as_str()], row_to_order)?
                    .filter_map(|r| r.ok())
                    .collect();
                Ok(orders)
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM orders ORDER BY created_at DESC, id DESC",
                    ORDER_COLUMNS
                ))?;
                let orders = stmt
                    .query_map([], row_to_order)?
                    .filter_map(|r| r.ok())
                    .collect();
                Ok(orders)
            }
        }
    }

    pub fn orders_for_customer(&self, customer_id: i64) -> Result<Vec<Order>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM orders WHERE customer_id = ? ORDER BY created_at DESC, id DESC",
            ORDER_COLUMNS
        ))?;
        let orders = stmt
            .query_map([customer_id], row_to_order)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(orders)
    }

    pub fn count_orders(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn count_orders_by_status(&self, status: OrderStatus) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM orders WHERE status = ?",
            [status.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Open orders due on the given day (YYYY-MM-DD).
    pub fn orders_due_on(&self, date: &str) -> Result<Vec<Order>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {} FROM orders
            WHERE due_date = ? AND status NOT IN ('delivered', 'completed')
            ORDER BY id
            "#,
            ORDER_COLUMNS
        ))?;
        let orders = stmt
            .query_map([date], row_to_order)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    fn sample_order(customer_id: i64, status: OrderStatus, due: &str) -> Order {
        Order {
            id: None,
            customer_id,
            status,
            due_date: due.to_string(),
            advance_payment: None,
            delivery_notes: None,
            cutter_id: None,
            checker_id: None,
            karigar_id: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_list_orders_filters_by_status() {
        let db = test_db();
        let cid = db.create_customer("A", "0313-1111111", None).unwrap();
        db.create_order(&sample_order(cid, OrderStatus::New, "2026-09-01")).unwrap();
        db.create_order(&sample_order(cid, OrderStatus::Ready, "2026-09-02")).unwrap();
        db.create_order(&sample_order(cid, OrderStatus::Ready, "2026-09-03")).unwrap();

        let all = db.list_orders(None).unwrap();
        assert_eq!(all.len(), 3);

        let ready = db.list_orders(Some(OrderStatus::Ready)).unwrap();
        assert_eq!(ready.len(), 2);
        assert!(ready.iter().all(|o| o.status == OrderStatus::Ready));

        let delivered = db.list_orders(Some(OrderStatus::Delivered)).unwrap();
        assert!(delivered.is_empty());
    }

    #[test]
    fn test_free_policy_allows_any_jump() {
        let db = test_db();
        let cid = db.create_customer("A", "0313-1111111", None).unwrap();
        let oid = db.create_order(&sample_order(cid, OrderStatus::Completed, "2026-09-01")).unwrap();

        db.update_order_status(oid, OrderStatus::New, StatusPolicy::Free).unwrap();
        assert_eq!(db.get_order(oid).unwrap().unwrap().status, OrderStatus::New);
    }

    #[test]
    fn test_forward_policy_rejects_regression() {
        let db = test_db();
        let cid = db.create_customer("A", "0313-1111111", None).unwrap();
        let oid = db.create_order(&sample_order(cid, OrderStatus::Ready, "2026-09-01")).unwrap();

        db.update_order_status(oid, OrderStatus::Delivered, StatusPolicy::Forward).unwrap();
        let err = db
            .update_order_status(oid, OrderStatus::InProgress, StatusPolicy::Forward)
            .unwrap_err();
        assert!(err.downcast_ref::<StatusPolicyError>().is_some());
        // Status unchanged after the rejected transition
        assert_eq!(db.get_order(oid).unwrap().unwrap().status, OrderStatus::Delivered);
    }

    #[test]
    fn test_orders_due_on_skips_closed() {
        let db = test_db();
        let cid = db.create_customer("A", "0313-1111111", None).unwrap();
        db.create_order(&sample_order(cid, OrderStatus::New, "2026-09-01")).unwrap();
        db.create_order(&sample_order(cid, OrderStatus::Delivered, "2026-09-01")).unwrap();
        db.create_order(&sample_order(cid, OrderStatus::New, "2026-09-02")).unwrap();

        let due = db.orders_due_on("2026-09-01").unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].status, OrderStatus::New);
    }
}
