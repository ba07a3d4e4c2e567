use rusqlite::{params, Connection};
use serde::Serialize;

use super::orders::{row_to_order, Order, ORDER_COLUMNS};
use crate::state::schema::OrderStatus;

/// Order totals, overall and per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrderCounts {
    pub total: i64,
    pub pending: i64,
    pub done: i64,
    pub cancelled: i64,
}

/// Orders whose name or phone contains `keyword`, oldest first.
///
/// Matching is a case-sensitive substring test on the stored text.
pub fn search(conn: &Connection, keyword: &str) -> rusqlite::Result<Vec<Order>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders
         WHERE instr(name, ?1) > 0 OR instr(phone, ?1) > 0
         ORDER BY id"
    ))?;
    let rows = stmt.query_map(params![keyword], row_to_order)?;
    rows.collect()
}

/// List orders in a given status, oldest first.
pub fn list_by_status(conn: &Connection, status: OrderStatus) -> rusqlite::Result<Vec<Order>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE status = ?1 ORDER BY id"
    ))?;
    let rows = stmt.query_map(params![status], row_to_order)?;
    rows.collect()
}

/// Orders still waiting for an administrator.
pub fn list_pending(conn: &Connection) -> rusqlite::Result<Vec<Order>> {
    list_by_status(conn, OrderStatus::Pending)
}

/// Count orders per status in one pass.
pub fn counts(conn: &Connection) -> rusqlite::Result<OrderCounts> {
    let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM orders GROUP BY status")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, OrderStatus>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut counts = OrderCounts::default();
    for row in rows {
        let (status, n) = row?;
        match status {
            OrderStatus::Pending => counts.pending = n,
            OrderStatus::Done => counts.done = n,
            OrderStatus::Cancelled => counts.cancelled = n,
        }
        counts.total += n;
    }
    Ok(counts)
}
