use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::db::sessions;
use crate::state::schema::{ChatId, NewOrder, OrderId, OrderStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub name: String,
    pub phone: String,
    pub from_address: String,
    pub to_address: String,
    pub date: NaiveDate,
    pub weight: f64,
    pub status: OrderStatus,
    pub submitter: ChatId,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

pub(crate) const ORDER_COLUMNS: &str =
    "id, name, phone, from_address, to_address, date, weight, status, submitter, created_at, resolved_at";

/// Insert a new pending order and return it with its assigned id.
pub fn insert(conn: &Connection, order: &NewOrder) -> rusqlite::Result<Order> {
    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO orders (name, phone, from_address, to_address, date, weight, status, submitter, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            order.name,
            order.phone,
            order.from_address,
            order.to_address,
            order.date,
            order.weight,
            OrderStatus::Pending,
            order.submitter.0,
            created_at,
        ],
    )?;

    Ok(Order {
        id: OrderId(conn.last_insert_rowid()),
        name: order.name.clone(),
        phone: order.phone.clone(),
        from_address: order.from_address.clone(),
        to_address: order.to_address.clone(),
        date: order.date,
        weight: order.weight,
        status: OrderStatus::Pending,
        submitter: order.submitter,
        created_at,
        resolved_at: None,
    })
}

/// Persist a completed intake: insert the order and drop the submitter's
/// session in one transaction.
pub fn commit_intake(conn: &mut Connection, order: &NewOrder) -> rusqlite::Result<Order> {
    let tx = conn.transaction()?;
    let saved = insert(&tx, order)?;
    sessions::delete(&tx, order.submitter)?;
    tx.commit()?;
    Ok(saved)
}

/// Find an order by id.
pub fn find_by_id(conn: &Connection, id: OrderId) -> rusqlite::Result<Option<Order>> {
    conn.query_row(
        &format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"),
        params![id.0],
        row_to_order,
    )
    .optional()
}

/// Move an order out of `from` into `to`, stamping `resolved_at`.
///
/// The update only applies while the order is still in `from`; the return
/// value is the number of rows changed (0 or 1).
pub fn update_status(
    conn: &Connection,
    id: OrderId,
    from: OrderStatus,
    to: OrderStatus,
) -> rusqlite::Result<usize> {
    let resolved_at = to.is_terminal().then(Utc::now);
    conn.execute(
        "UPDATE orders SET status = ?1, resolved_at = ?2 WHERE id = ?3 AND status = ?4",
        params![to, resolved_at, id.0, from],
    )
}

pub(crate) fn row_to_order(row: &rusqlite::Row) -> rusqlite::Result<Order> {
    Ok(Order {
        id: OrderId(row.get(0)?),
        name: row.get(1)?,
        phone: row.get(2)?,
        from_address: row.get(3)?,
        to_address: row.get(4)?,
        date: row.get(5)?,
        weight: row.get(6)?,
        status: row.get(7)?,
        submitter: ChatId(row.get(8)?),
        created_at: row.get(9)?,
        resolved_at: row.get(10)?,
    })
}

#[cfg(test)]
pub(crate) fn sample(name: &str, phone: &str, submitter: i64) -> NewOrder {
    NewOrder {
        name: name.to_string(),
        phone: phone.to_string(),
        from_address: "Kyiv".to_string(),
        to_address: "Lviv".to_string(),
        date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
        weight: 3.5,
        submitter: ChatId(submitter),
    }
}
