//! Order resolution.
//!
//! A transition is two separate steps: the store write, which decides the
//! result, and the submitter notice, which is best effort and never turns a
//! successful write into a failure.

use rusqlite::Connection;
use tracing::info;

use crate::db::{orders, Store};
use crate::db::orders::Order;
use crate::error::{OrderError, Result};
use crate::notify::{self, Notifier, Reply};
use crate::state::schema::{OrderId, OrderStatus};
use crate::state::transitions::validate_transition;

/// Result of a successful transition.
#[derive(Debug, Clone)]
pub struct TransitionReport {
    /// The order as stored after the transition.
    pub order: Order,
    /// Whether the submitter notice was delivered.
    pub submitter_notified: bool,
}

/// Move an order to `target` in the store.
///
/// Missing orders yield [`OrderError::OrderNotFound`]. Orders that are already
/// done or cancelled are left untouched and yield [`OrderError::AlreadyResolved`].
pub fn apply_transition(conn: &mut Connection, id: OrderId, target: OrderStatus) -> Result<Order> {
    let tx = conn.transaction()?;

    let current = orders::find_by_id(&tx, id)?.ok_or(OrderError::OrderNotFound(id))?;
    if current.status.is_terminal() {
        return Err(OrderError::AlreadyResolved {
            id,
            status: current.status,
        });
    }
    validate_transition(current.status, target)?;

    orders::update_status(&tx, id, current.status, target)?;
    let updated = orders::find_by_id(&tx, id)?.ok_or(OrderError::OrderNotFound(id))?;
    tx.commit()?;

    info!(order_id = %id, status = %target, "order resolved");
    Ok(updated)
}

/// Transition an order and tell its submitter.
pub async fn transition(
    store: &Store,
    notifier: &dyn Notifier,
    id: OrderId,
    target: OrderStatus,
) -> Result<TransitionReport> {
    let order = {
        let mut conn = store.conn().await;
        apply_transition(&mut conn, id, target)?
    };

    let submitter_notified = notify::deliver(notifier, order.submitter, &status_notice(&order)).await;
    Ok(TransitionReport {
        order,
        submitter_notified,
    })
}

/// Message sent to the submitter when their order changes status.
pub fn status_notice(order: &Order) -> Reply {
    let text = match order.status {
        OrderStatus::Done => format!("ℹ️ Your order #{} has been delivered.", order.id),
        OrderStatus::Cancelled => format!("ℹ️ Your order #{} has been cancelled.", order.id),
        OrderStatus::Pending => format!("ℹ️ Your order #{} is pending.", order.id),
    };
    Reply::text(text)
}
