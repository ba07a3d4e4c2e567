//! Plain-text renderings of orders and query results.

use std::fmt::Write;

use crate::db::orders::Order;
use crate::db::queries::OrderCounts;
use crate::state::schema::OrderStatus;
use crate::validate::{format_date, format_weight};

pub const CONFIRMATION: &str = "✅ Thank you! Your order has been accepted.";
pub const INTAKE_CANCELLED: &str = "❌ Order entry cancelled.";
pub const NO_SESSION_HINT: &str = "Send /start to place a delivery order.";
pub const ACCESS_DENIED: &str = "⛔ Access denied.";
pub const GENERIC_FAILURE: &str =
    "⚠️ Something went wrong while saving your order. Please try again with /start.";
pub const REQUEST_FAILED: &str = "⚠️ Something went wrong. Please try again later.";
pub const NOTHING_FOUND: &str = "🔍 Nothing found.";
pub const NO_PENDING: &str = "✅ No pending orders.";

pub const HELP: &str = "\
/start - place a delivery order
/cancel - abandon the order in progress

Administrators:
/find <name or phone> - search orders
/stats - order totals
/orders - pending orders
/done <id> - mark an order done
/cancel_order <id> - cancel an order";

fn write_details(out: &mut String, order: &Order) {
    let _ = writeln!(out, "👤 Name: {}", order.name);
    let _ = writeln!(out, "📞 Phone: {}", order.phone);
    let _ = writeln!(out, "🚚 {} → {}", order.from_address, order.to_address);
    let _ = writeln!(out, "🗓️ Date: {}", format_date(order.date));
    let _ = writeln!(out, "⚖️ Weight: {} kg", format_weight(order.weight));
}

/// Notice broadcast to administrators when an order is committed.
pub fn admin_notice(order: &Order) -> String {
    let mut out = format!("📦 New order #{}\n", order.id);
    write_details(&mut out, order);
    let _ = write!(out, "Status: {}", order.status);
    out
}

/// One line per match: id, name, phone, date and status.
pub fn search_results(orders: &[Order]) -> String {
    if orders.is_empty() {
        return NOTHING_FOUND.to_string();
    }
    let mut out = String::from("🔍 Results:\n");
    for order in orders {
        let _ = writeln!(
            out,
            "#{} | {} | {} | {} | Status: {}",
            order.id,
            order.name,
            order.phone,
            format_date(order.date),
            order.status
        );
    }
    out.trim_end().to_string()
}

pub fn counts(counts: &OrderCounts) -> String {
    format!(
        "📊 Total: {}\n✅ Done: {}\n❌ Cancelled: {}\n📦 Pending: {}",
        counts.total, counts.done, counts.cancelled, counts.pending
    )
}

/// Full detail of every pending order, separated by rules.
pub fn pending(orders: &[Order]) -> String {
    if orders.is_empty() {
        return NO_PENDING.to_string();
    }
    let mut out = String::from("📋 Pending orders:\n\n");
    for order in orders {
        let _ = writeln!(out, "🆔 ID: {}", order.id);
        write_details(&mut out, order);
        let _ = writeln!(out, "{}", "-".repeat(30));
    }
    out.trim_end().to_string()
}

/// Acknowledgement shown to the administrator who resolved an order.
pub fn resolution_ack(order: &Order) -> String {
    match order.status {
        OrderStatus::Cancelled => format!("❌ Order #{} cancelled.", order.id),
        _ => format!("✅ Order #{} marked done.", order.id),
    }
}
