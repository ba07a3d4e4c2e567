pub mod find;
pub mod migrate;
pub mod pending;
pub mod show;
pub mod stats;

use std::path::Path;

use anyhow::{bail, Context};
use rusqlite::Connection;

use parcel_session::db::migrations::SCHEMA_VERSION;
use parcel_session::db::orders::Order;
use parcel_session::validate::format_date;

/// Open an existing, fully migrated database for the read-only commands.
fn open(db: &Path) -> anyhow::Result<Connection> {
    let conn = parcel_session::db::open_read_only(db)
        .with_context(|| format!("Failed to open order database at {}", db.display()))?;
    let version: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .with_context(|| format!("{} is not an order database", db.display()))?;
    if version < SCHEMA_VERSION {
        bail!(
            "Database {} is at schema version {}, expected {}; run `parcel-session migrate` first",
            db.display(),
            version,
            SCHEMA_VERSION
        );
    }
    Ok(conn)
}

fn print_table(orders: &[Order]) {
    println!(
        "{:<6} {:<24} {:<16} {:<12} {:<10}",
        "ID", "NAME", "PHONE", "DATE", "STATUS"
    );
    println!("{}", "-".repeat(72));
    for order in orders {
        println!(
            "{:<6} {:<24} {:<16} {:<12} {:<10}",
            order.id,
            truncate(&order.name, 22),
            order.phone,
            format_date(order.date),
            order.status
        );
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max - 3).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
