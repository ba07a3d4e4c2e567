use rusqlite::Connection;

/// Schema version written by the last migration.
pub const SCHEMA_VERSION: u32 = 2;

/// Run all pending migrations on the database.
///
/// Uses `PRAGMA user_version` to track which migrations have been applied.
pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    let version: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version < 1 {
        migrate_v0_to_v1(conn)?;
    }

    if version < 2 {
        migrate_v1_to_v2(conn)?;
    }

    Ok(())
}

fn migrate_v1_to_v2(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE intake_sessions (
            submitter           INTEGER PRIMARY KEY,
            step                TEXT NOT NULL,
            draft               TEXT NOT NULL,
            started_at          TEXT NOT NULL,
            updated_at          TEXT NOT NULL
        );

        PRAGMA user_version = 2;
        ",
    )?;
    Ok(())
}

fn migrate_v0_to_v1(conn: &Connection) -> rusqlite::Result<()> {
    // AUTOINCREMENT keeps ids strictly increasing even if rows are removed by hand.
    conn.execute_batch(
        "
        CREATE TABLE orders (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            name                TEXT NOT NULL CHECK (length(name) > 0),
            phone               TEXT NOT NULL CHECK (length(phone) > 0),
            from_address        TEXT NOT NULL CHECK (length(from_address) > 0),
            to_address          TEXT NOT NULL CHECK (length(to_address) > 0),
            date                TEXT NOT NULL,
            weight              REAL NOT NULL CHECK (weight > 0),
            status              TEXT NOT NULL DEFAULT 'pending'
                                CHECK (status IN ('pending', 'done', 'cancelled')),
            submitter           INTEGER NOT NULL,
            created_at          TEXT NOT NULL,
            resolved_at         TEXT
        );

        CREATE INDEX idx_orders_status ON orders(status);

        PRAGMA user_version = 1;
        ",
    )?;
    Ok(())
}
