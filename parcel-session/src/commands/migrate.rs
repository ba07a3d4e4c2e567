use std::path::Path;

use anyhow::Context;

pub fn run(db: &Path) -> anyhow::Result<u8> {
    let conn = parcel_session::db::open_or_create(db)
        .with_context(|| format!("Failed to open order database at {}", db.display()))?;
    let version: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    println!("Database {} at schema version {}", db.display(), version);
    Ok(0)
}
