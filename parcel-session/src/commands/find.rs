use std::path::Path;

use parcel_session::db::queries;

pub fn run(db: &Path, keyword: &str) -> anyhow::Result<u8> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        anyhow::bail!("Keyword cannot be empty");
    }

    let conn = super::open(db)?;
    let found = queries::search(&conn, keyword)?;

    if found.is_empty() {
        println!("No orders match '{}'.", keyword);
        return Ok(1);
    }

    super::print_table(&found);
    Ok(0)
}
