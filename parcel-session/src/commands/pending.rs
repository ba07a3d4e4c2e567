use std::path::Path;

use parcel_session::db::queries;

pub fn run(db: &Path) -> anyhow::Result<u8> {
    let conn = super::open(db)?;
    let pending = queries::list_pending(&conn)?;

    if pending.is_empty() {
        println!("No pending orders.");
        return Ok(0);
    }

    super::print_table(&pending);
    Ok(0)
}
