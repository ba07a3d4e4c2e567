use std::path::Path;

use parcel_session::db::queries;

pub fn run(db: &Path, json: bool) -> anyhow::Result<u8> {
    let conn = super::open(db)?;
    let counts = queries::counts(&conn)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
        return Ok(0);
    }

    println!("Total:     {}", counts.total);
    println!("Pending:   {}", counts.pending);
    println!("Done:      {}", counts.done);
    println!("Cancelled: {}", counts.cancelled);
    Ok(0)
}
