use std::path::Path;

use parcel_session::db::orders;
use parcel_session::state::schema::OrderId;
use parcel_session::validate::{format_date, format_weight};

pub fn run(db: &Path, id: i64, json: bool) -> anyhow::Result<u8> {
    let conn = super::open(db)?;
    let Some(order) = orders::find_by_id(&conn, OrderId(id))? else {
        eprintln!("Order #{} not found", id);
        return Ok(1);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&order)?);
        return Ok(0);
    }

    println!("Order #{}", order.id);
    println!("  Name:      {}", order.name);
    println!("  Phone:     {}", order.phone);
    println!("  From:      {}", order.from_address);
    println!("  To:        {}", order.to_address);
    println!("  Date:      {}", format_date(order.date));
    println!("  Weight:    {} kg", format_weight(order.weight));
    println!("  Status:    {}", order.status);
    println!("  Submitter: {}", order.submitter);
    println!("  Created:   {}", order.created_at.to_rfc3339());
    if let Some(resolved_at) = order.resolved_at {
        println!("  Resolved:  {}", resolved_at.to_rfc3339());
    }
    Ok(0)
}
