//! Persisted intake sessions, one row per submitter.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::state::schema::{ChatId, IntakeSession};

/// Insert or replace the session row for its submitter.
pub fn save(conn: &Connection, session: &IntakeSession) -> Result<()> {
    let draft = serde_json::to_string(&session.draft)?;
    conn.execute(
        "INSERT INTO intake_sessions (submitter, step, draft, started_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(submitter)
         DO UPDATE SET step = excluded.step,
                       draft = excluded.draft,
                       started_at = excluded.started_at,
                       updated_at = excluded.updated_at",
        params![
            session.submitter.0,
            session.step.as_str(),
            draft,
            session.started_at,
            session.updated_at,
        ],
    )?;
    Ok(())
}

/// Load the live session of a submitter, if any.
pub fn find(conn: &Connection, submitter: ChatId) -> Result<Option<IntakeSession>> {
    let row = conn
        .query_row(
            "SELECT step, draft, started_at, updated_at FROM intake_sessions WHERE submitter = ?1",
            params![submitter.0],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, DateTime<Utc>>(2)?,
                    row.get::<_, DateTime<Utc>>(3)?,
                ))
            },
        )
        .optional()?;

    let Some((step, draft, started_at, updated_at)) = row else {
        return Ok(None);
    };

    Ok(Some(IntakeSession {
        submitter,
        step: step.parse()?,
        draft: serde_json::from_str(&draft)?,
        started_at,
        updated_at,
    }))
}

/// Remove a submitter's session. Returns whether one existed.
pub fn delete(conn: &Connection, submitter: ChatId) -> rusqlite::Result<bool> {
    let removed = conn.execute(
        "DELETE FROM intake_sessions WHERE submitter = ?1",
        params![submitter.0],
    )?;
    Ok(removed > 0)
}

/// Number of conversations currently in progress.
pub fn count(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM intake_sessions", [], |row| row.get(0))
}
