use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use super::models::{Office, User};
use super::users::parse_user_row;
use crate::domain::{OfficeId, UserId};

/// Create an office; the admin is enrolled as one of its players
pub fn insert_office(conn: &Connection, name: &str, admin_id: UserId) -> Result<Office> {
    let sql = "INSERT INTO offices (name, admin_id, created_at) VALUES (?1, ?2, ?3) RETURNING id, name, admin_id, created_at";

    let office = conn
        .query_row(sql, params![name, admin_id, Utc::now()], parse_office_row)
        .with_context(|| format!("Failed to insert office {}", name))?;
    add_player(conn, office.id, admin_id)?;
    Ok(office)
}

pub fn add_player(conn: &Connection, office_id: OfficeId, user_id: UserId) -> Result<()> {
    let sql = "INSERT OR IGNORE INTO office_players (office_id, user_id) VALUES (?1, ?2)";

    conn.execute(sql, params![office_id, user_id])
        .with_context(|| format!("Failed to add user {} to office {}", user_id, office_id))?;
    Ok(())
}

fn parse_office_row(row: &rusqlite::Row) -> rusqlite::Result<Office> {
    Ok(Office {
        id: row.get(0)?,
        name: row.get(1)?,
        admin_id: row.get(2)?,
        created_at: row.get(3)?,
    })
}

pub fn find_by_id(conn: &Connection, id: OfficeId) -> Result<Option<Office>> {
    let sql = "SELECT id, name, admin_id, created_at FROM offices WHERE id = ?1";

    conn.query_row(sql, params![id], parse_office_row)
        .optional()
        .context("Failed to query office by id")
}

/// Members of the office, ascending by user id
pub fn list_players(conn: &Connection, office_id: OfficeId) -> Result<Vec<User>> {
    let sql = "SELECT u.id, u.username, u.non_player, u.created_at FROM users u JOIN office_players op ON op.user_id = u.id WHERE op.office_id = ?1 ORDER BY u.id";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![office_id], parse_user_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to list office players")?;

    Ok(rows)
}
