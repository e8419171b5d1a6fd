use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use crate::domain::{OfficeId, Tournament, TournamentId, UserId};

pub fn insert_tournament(
    conn: &Connection,
    office_id: OfficeId,
    name: &str,
    participant_ids: &[UserId],
) -> Result<Tournament> {
    let sql = "INSERT INTO tournaments (office_id, name, created_at) VALUES (?1, ?2, ?3) RETURNING id, created_at";

    let (id, created_at): (TournamentId, DateTime<Utc>) = conn
        .query_row(sql, params![office_id, name, Utc::now()], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .with_context(|| format!("Failed to insert tournament {}", name))?;

    for user_id in participant_ids {
        conn.execute(
            "INSERT INTO tournament_participants (tournament_id, user_id) VALUES (?1, ?2)",
            params![id, user_id],
        )
        .with_context(|| format!("Failed to enter user {} in tournament {}", user_id, id))?;
    }

    Ok(Tournament {
        id,
        office_id,
        name: name.to_string(),
        created_at,
        participant_ids: participant_ids.to_vec(),
    })
}

fn parse_tournament_row(row: &rusqlite::Row) -> rusqlite::Result<Tournament> {
    Ok(Tournament {
        id: row.get(0)?,
        office_id: row.get(1)?,
        name: row.get(2)?,
        created_at: row.get(3)?,
        participant_ids: Vec::new(),
    })
}

fn load_participant_ids(conn: &Connection, tournament_id: TournamentId) -> Result<Vec<UserId>> {
    let mut stmt = conn.prepare(
        "SELECT user_id FROM tournament_participants WHERE tournament_id = ?1 ORDER BY user_id",
    )?;
    let ids = stmt
        .query_map(params![tournament_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<UserId>>>()
        .context("Failed to load tournament participants")?;

    Ok(ids)
}

pub fn find_by_id(conn: &Connection, id: TournamentId) -> Result<Option<Tournament>> {
    let sql = "SELECT id, office_id, name, created_at FROM tournaments WHERE id = ?1";

    let found = conn
        .query_row(sql, params![id], parse_tournament_row)
        .optional()
        .context("Failed to query tournament by id")?;

    match found {
        Some(mut tournament) => {
            tournament.participant_ids = load_participant_ids(conn, tournament.id)?;
            Ok(Some(tournament))
        }
        None => Ok(None),
    }
}

/// Tournaments of an office, newest first
pub fn list_for_office(conn: &Connection, office_id: OfficeId) -> Result<Vec<Tournament>> {
    let sql = "SELECT id, office_id, name, created_at FROM tournaments WHERE office_id = ?1 ORDER BY created_at DESC, id DESC";

    let mut stmt = conn.prepare(sql)?;
    let mut tournaments = stmt
        .query_map(params![office_id], parse_tournament_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to list office tournaments")?;

    for tournament in &mut tournaments {
        tournament.participant_ids = load_participant_ids(conn, tournament.id)?;
    }
    Ok(tournaments)
}
