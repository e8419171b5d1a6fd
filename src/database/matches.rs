use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{Connection, params};
use std::collections::HashMap;

use super::models::NewMatch;
use crate::domain::{
    MatchId, MatchRecord, MatchResult, MatchState, OfficeId, Participant, TournamentId, UserId,
};

/// Which matches a load covers
#[derive(Debug, Clone, Copy)]
pub enum MatchFilter {
    ApprovedInOffice(OfficeId),
    Tournament(TournamentId),
    Id(MatchId),
}

impl MatchFilter {
    fn clause(&self) -> &'static str {
        match self {
            MatchFilter::ApprovedInOffice(_) => "m.office_id = ?1 AND m.state = 'approved'",
            MatchFilter::Tournament(_) => "m.tournament_id = ?1",
            MatchFilter::Id(_) => "m.id = ?1",
        }
    }

    fn param(&self) -> i64 {
        match *self {
            MatchFilter::ApprovedInOffice(id) | MatchFilter::Tournament(id) | MatchFilter::Id(id) => id,
        }
    }
}

pub fn insert_match(conn: &Connection, new_match: &NewMatch) -> Result<MatchId> {
    let sql = "INSERT INTO matches (office_id, creator_id, state, is_handicap, tournament_id, next_match_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING id";

    let match_id: MatchId = conn
        .query_row(
            sql,
            params![
                new_match.office_id,
                new_match.creator_id,
                new_match.state.as_str(),
                new_match.is_handicap,
                new_match.tournament_id,
                new_match.next_match_id,
                new_match.created_at,
            ],
            |row| row.get(0),
        )
        .context("Failed to insert match")?;

    for (user_id, result) in &new_match.participants {
        conn.execute(
            "INSERT INTO match_participants (match_id, user_id, result) VALUES (?1, ?2, ?3)",
            params![match_id, user_id, result.as_str()],
        )
        .with_context(|| format!("Failed to add user {} to match {}", user_id, match_id))?;
    }

    Ok(match_id)
}

/// Matches with their participants, oldest first
pub fn load_matches(conn: &Connection, filter: MatchFilter) -> Result<Vec<MatchRecord>> {
    let mut participants = load_participants(conn, filter)?;

    let sql = format!(
        "SELECT m.id, m.office_id, m.created_at, m.is_handicap, m.state, m.tournament_id, m.next_match_id FROM matches m WHERE {} ORDER BY m.created_at, m.id",
        filter.clause()
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut records = stmt
        .query_map(params![filter.param()], parse_match_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .with_context(|| format!("Failed to load matches for {:?}", filter))?;

    for record in &mut records {
        record.participants = participants.remove(&record.id).unwrap_or_default();
    }
    Ok(records)
}

pub fn find_by_id(conn: &Connection, match_id: MatchId) -> Result<Option<MatchRecord>> {
    Ok(load_matches(conn, MatchFilter::Id(match_id))?.into_iter().next())
}

fn load_participants(
    conn: &Connection,
    filter: MatchFilter,
) -> Result<HashMap<MatchId, Vec<Participant>>> {
    let sql = format!(
        "SELECT mp.match_id, mp.user_id, u.username, u.non_player, mp.result FROM match_participants mp JOIN users u ON u.id = mp.user_id JOIN matches m ON m.id = mp.match_id WHERE {} ORDER BY mp.match_id, mp.user_id",
        filter.clause()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![filter.param()], |row| {
            let match_id: MatchId = row.get(0)?;
            Ok((match_id, parse_participant_row(row)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()
        .with_context(|| format!("Failed to load match participants for {:?}", filter))?;

    let mut grouped: HashMap<MatchId, Vec<Participant>> = HashMap::new();
    for (match_id, participant) in rows {
        grouped.entry(match_id).or_default().push(participant);
    }
    Ok(grouped)
}

fn parse_match_row(row: &rusqlite::Row) -> rusqlite::Result<MatchRecord> {
    let state: String = row.get(4)?;
    Ok(MatchRecord {
        id: row.get(0)?,
        office_id: row.get(1)?,
        created_at: row.get(2)?,
        is_handicap: row.get(3)?,
        state: MatchState::parse(&state).ok_or_else(|| unexpected_text(4, &state))?,
        participants: Vec::new(),
        tournament_id: row.get(5)?,
        next_match_id: row.get(6)?,
    })
}

fn parse_participant_row(row: &rusqlite::Row) -> rusqlite::Result<Participant> {
    let result: String = row.get(4)?;
    Ok(Participant {
        user_id: row.get(1)?,
        username: row.get(2)?,
        non_player: row.get(3)?,
        result: MatchResult::parse(&result).ok_or_else(|| unexpected_text(4, &result))?,
    })
}

fn unexpected_text(idx: usize, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Text,
        format!("unexpected value: {}", value).into(),
    )
}

pub fn set_state(conn: &Connection, match_id: MatchId, state: MatchState) -> Result<()> {
    conn.execute(
        "UPDATE matches SET state = ?1 WHERE id = ?2",
        params![state.as_str(), match_id],
    )
    .with_context(|| format!("Failed to update state of match {}", match_id))?;
    Ok(())
}

/// Record an approval; false when the user had already approved
pub fn insert_approval(conn: &Connection, match_id: MatchId, user_id: UserId) -> Result<bool> {
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO match_approvals (match_id, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![match_id, user_id, Utc::now()],
        )
        .with_context(|| format!("Failed to record approval of match {}", match_id))?;
    Ok(inserted == 1)
}

pub fn list_approvers(conn: &Connection, match_id: MatchId) -> Result<Vec<UserId>> {
    let mut stmt =
        conn.prepare("SELECT user_id FROM match_approvals WHERE match_id = ?1 ORDER BY user_id")?;
    let rows = stmt
        .query_map(params![match_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<UserId>>>()
        .context("Failed to list match approvals")?;

    Ok(rows)
}
