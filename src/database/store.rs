use anyhow::Result;

use super::connection::{DbPool, get_connection};
use super::matches::{self, MatchFilter};
use super::{offices, tournaments};
use crate::domain::{MatchRecord, MatchStore, OfficeId, Tournament, TournamentId};

/// `MatchStore` over the pooled SQLite database
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl MatchStore for SqliteStore {
    fn office_exists(&self, office_id: OfficeId) -> Result<bool> {
        let conn = get_connection(&self.pool)?;
        Ok(offices::find_by_id(&conn, office_id)?.is_some())
    }

    fn load_approved_matches(&self, office_id: OfficeId) -> Result<Vec<MatchRecord>> {
        let conn = get_connection(&self.pool)?;
        matches::load_matches(&conn, MatchFilter::ApprovedInOffice(office_id))
    }

    fn load_tournament(&self, tournament_id: TournamentId) -> Result<Option<Tournament>> {
        let conn = get_connection(&self.pool)?;
        tournaments::find_by_id(&conn, tournament_id)
    }

    fn load_tournament_matches(&self, tournament_id: TournamentId) -> Result<Vec<MatchRecord>> {
        let conn = get_connection(&self.pool)?;
        matches::load_matches(&conn, MatchFilter::Tournament(tournament_id))
    }

    fn load_office_tournaments(&self, office_id: OfficeId) -> Result<Vec<Tournament>> {
        let conn = get_connection(&self.pool)?;
        tournaments::list_for_office(&conn, office_id)
    }
}
