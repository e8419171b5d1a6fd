use anyhow::{Result, anyhow};
use std::collections::BTreeSet;
use std::sync::RwLock;

use super::models::{MatchId, MatchRecord, MatchState, OfficeId, Tournament, TournamentId};

/// Read side of persistence consumed by the processor and bracket views
pub trait MatchStore: Send + Sync {
    fn office_exists(&self, office_id: OfficeId) -> Result<bool>;

    /// Approved matches of one office, oldest first
    fn load_approved_matches(&self, office_id: OfficeId) -> Result<Vec<MatchRecord>>;

    fn load_tournament(&self, tournament_id: TournamentId) -> Result<Option<Tournament>>;

    /// Every match of one tournament regardless of state
    fn load_tournament_matches(&self, tournament_id: TournamentId) -> Result<Vec<MatchRecord>>;

    fn load_office_tournaments(&self, office_id: OfficeId) -> Result<Vec<Tournament>>;
}

/// Store kept entirely in memory, used for embedding and tests
#[derive(Default)]
pub struct MemoryStore {
    offices: RwLock<BTreeSet<OfficeId>>,
    matches: RwLock<Vec<MatchRecord>>,
    tournaments: RwLock<Vec<Tournament>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_matches(matches: Vec<MatchRecord>) -> Self {
        Self {
            offices: RwLock::new(matches.iter().map(|m| m.office_id).collect()),
            matches: RwLock::new(matches),
            tournaments: RwLock::new(Vec::new()),
        }
    }

    pub fn push_office(&self, office_id: OfficeId) -> Result<()> {
        self.offices
            .write()
            .map_err(|_| anyhow!("office store lock poisoned"))?
            .insert(office_id);
        Ok(())
    }

    /// Append a match; its office becomes known to the store
    pub fn push_match(&self, record: MatchRecord) -> Result<()> {
        self.push_office(record.office_id)?;
        self.matches
            .write()
            .map_err(|_| anyhow!("match store lock poisoned"))?
            .push(record);
        Ok(())
    }

    pub fn push_tournament(&self, tournament: Tournament) -> Result<()> {
        self.push_office(tournament.office_id)?;
        self.tournaments
            .write()
            .map_err(|_| anyhow!("tournament store lock poisoned"))?
            .push(tournament);
        Ok(())
    }

    pub fn set_state(&self, match_id: MatchId, state: MatchState) -> Result<()> {
        let mut matches = self
            .matches
            .write()
            .map_err(|_| anyhow!("match store lock poisoned"))?;
        let record = matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or_else(|| anyhow!("match {} not in store", match_id))?;
        record.state = state;
        Ok(())
    }

    fn read_matches(&self) -> Result<Vec<MatchRecord>> {
        self.matches
            .read()
            .map(|m| m.clone())
            .map_err(|_| anyhow!("match store lock poisoned"))
    }

    fn read_tournaments(&self) -> Result<Vec<Tournament>> {
        self.tournaments
            .read()
            .map(|t| t.clone())
            .map_err(|_| anyhow!("tournament store lock poisoned"))
    }
}

impl MatchStore for MemoryStore {
    fn office_exists(&self, office_id: OfficeId) -> Result<bool> {
        self.offices
            .read()
            .map(|offices| offices.contains(&office_id))
            .map_err(|_| anyhow!("office store lock poisoned"))
    }

    fn load_approved_matches(&self, office_id: OfficeId) -> Result<Vec<MatchRecord>> {
        let mut matches: Vec<MatchRecord> = self
            .read_matches()?
            .into_iter()
            .filter(|m| m.office_id == office_id && m.is_approved())
            .collect();
        matches.sort_by_key(|m| (m.created_at, m.id));
        Ok(matches)
    }

    fn load_tournament(&self, tournament_id: TournamentId) -> Result<Option<Tournament>> {
        Ok(self
            .read_tournaments()?
            .into_iter()
            .find(|t| t.id == tournament_id))
    }

    fn load_tournament_matches(&self, tournament_id: TournamentId) -> Result<Vec<MatchRecord>> {
        Ok(self
            .read_matches()?
            .into_iter()
            .filter(|m| m.tournament_id == Some(tournament_id))
            .collect())
    }

    fn load_office_tournaments(&self, office_id: OfficeId) -> Result<Vec<Tournament>> {
        Ok(self
            .read_tournaments()?
            .into_iter()
            .filter(|t| t.office_id == office_id)
            .collect())
    }
}
