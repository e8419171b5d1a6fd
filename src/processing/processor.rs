use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use std::sync::Arc;

use super::replay::replay;
use super::snapshot::OfficeSnapshot;
use crate::cache::SnapshotCache;
use crate::config::settings::RatingSettings;
use crate::domain::{MatchStore, OfficeId, TournamentId};
use crate::errors::{LadderError, query_context, replay_context};
use crate::tournament::{TournamentSummary, TournamentView};

/// Serves office snapshots, replaying approved matches only when the cache misses
pub struct OfficeProcessor {
    store: Arc<dyn MatchStore>,
    cache: Arc<SnapshotCache>,
    settings: RatingSettings,
}

impl OfficeProcessor {
    pub fn new(store: Arc<dyn MatchStore>, cache: Arc<SnapshotCache>, settings: RatingSettings) -> Self {
        Self {
            store,
            cache,
            settings,
        }
    }

    /// Snapshot of the office, shared with every other caller until invalidated
    pub fn process(&self, office_id: OfficeId) -> Result<Arc<OfficeSnapshot>> {
        self.process_at(office_id, Utc::now())
    }

    /// Like `process`, with the activity window anchored at `now` on a miss
    pub fn process_at(&self, office_id: OfficeId, now: DateTime<Utc>) -> Result<Arc<OfficeSnapshot>> {
        self.cache
            .get_or_try_insert_with(office_id, || self.replay_office(office_id, now))
    }

    /// Forget the office snapshot after a write that changes its approved matches
    pub fn invalidate(&self, office_id: OfficeId) {
        self.cache.invalidate(office_id);
    }

    fn replay_office(&self, office_id: OfficeId, now: DateTime<Utc>) -> Result<OfficeSnapshot> {
        let exists = self
            .store
            .office_exists(office_id)
            .with_context(|| query_context("office", office_id))?;
        if !exists {
            return Err(LadderError::not_found("office", office_id).into());
        }

        let matches = self
            .store
            .load_approved_matches(office_id)
            .with_context(|| query_context("approved matches", office_id))?;

        let snapshot = replay(office_id, &matches, now, &self.settings)
            .with_context(|| replay_context(office_id))?;

        info!(
            "Processed office {}: {} matches, {} ranked players",
            office_id,
            snapshot.matches_played(),
            snapshot.ranked_players().len()
        );
        Ok(snapshot)
    }

    /// Bracket and progress of one tournament, read straight from the store
    pub fn tournament(&self, tournament_id: TournamentId) -> Result<TournamentView> {
        let tournament = self
            .store
            .load_tournament(tournament_id)
            .with_context(|| query_context("tournament", tournament_id))?
            .ok_or_else(|| LadderError::not_found("tournament", tournament_id))?;

        let matches = self
            .store
            .load_tournament_matches(tournament_id)
            .with_context(|| query_context("tournament matches", tournament_id))?;

        Ok(TournamentView::build(&tournament, &matches)?)
    }

    pub fn office_tournaments(&self, office_id: OfficeId) -> Result<Vec<TournamentSummary>> {
        let tournaments = self
            .store
            .load_office_tournaments(office_id)
            .with_context(|| query_context("tournaments", office_id))?;

        tournaments
            .iter()
            .map(|tournament| -> Result<TournamentSummary> {
                let matches = self
                    .store
                    .load_tournament_matches(tournament.id)
                    .with_context(|| query_context("tournament matches", tournament.id))?;
                Ok(TournamentSummary::from_matches(tournament, &matches))
            })
            .collect()
    }
}
