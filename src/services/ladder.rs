use anyhow::Result;
use chrono::Utc;
use log::info;
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;

use crate::database::{self, DbPool, NewMatch, matches, offices, tournaments};
use crate::domain::{
    MatchId, MatchRecord, MatchResult, MatchState, OfficeId, Tournament, UserId,
};
use crate::errors::LadderError;
use crate::processing::OfficeProcessor;
use crate::tournament::plan_bracket;

/// Write path: logs matches, collects approvals and schedules tournaments
///
/// Every write that can change an office's approved matches invalidates that office's
/// snapshot after the transaction commits.
pub struct LadderService {
    pool: DbPool,
    processor: Arc<OfficeProcessor>,
}

impl LadderService {
    pub fn new(pool: DbPool, processor: Arc<OfficeProcessor>) -> Self {
        Self { pool, processor }
    }

    /// Log a pending match; the creator's approval is recorded straight away
    pub fn record_match(
        &self,
        creator_id: UserId,
        office_id: OfficeId,
        winners: &[UserId],
        losers: &[UserId],
        is_handicap: bool,
    ) -> Result<(MatchId, MatchState)> {
        if winners.is_empty() || losers.is_empty() {
            return Err(LadderError::MissingSide.into());
        }

        let (match_id, state) = {
            let mut conn = database::get_connection(&self.pool)?;
            let tx = conn.transaction()?;

            offices::find_by_id(&tx, office_id)?
                .ok_or_else(|| LadderError::not_found("office", office_id))?;
            let eligible = eligible_players(&tx, office_id)?;

            let mut seen = HashSet::new();
            for &user_id in winners.iter().chain(losers) {
                if !seen.insert(user_id) {
                    return Err(LadderError::DuplicateParticipant(user_id).into());
                }
                if !eligible.contains(&user_id) {
                    return Err(LadderError::InvalidParticipant(user_id).into());
                }
            }

            let participants = winners
                .iter()
                .map(|&id| (id, MatchResult::Win))
                .chain(losers.iter().map(|&id| (id, MatchResult::Loss)))
                .collect();
            let match_id = matches::insert_match(
                &tx,
                &NewMatch {
                    office_id,
                    creator_id,
                    state: MatchState::Pending,
                    is_handicap,
                    tournament_id: None,
                    next_match_id: None,
                    participants,
                    created_at: Utc::now(),
                },
            )?;
            let (_, state) = apply_approval(&tx, creator_id, match_id)?;
            tx.commit()?;
            (match_id, state)
        };

        info!("Logged match {} in office {}", match_id, office_id);
        self.after_approval(office_id, match_id, state);
        Ok((match_id, state))
    }

    /// Record `user_id`'s approval and approve the match once the rule is met
    pub fn approve_match(&self, user_id: UserId, match_id: MatchId) -> Result<MatchState> {
        let (office_id, state) = {
            let mut conn = database::get_connection(&self.pool)?;
            let tx = conn.transaction()?;
            let outcome = apply_approval(&tx, user_id, match_id)?;
            tx.commit()?;
            outcome
        };

        self.after_approval(office_id, match_id, state);
        Ok(state)
    }

    fn after_approval(&self, office_id: OfficeId, match_id: MatchId, state: MatchState) {
        if state == MatchState::Approved {
            self.processor.invalidate(office_id);
            info!("Match {} approved, office {} will be reprocessed", match_id, office_id);
        }
    }

    /// Create a single-elimination tournament with a randomly seeded first round
    pub fn create_tournament<R>(
        &self,
        creator_id: UserId,
        office_id: OfficeId,
        name: &str,
        participants: &[UserId],
        rng: &mut R,
    ) -> Result<Tournament>
    where
        R: Rng + ?Sized,
    {
        let name = name.trim();
        if name.is_empty() {
            return Err(LadderError::EmptyTournamentName.into());
        }

        let tournament = {
            let mut conn = database::get_connection(&self.pool)?;
            let tx = conn.transaction()?;

            let office = offices::find_by_id(&tx, office_id)?
                .ok_or_else(|| LadderError::not_found("office", office_id))?;
            if office.admin_id != creator_id {
                return Err(LadderError::NotOfficeAdmin(creator_id).into());
            }

            let eligible = eligible_players(&tx, office_id)?;
            if let Some(&outsider) = participants.iter().find(|&&id| !eligible.contains(&id)) {
                return Err(LadderError::InvalidParticipant(outsider).into());
            }
            let rounds = plan_bracket(participants, rng)?;

            let tournament = tournaments::insert_tournament(&tx, office_id, name, participants)?;
            let created_at = Utc::now();
            let mut previous_round: Vec<MatchId> = Vec::new();
            for round in &rounds {
                let mut this_round = Vec::with_capacity(round.slots.len());
                for slot in &round.slots {
                    let seated = slot
                        .seats
                        .map(|(first, second)| vec![(first, MatchResult::Win), (second, MatchResult::Loss)])
                        .unwrap_or_default();
                    let match_id = matches::insert_match(
                        &tx,
                        &NewMatch {
                            office_id,
                            creator_id,
                            state: MatchState::Scheduled,
                            is_handicap: false,
                            tournament_id: Some(tournament.id),
                            next_match_id: slot.next_slot.map(|i| previous_round[i]),
                            participants: seated,
                            created_at,
                        },
                    )?;
                    this_round.push(match_id);
                }
                previous_round = this_round;
            }
            tx.commit()?;
            tournament
        };

        self.processor.invalidate(office_id);
        info!(
            "Created tournament {} ({}) with {} players in office {}",
            tournament.id,
            tournament.name,
            tournament.player_count(),
            office_id
        );
        Ok(tournament)
    }
}

/// Store one approval and move the match to approved when the rule holds
fn apply_approval(
    conn: &rusqlite::Connection,
    user_id: UserId,
    match_id: MatchId,
) -> Result<(OfficeId, MatchState)> {
    let record = matches::find_by_id(conn, match_id)?
        .ok_or_else(|| LadderError::not_found("match", match_id))?;
    if record.state != MatchState::Pending {
        return Err(LadderError::MatchNotPending(match_id).into());
    }
    let office = offices::find_by_id(conn, record.office_id)?
        .ok_or_else(|| LadderError::not_found("office", record.office_id))?;

    if !matches::insert_approval(conn, match_id, user_id)? {
        return Err(LadderError::AlreadyApproved { match_id, user_id }.into());
    }
    let approvers = matches::list_approvers(conn, match_id)?;

    if approval_satisfied(&record, &approvers, office.admin_id) {
        matches::set_state(conn, match_id, MatchState::Approved)?;
        return Ok((record.office_id, MatchState::Approved));
    }
    Ok((record.office_id, MatchState::Pending))
}

/// Office members that may take part in matches
fn eligible_players(conn: &rusqlite::Connection, office_id: OfficeId) -> Result<HashSet<UserId>> {
    Ok(offices::list_players(conn, office_id)?
        .into_iter()
        .filter(|user| !user.non_player)
        .map(|user| user.id)
        .collect())
}

/// A winner and a loser have approved, or the office admin has
pub fn approval_satisfied(record: &MatchRecord, approvers: &[UserId], admin_id: UserId) -> bool {
    let approved = |user_id: UserId| approvers.contains(&user_id);

    approved(admin_id)
        || (record.winners().any(|p| approved(p.user_id)) && record.losers().any(|p| approved(p.user_id)))
}
