use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{MatchId, MatchRecord, MatchResult, MatchState, OfficeId, Player, TournamentId, UserId};
use crate::processing::{Pairing, ProcessedMatch};
use crate::tournament::{TournamentSummary, TournamentView};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: UserId,
    pub username: String,
    pub rating: i32,
    pub win_count: u32,
    pub loss_count: u32,
    pub win_percentage: f64,
}

impl LeaderboardEntry {
    pub fn new(rank: usize, player: &Player) -> Self {
        Self {
            rank,
            user_id: player.user_id,
            username: player.username.clone(),
            rating: player.rating,
            win_count: player.win_count,
            loss_count: player.loss_count,
            win_percentage: player.win_percentage(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    pub office_id: OfficeId,
    pub processed_at: DateTime<Utc>,
    pub items: Vec<LeaderboardEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub user_id: UserId,
    pub username: String,
    pub rating: i32,
    pub matches_played: u32,
}

impl From<&Player> for PlayerSummary {
    fn from(player: &Player) -> Self {
        Self {
            user_id: player.user_id,
            username: player.username.clone(),
            rating: player.rating,
            matches_played: player.matches_played(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordHolder {
    pub user_id: UserId,
    pub username: String,
    pub record_rating: i32,
    pub record_rating_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingSummary {
    pub first_user_id: UserId,
    pub first_username: String,
    pub second_user_id: UserId,
    pub second_username: String,
    pub match_count: usize,
}

impl From<Pairing> for PairingSummary {
    fn from(pairing: Pairing) -> Self {
        Self {
            match_count: pairing.match_count(),
            first_user_id: pairing.first.user_id,
            first_username: pairing.first.username,
            second_user_id: pairing.second.user_id,
            second_username: pairing.second.username,
        }
    }
}

/// Another player seen from one player's side of a pairing
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerSummary {
    pub user_id: UserId,
    pub username: String,
    pub match_count: usize,
}

impl PartnerSummary {
    pub fn from_pairing(pairing: &Pairing, user_id: UserId) -> Self {
        let partner = pairing.other(user_id);
        Self {
            user_id: partner.user_id,
            username: partner.username.clone(),
            match_count: pairing.match_count(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeStatsResponse {
    pub office_id: OfficeId,
    pub matches_played: usize,
    pub ranked_players: usize,
    pub highest_ranked: Option<PlayerSummary>,
    pub record_holder: Option<RecordHolder>,
    pub most_played: Option<PlayerSummary>,
    pub player_count_distribution: BTreeMap<usize, usize>,
    pub most_common_pairing: Option<PairingSummary>,
    pub most_common_opposing_pairing: Option<PairingSummary>,
    pub tournaments: Vec<TournamentSummaryResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDetail {
    pub user_id: UserId,
    pub username: String,
    pub rank: Option<usize>,
    pub rating: i32,
    pub win_count: u32,
    pub loss_count: u32,
    pub win_percentage: f64,
    pub matches_played: u32,
    pub record_rating: i32,
    pub record_rating_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub teammates: Vec<PartnerSummary>,
    pub opponents: Vec<PartnerSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedParticipantResponse {
    pub user_id: UserId,
    pub win: bool,
    pub points_applied: i32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetail {
    pub match_id: MatchId,
    pub participants: Vec<ProcessedParticipantResponse>,
}

impl MatchDetail {
    pub fn new(match_id: MatchId, processed: &ProcessedMatch) -> Self {
        Self {
            match_id,
            participants: processed
                .participants
                .values()
                .map(|p| ProcessedParticipantResponse {
                    user_id: p.user_id,
                    win: p.win,
                    points_applied: p.points_applied,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSummaryResponse {
    pub id: TournamentId,
    pub name: String,
    pub player_count: usize,
    pub played_count: usize,
    pub scheduled_count: usize,
    pub is_active: bool,
    pub progress: f64,
}

impl From<TournamentSummary> for TournamentSummaryResponse {
    fn from(summary: TournamentSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
            player_count: summary.player_count,
            played_count: summary.played_count,
            scheduled_count: summary.scheduled_count,
            is_active: summary.is_active,
            progress: summary.progress,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketParticipant {
    pub user_id: UserId,
    pub username: String,
    pub result: MatchResult,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketMatch {
    pub match_id: MatchId,
    pub state: MatchState,
    pub next_match_id: Option<MatchId>,
    pub participants: Vec<BracketParticipant>,
}

impl From<&MatchRecord> for BracketMatch {
    fn from(record: &MatchRecord) -> Self {
        Self {
            match_id: record.id,
            state: record.state,
            next_match_id: record.next_match_id,
            participants: record
                .participants
                .iter()
                .map(|p| BracketParticipant {
                    user_id: p.user_id,
                    username: p.username.clone(),
                    result: p.result,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentResponse {
    #[serde(flatten)]
    pub summary: TournamentSummaryResponse,
    pub rounds: Vec<Vec<BracketMatch>>,
}

impl From<TournamentView> for TournamentResponse {
    fn from(view: TournamentView) -> Self {
        Self {
            rounds: view
                .bracket
                .rounds
                .iter()
                .map(|round| round.iter().map(BracketMatch::from).collect())
                .collect(),
            summary: view.summary.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    pub user_id: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMatchRequest {
    pub creator_id: UserId,
    pub winners: Vec<UserId>,
    pub losers: Vec<UserId>,
    #[serde(default)]
    pub is_handicap: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStateResponse {
    pub match_id: MatchId,
    pub state: MatchState,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTournamentRequest {
    pub creator_id: UserId,
    pub name: String,
    pub participants: Vec<UserId>,
}
