use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type MatchId = i64;
pub type OfficeId = i64;
pub type TournamentId = i64;

/// Which side of a match a participant finished on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchResult {
    Win,
    Loss,
}

impl MatchResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchResult::Win => "win",
            MatchResult::Loss => "loss",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "win" => Some(MatchResult::Win),
            "loss" => Some(MatchResult::Loss),
            _ => None,
        }
    }
}

/// Lifecycle of a match row
///
/// Logged matches start `Pending` and become `Approved` once both sides (or the office
/// admin) sign off. Tournament matches are created `Scheduled` and only count once
/// approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchState {
    Pending,
    Scheduled,
    Approved,
}

impl MatchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchState::Pending => "pending",
            MatchState::Scheduled => "scheduled",
            MatchState::Approved => "approved",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(MatchState::Pending),
            "scheduled" => Some(MatchState::Scheduled),
            "approved" => Some(MatchState::Approved),
            _ => None,
        }
    }
}

/// One user's entry in a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: UserId,
    pub username: String,
    pub non_player: bool,
    pub result: MatchResult,
}

impl Participant {
    pub fn new(user_id: UserId, username: &str, result: MatchResult) -> Self {
        Self {
            user_id,
            username: username.to_string(),
            non_player: false,
            result,
        }
    }

    pub fn is_winner(&self) -> bool {
        self.result == MatchResult::Win
    }
}

/// A match as read from the store, ordered by `created_at` when replayed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub office_id: OfficeId,
    pub created_at: DateTime<Utc>,
    pub is_handicap: bool,
    pub state: MatchState,
    pub participants: Vec<Participant>,
    pub tournament_id: Option<TournamentId>,
    pub next_match_id: Option<MatchId>,
}

impl MatchRecord {
    pub fn winners(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.is_winner())
    }

    pub fn losers(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| !p.is_winner())
    }

    pub fn is_approved(&self) -> bool {
        self.state == MatchState::Approved
    }
}

/// Tournament metadata; its matches are loaded separately
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub office_id: OfficeId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub participant_ids: Vec<UserId>,
}

impl Tournament {
    pub fn player_count(&self) -> usize {
        self.participant_ids.len()
    }
}
