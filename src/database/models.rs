use chrono::{DateTime, Utc};

use crate::domain::{MatchId, MatchResult, MatchState, OfficeId, TournamentId, UserId};

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub non_player: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Office {
    pub id: OfficeId,
    pub name: String,
    pub admin_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a match row and its participants
#[derive(Debug, Clone)]
pub struct NewMatch {
    pub office_id: OfficeId,
    pub creator_id: UserId,
    pub state: MatchState,
    pub is_handicap: bool,
    pub tournament_id: Option<TournamentId>,
    pub next_match_id: Option<MatchId>,
    pub participants: Vec<(UserId, MatchResult)>,
    pub created_at: DateTime<Utc>,
}
