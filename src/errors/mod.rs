use thiserror::Error;

use crate::domain::{MatchId, TournamentId, UserId};

/// Domain errors raised by the rating engine, bracket builder and write path
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LadderError {
    #[error("match {0} has no participants")]
    NoParticipants(MatchId),

    #[error("match {0} has an empty winner or loser side")]
    EmptySide(MatchId),

    #[error("user {user_id} appears more than once in match {match_id}")]
    ParticipantOnBothSides { match_id: MatchId, user_id: UserId },

    #[error("user {user_id} is a non-player and cannot take part in match {match_id}")]
    NonPlayerParticipant { match_id: MatchId, user_id: UserId },

    #[error("tournament {tournament_id} has an invalid bracket: {reason}")]
    InvalidBracket {
        tournament_id: TournamentId,
        reason: String,
    },

    #[error("a bracket needs a power-of-two number of participants, got {0}")]
    InvalidParticipantCount(usize),

    #[error("a match needs at least one winner and one loser")]
    MissingSide,

    #[error("user {0} is listed more than once")]
    DuplicateParticipant(UserId),

    #[error("user {0} is not a player in this office")]
    InvalidParticipant(UserId),

    #[error("match {0} is not pending")]
    MatchNotPending(MatchId),

    #[error("user {user_id} already approved match {match_id}")]
    AlreadyApproved { match_id: MatchId, user_id: UserId },

    #[error("user {0} is not the office admin")]
    NotOfficeAdmin(UserId),

    #[error("tournament name cannot be empty")]
    EmptyTournamentName,

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
}

impl LadderError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        LadderError::NotFound { entity, id }
    }

    /// True for errors caused by bad input rather than a missing row
    pub fn is_precondition(&self) -> bool {
        !matches!(self, LadderError::NotFound { .. })
    }
}

/// Add context to store query errors
pub fn query_context(what: &str, id: i64) -> String {
    format!("Failed to load {} for id: {}", what, id)
}

/// Add context to replay errors
pub fn replay_context(office_id: i64) -> String {
    format!("Failed to replay matches for office: {}", office_id)
}
