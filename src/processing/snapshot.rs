use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::pairing::{Pairing, PairingIndex};
use crate::domain::{MatchId, OfficeId, Player, UserId};

/// How one participant fared in a replayed match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedParticipant {
    pub user_id: UserId,
    pub win: bool,
    /// Magnitude of the rating change; `win` gives the direction
    pub points_applied: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedMatch {
    pub participants: BTreeMap<UserId, ProcessedParticipant>,
}

impl ProcessedMatch {
    pub fn participant(&self, user_id: UserId) -> Option<&ProcessedParticipant> {
        self.participants.get(&user_id)
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }
}

/// Everything one replay of an office's approved matches produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficeSnapshot {
    pub office_id: OfficeId,
    pub processed_at: DateTime<Utc>,
    pub(super) players: BTreeMap<UserId, Player>,
    pub(super) matches: BTreeMap<MatchId, ProcessedMatch>,
    pub(super) teammates: PairingIndex,
    pub(super) opponents: PairingIndex,
}

impl OfficeSnapshot {
    pub fn new(office_id: OfficeId, processed_at: DateTime<Utc>) -> Self {
        Self {
            office_id,
            processed_at,
            players: BTreeMap::new(),
            matches: BTreeMap::new(),
            teammates: PairingIndex::new(),
            opponents: PairingIndex::new(),
        }
    }

    pub fn get_player(&self, user_id: UserId) -> Option<&Player> {
        self.players.get(&user_id)
    }

    pub fn get_match(&self, match_id: MatchId) -> Option<&ProcessedMatch> {
        self.matches.get(&match_id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn matches_played(&self) -> usize {
        self.matches.len()
    }

    /// Active players, best first
    pub fn ranked_players(&self) -> Vec<&Player> {
        let mut ranked: Vec<&Player> = self.players.values().filter(|p| p.is_active).collect();
        ranked.sort_by(|a, b| leaderboard_order(a, b));
        ranked
    }

    pub fn highest_ranked_player(&self) -> Option<&Player> {
        self.ranked_players().into_iter().next()
    }

    /// Player with the highest rating ever reached; the lowest user id wins ties
    pub fn record_holder(&self) -> Option<&Player> {
        first_max_by_key(self.players.values(), |p| i64::from(p.record_rating))
    }

    /// Player with the most replayed matches; the lowest user id wins ties
    pub fn most_played_player(&self) -> Option<&Player> {
        first_max_by_key(self.players.values(), |p| i64::from(p.matches_played()))
    }

    /// Number of matches keyed by how many participants they had
    pub fn player_count_distribution(&self) -> BTreeMap<usize, usize> {
        let mut counts = BTreeMap::new();
        for processed in self.matches.values() {
            *counts.entry(processed.participant_count()).or_insert(0) += 1;
        }
        counts
    }

    pub fn most_common_pairing(&self) -> Option<Pairing> {
        self.teammates.most_common_pairing()
    }

    pub fn most_common_opposing_pairing(&self) -> Option<Pairing> {
        self.opponents.most_common_pairing()
    }

    pub fn pairings_for_player(&self, user_id: UserId) -> Vec<Pairing> {
        self.teammates.pairings_for_player(user_id)
    }

    pub fn opponents_for_player(&self, user_id: UserId) -> Vec<Pairing> {
        self.opponents.pairings_for_player(user_id)
    }

    pub fn most_common_teammate(&self, user_id: UserId) -> Option<Pairing> {
        self.teammates.most_common_for_player(user_id)
    }

    pub fn most_common_opponent(&self, user_id: UserId) -> Option<Pairing> {
        self.opponents.most_common_for_player(user_id)
    }
}

/// Rating desc, wins desc, losses asc, then username desc
pub fn leaderboard_order(a: &Player, b: &Player) -> Ordering {
    b.rating
        .cmp(&a.rating)
        .then_with(|| b.win_count.cmp(&a.win_count))
        .then_with(|| a.loss_count.cmp(&b.loss_count))
        .then_with(|| b.username.cmp(&a.username))
}

fn first_max_by_key<'a, I, F>(players: I, key: F) -> Option<&'a Player>
where
    I: Iterator<Item = &'a Player>,
    F: Fn(&Player) -> i64,
{
    let mut best: Option<&Player> = None;
    for player in players {
        match best {
            Some(current) if key(player) <= key(current) => {}
            _ => best = Some(player),
        }
    }
    best
}
