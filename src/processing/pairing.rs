use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::domain::{MatchId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedPlayer {
    pub user_id: UserId,
    pub username: String,
}

impl PairedPlayer {
    pub fn new(user_id: UserId, username: &str) -> Self {
        Self {
            user_id,
            username: username.to_string(),
        }
    }
}

/// Two players and the matches in which a relation (teammates or opponents) held
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub first: PairedPlayer,
    pub second: PairedPlayer,
    pub match_ids: Vec<MatchId>,
}

impl Pairing {
    pub fn match_count(&self) -> usize {
        self.match_ids.len()
    }

    /// The partner of `user_id` in this pairing
    pub fn other(&self, user_id: UserId) -> &PairedPlayer {
        if self.first.user_id == user_id {
            &self.second
        } else {
            &self.first
        }
    }
}

/// Unordered player pairs indexed from both sides
///
/// Each pair is stored twice, once keyed by each player, so per-player lookups are a
/// single map access.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairingIndex {
    pairs: BTreeMap<UserId, BTreeMap<UserId, Pairing>>,
}

impl PairingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_match(&mut self, match_id: MatchId, a: &PairedPlayer, b: &PairedPlayer) {
        if a.user_id == b.user_id {
            return;
        }
        self.add_in_one_direction(match_id, a, b);
        self.add_in_one_direction(match_id, b, a);
    }

    fn add_in_one_direction(&mut self, match_id: MatchId, from: &PairedPlayer, to: &PairedPlayer) {
        let pairing = self
            .pairs
            .entry(from.user_id)
            .or_default()
            .entry(to.user_id)
            .or_insert_with(|| Pairing {
                first: from.clone(),
                second: to.clone(),
                match_ids: Vec::new(),
            });
        pairing.match_ids.push(match_id);
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Every pair once, most frequent first
    pub fn ordered_pairings(&self) -> Vec<Pairing> {
        let mut ordered: Vec<Pairing> = self
            .pairs
            .values()
            .flat_map(|partners| partners.values())
            .filter(|p| p.first.user_id > p.second.user_id)
            .cloned()
            .collect();
        sort_pairings(&mut ordered);
        ordered
    }

    /// Pairs involving `user_id`, listed with that player first
    pub fn pairings_for_player(&self, user_id: UserId) -> Vec<Pairing> {
        let mut ordered: Vec<Pairing> = self
            .pairs
            .get(&user_id)
            .map(|partners| partners.values().cloned().collect())
            .unwrap_or_default();
        sort_pairings(&mut ordered);
        ordered
    }

    pub fn most_common_pairing(&self) -> Option<Pairing> {
        self.ordered_pairings().into_iter().next()
    }

    pub fn most_common_for_player(&self, user_id: UserId) -> Option<Pairing> {
        self.pairings_for_player(user_id).into_iter().next()
    }
}

fn sort_pairings(pairings: &mut [Pairing]) {
    pairings.sort_by(compare_pairings);
}

fn compare_pairings(a: &Pairing, b: &Pairing) -> Ordering {
    b.match_count()
        .cmp(&a.match_count())
        .then_with(|| a.first.username.cmp(&b.first.username))
        .then_with(|| a.second.username.cmp(&b.second.username))
        // same usernames only happen for distinct users sharing a display name
        .then_with(|| a.first.user_id.cmp(&b.first.user_id))
        .then_with(|| a.second.user_id.cmp(&b.second.user_id))
}
