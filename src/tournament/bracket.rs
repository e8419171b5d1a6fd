use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::domain::{MatchId, MatchRecord, MatchState, Tournament, TournamentId};
use crate::errors::LadderError;

/// Rounds of a single-elimination bracket, first round at index 0
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub rounds: Vec<Vec<MatchRecord>>,
}

impl Bracket {
    pub fn round_sizes(&self) -> Vec<usize> {
        self.rounds.iter().map(Vec::len).collect()
    }

    pub fn final_match(&self) -> Option<&MatchRecord> {
        self.rounds.last().and_then(|round| round.first())
    }
}

/// Rebuild the bracket by walking `next_match_id` links back from the final
pub fn build_bracket(
    tournament_id: TournamentId,
    matches: &[MatchRecord],
) -> Result<Bracket, LadderError> {
    if matches.is_empty() {
        return Ok(Bracket::default());
    }

    let arena: HashMap<MatchId, &MatchRecord> = matches.iter().map(|m| (m.id, m)).collect();
    let root = find_root(tournament_id, matches)?;
    let children = reverse_links(matches);

    let mut levels: Vec<Vec<MatchId>> = vec![vec![root]];
    loop {
        let next_level: Vec<MatchId> = levels[levels.len() - 1]
            .iter()
            .filter_map(|id| children.get(id))
            .flatten()
            .copied()
            .collect();
        if next_level.is_empty() {
            break;
        }
        levels.push(next_level);
    }

    let reached: usize = levels.iter().map(Vec::len).sum();
    if reached != matches.len() {
        return Err(LadderError::InvalidBracket {
            tournament_id,
            reason: format!(
                "{} of {} matches are not connected to the final",
                matches.len() - reached,
                matches.len()
            ),
        });
    }

    let rounds = levels
        .iter()
        .rev()
        .map(|level| level.iter().map(|id| arena[id].clone()).collect())
        .collect();
    Ok(Bracket { rounds })
}

fn find_root(tournament_id: TournamentId, matches: &[MatchRecord]) -> Result<MatchId, LadderError> {
    let roots: Vec<MatchId> = matches
        .iter()
        .filter(|m| m.next_match_id.is_none())
        .map(|m| m.id)
        .collect();

    match roots.as_slice() {
        [root] => Ok(*root),
        [] => Err(LadderError::InvalidBracket {
            tournament_id,
            reason: "no final match".to_string(),
        }),
        _ => Err(LadderError::InvalidBracket {
            tournament_id,
            reason: format!("{} matches claim to be the final", roots.len()),
        }),
    }
}

/// next match id -> ids of the matches feeding into it, ascending
fn reverse_links(matches: &[MatchRecord]) -> BTreeMap<MatchId, Vec<MatchId>> {
    let mut children: BTreeMap<MatchId, Vec<MatchId>> = BTreeMap::new();
    for record in matches {
        if let Some(next) = record.next_match_id {
            children.entry(next).or_default().push(record.id);
        }
    }
    for ids in children.values_mut() {
        ids.sort_unstable();
    }
    children
}

/// Share of scheduled matches already played, as a percentage
///
/// A tournament with nothing scheduled counts as complete.
pub fn progress(played: usize, scheduled: usize) -> f64 {
    if scheduled == 0 {
        return 100.0;
    }
    played as f64 * 100.0 / scheduled as f64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentSummary {
    pub id: TournamentId,
    pub name: String,
    pub player_count: usize,
    pub played_count: usize,
    pub scheduled_count: usize,
    pub is_active: bool,
    pub progress: f64,
}

impl TournamentSummary {
    pub fn from_matches(tournament: &Tournament, matches: &[MatchRecord]) -> Self {
        let played_count = matches.iter().filter(|m| m.is_approved()).count();
        let scheduled_count = matches.len();
        let is_active = matches.iter().any(|m| m.state == MatchState::Scheduled);

        Self {
            id: tournament.id,
            name: tournament.name.clone(),
            player_count: tournament.player_count(),
            played_count,
            scheduled_count,
            is_active,
            progress: progress(played_count, scheduled_count),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentView {
    pub summary: TournamentSummary,
    pub bracket: Bracket,
}

impl TournamentView {
    pub fn build(tournament: &Tournament, matches: &[MatchRecord]) -> Result<Self, LadderError> {
        Ok(Self {
            summary: TournamentSummary::from_matches(tournament, matches),
            bracket: build_bracket(tournament.id, matches)?,
        })
    }
}
