use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

use crate::domain::UserId;
use crate::errors::LadderError;

/// One match to create; `next_slot` indexes into the following round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSlot {
    pub next_slot: Option<usize>,
    pub seats: Option<(UserId, UserId)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRound {
    pub slots: Vec<PlannedSlot>,
}

/// Plan a single-elimination bracket for `participants`
///
/// Rounds are returned final first, so every slot's `next_slot` points into a round
/// that has already been created when rounds are inserted in order. Only the first
/// round is seeded, from the shuffled participant list.
pub fn plan_bracket<R>(participants: &[UserId], rng: &mut R) -> Result<Vec<PlannedRound>, LadderError>
where
    R: Rng + ?Sized,
{
    let count = participants.len();
    if count < 2 || !count.is_power_of_two() {
        return Err(LadderError::InvalidParticipantCount(count));
    }

    let mut seen = HashSet::with_capacity(count);
    for &user_id in participants {
        if !seen.insert(user_id) {
            return Err(LadderError::DuplicateParticipant(user_id));
        }
    }

    let mut seeded = participants.to_vec();
    seeded.shuffle(rng);

    let mut rounds = Vec::new();
    let mut width = 1;
    while width < count {
        let outermost = width * 2 == count;
        let slots = (0..width)
            .map(|i| PlannedSlot {
                next_slot: (width > 1).then_some(i / 2),
                seats: outermost.then(|| (seeded[2 * i], seeded[2 * i + 1])),
            })
            .collect();
        rounds.push(PlannedRound { slots });
        width *= 2;
    }
    Ok(rounds)
}
