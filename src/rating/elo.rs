use super::types::SideDeltas;
use crate::config::settings::RatingSettings;

pub const K_FACTOR: f64 = 32.0;
pub const HANDICAP_MULTIPLIER: f64 = 0.25;

/// Probability that a side rated `rating_a` beats a side rated `rating_b`
pub fn expected_score(rating_a: f64, rating_b: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / 400.0))
}

/// Rounded rating movement for one result, halves rounded away from zero
pub fn points_delta(expected: f64, actual: f64, multiplier: f64, k_factor: f64) -> i32 {
    (multiplier * k_factor * (actual - expected)).round() as i32
}

/// Shared delta for a group match, from the average rating of each side
///
/// Both slices must be non-empty; the replay rejects such matches before getting here.
pub fn group_delta(winner_ratings: &[i32], loser_ratings: &[i32], config: &RatingSettings) -> i32 {
    assert!(
        !winner_ratings.is_empty() && !loser_ratings.is_empty(),
        "group_delta needs at least one winner and one loser"
    );

    let expected = expected_score(average(winner_ratings), average(loser_ratings));
    points_delta(expected, 1.0, 1.0, config.k_factor)
}

/// Fixed delta for handicap matches, independent of either side's rating
pub fn handicap_delta(config: &RatingSettings) -> i32 {
    points_delta(0.5, 1.0, config.handicap_multiplier, config.k_factor)
}

/// Scale the shared delta for the larger side of an unequal match
///
/// The larger side moves by `delta * smaller / larger`. When winners outnumber
/// losers every winner gets one extra point so rounding never drains rating from
/// the office as a whole.
pub fn split_by_side_size(delta: i32, winners: usize, losers: usize) -> SideDeltas {
    if winners == losers {
        return SideDeltas::symmetric(delta);
    }

    let smaller = winners.min(losers) as f64;
    let larger = winners.max(losers) as f64;
    // half fractions round away from zero, so 7.5 becomes 8
    let scaled = (f64::from(delta) * smaller / larger).round() as i32;

    if winners > losers {
        SideDeltas {
            winner_gain: scaled + 1,
            loser_loss: delta,
        }
    } else {
        SideDeltas {
            winner_gain: delta,
            loser_loss: scaled,
        }
    }
}

fn average(ratings: &[i32]) -> f64 {
    let sum: f64 = ratings.iter().map(|&r| f64::from(r)).sum();
    sum / ratings.len() as f64
}
