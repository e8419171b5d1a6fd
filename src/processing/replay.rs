use chrono::{DateTime, Duration, Utc};
use log::debug;
use std::collections::HashSet;
use std::time::Instant;

use super::pairing::PairedPlayer;
use super::snapshot::{OfficeSnapshot, ProcessedMatch, ProcessedParticipant};
use crate::config::settings::RatingSettings;
use crate::domain::{MatchRecord, OfficeId, Participant, Player};
use crate::errors::LadderError;
use crate::rating::{self, SideDeltas};

pub const STARTING_RATING: i32 = 400;
pub const RATING_FLOOR: i32 = 200;
/// Results below this many matches played count double
pub const ROOKIE_MATCHES: u32 = 20;
pub const ACTIVE_WINDOW_WEEKS: i64 = 8;

/// Replay approved matches oldest first and build the office snapshot
///
/// `now` anchors the activity window, so the same input and `now` always produce
/// the same snapshot.
pub fn replay(
    office_id: OfficeId,
    matches: &[MatchRecord],
    now: DateTime<Utc>,
    config: &RatingSettings,
) -> Result<OfficeSnapshot, LadderError> {
    let started = Instant::now();
    let mut ordered: Vec<&MatchRecord> = matches.iter().filter(|m| m.is_approved()).collect();
    ordered.sort_by_key(|m| (m.created_at, m.id));

    let mut snapshot = OfficeSnapshot::new(office_id, now);
    for record in ordered {
        apply_match(&mut snapshot, record, now, config)?;
    }

    debug!(
        "Replayed {} matches for office {} ({} players) in {:?}",
        snapshot.matches_played(),
        office_id,
        snapshot.players.len(),
        started.elapsed()
    );
    Ok(snapshot)
}

fn apply_match(
    snapshot: &mut OfficeSnapshot,
    record: &MatchRecord,
    now: DateTime<Utc>,
    config: &RatingSettings,
) -> Result<(), LadderError> {
    validate_match(record)?;

    let active = is_recent(record.created_at, now, config);
    for participant in &record.participants {
        let next = match snapshot.players.get(&participant.user_id) {
            Some(current) => Player {
                is_active: current.is_active || active,
                ..current.clone()
            },
            None => Player::new(
                participant.user_id,
                &participant.username,
                config.starting_rating,
                active,
            ),
        };
        snapshot.players.insert(participant.user_id, next);
    }

    let winners: Vec<&Participant> = record.winners().collect();
    let losers: Vec<&Participant> = record.losers().collect();
    let deltas = side_deltas(snapshot, record, &winners, &losers, config);

    record_pairings(snapshot, record, &winners, &losers);

    let mut processed = ProcessedMatch::default();
    for winner in &winners {
        let current = &snapshot.players[&winner.user_id];
        let (next, applied) = apply_win(current, deltas.winner_gain, record.created_at, config);
        processed.participants.insert(
            winner.user_id,
            ProcessedParticipant {
                user_id: winner.user_id,
                win: true,
                points_applied: applied,
            },
        );
        snapshot.players.insert(winner.user_id, next);
    }
    for loser in &losers {
        let current = &snapshot.players[&loser.user_id];
        let (next, applied) = apply_loss(current, deltas.loser_loss, record.created_at, config);
        processed.participants.insert(
            loser.user_id,
            ProcessedParticipant {
                user_id: loser.user_id,
                win: false,
                points_applied: applied,
            },
        );
        snapshot.players.insert(loser.user_id, next);
    }

    snapshot.matches.insert(record.id, processed);
    Ok(())
}

fn validate_match(record: &MatchRecord) -> Result<(), LadderError> {
    if record.participants.is_empty() {
        return Err(LadderError::NoParticipants(record.id));
    }

    let mut seen = HashSet::new();
    for participant in &record.participants {
        if !seen.insert(participant.user_id) {
            return Err(LadderError::ParticipantOnBothSides {
                match_id: record.id,
                user_id: participant.user_id,
            });
        }
        if participant.non_player {
            return Err(LadderError::NonPlayerParticipant {
                match_id: record.id,
                user_id: participant.user_id,
            });
        }
    }

    if record.winners().next().is_none() || record.losers().next().is_none() {
        return Err(LadderError::EmptySide(record.id));
    }
    Ok(())
}

fn is_recent(created_at: DateTime<Utc>, now: DateTime<Utc>, config: &RatingSettings) -> bool {
    now - created_at < Duration::weeks(config.active_window_weeks)
}

/// Ratings are read before any player of this match is updated
fn side_deltas(
    snapshot: &OfficeSnapshot,
    record: &MatchRecord,
    winners: &[&Participant],
    losers: &[&Participant],
    config: &RatingSettings,
) -> SideDeltas {
    if record.is_handicap {
        return SideDeltas::symmetric(rating::handicap_delta(config));
    }

    let ratings_of = |side: &[&Participant]| -> Vec<i32> {
        side.iter()
            .map(|p| snapshot.players[&p.user_id].rating)
            .collect()
    };
    let delta = rating::group_delta(&ratings_of(winners), &ratings_of(losers), config);
    rating::split_by_side_size(delta, winners.len(), losers.len())
}

fn record_pairings(
    snapshot: &mut OfficeSnapshot,
    record: &MatchRecord,
    winners: &[&Participant],
    losers: &[&Participant],
) {
    for side in [winners, losers] {
        for (i, a) in side.iter().enumerate() {
            for b in &side[i + 1..] {
                snapshot.teammates.add_match(record.id, &paired(a), &paired(b));
            }
        }
    }
    for winner in winners {
        for loser in losers {
            snapshot
                .opponents
                .add_match(record.id, &paired(winner), &paired(loser));
        }
    }
}

fn paired(p: &Participant) -> PairedPlayer {
    PairedPlayer::new(p.user_id, &p.username)
}

fn rookie_adjusted(player: &Player, delta: i32, config: &RatingSettings) -> i32 {
    if player.matches_played() < config.rookie_matches {
        delta * 2
    } else {
        delta
    }
}

fn apply_win(
    current: &Player,
    gain: i32,
    played_at: DateTime<Utc>,
    config: &RatingSettings,
) -> (Player, i32) {
    let applied = rookie_adjusted(current, gain, config);
    let mut next = current.clone();
    next.win_count += 1;
    next.rating += applied;
    update_record(&mut next, played_at);
    (next, applied)
}

fn apply_loss(
    current: &Player,
    loss: i32,
    played_at: DateTime<Utc>,
    config: &RatingSettings,
) -> (Player, i32) {
    let mut applied = rookie_adjusted(current, loss, config);
    if current.rating - applied < config.rating_floor {
        applied = current.rating - config.rating_floor;
    }

    let mut next = current.clone();
    next.loss_count += 1;
    next.rating -= applied;
    // a first match that is a loss still sets the initial record
    update_record(&mut next, played_at);
    (next, applied)
}

fn update_record(player: &mut Player, played_at: DateTime<Utc>) {
    if player.rating > player.record_rating {
        player.record_rating = player.rating;
        player.record_rating_date = Some(played_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MatchResult, MatchState, UserId};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn record(id: i64, days_ago: i64, winners: &[UserId], losers: &[UserId]) -> MatchRecord {
        let name = |id: &UserId| format!("user{}", id);
        let mut participants: Vec<Participant> = winners
            .iter()
            .map(|id| Participant::new(*id, &name(id), MatchResult::Win))
            .collect();
        participants.extend(
            losers
                .iter()
                .map(|id| Participant::new(*id, &name(id), MatchResult::Loss)),
        );
        MatchRecord {
            id,
            office_id: 1,
            created_at: now() - Duration::days(days_ago),
            is_handicap: false,
            state: MatchState::Approved,
            participants,
            tournament_id: None,
            next_match_id: None,
        }
    }

    fn run(matches: &[MatchRecord]) -> OfficeSnapshot {
        replay(1, matches, now(), &RatingSettings::default()).unwrap()
    }

    #[test]
    fn test_single_match_between_new_players() {
        let snapshot = run(&[record(1, 1, &[1], &[2])]);

        let winner = snapshot.get_player(1).unwrap();
        let loser = snapshot.get_player(2).unwrap();
        assert_eq!(winner.rating, 432);
        assert_eq!(loser.rating, 368);
        assert_eq!(winner.win_count, 1);
        assert_eq!(loser.loss_count, 1);

        let processed = snapshot.get_match(1).unwrap();
        assert_eq!(processed.participant(1).unwrap().points_applied, 32);
        assert!(processed.participant(1).unwrap().win);
        assert_eq!(processed.participant(2).unwrap().points_applied, 32);
        assert!(!processed.participant(2).unwrap().win);
    }

    #[test]
    fn test_replay_is_deterministic() {
        let matches: Vec<MatchRecord> = (0..30)
            .map(|i| {
                let (a, b, c) = (i % 4 + 1, (i + 1) % 4 + 1, (i + 2) % 4 + 1);
                if i % 3 == 0 {
                    record(i, 60 - i, &[a, b], &[c])
                } else {
                    record(i, 60 - i, &[a], &[b, c])
                }
            })
            .collect();

        let first = run(&matches);
        let second = run(&matches);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_replay_orders_by_creation_time() {
        let older = record(2, 10, &[1], &[2]);
        let newer = record(1, 5, &[2], &[1]);

        let shuffled = run(&[newer.clone(), older.clone()]);
        let ordered = run(&[older, newer]);
        assert_eq!(shuffled, ordered);
    }

    #[test]
    fn test_pending_matches_are_skipped() {
        let mut pending = record(2, 1, &[2], &[1]);
        pending.state = MatchState::Pending;
        let snapshot = run(&[record(1, 2, &[1], &[2]), pending]);

        assert_eq!(snapshot.matches_played(), 1);
        assert!(snapshot.get_match(2).is_none());
        assert_eq!(snapshot.get_player(1).unwrap().rating, 432);
    }

    #[test]
    fn test_rating_never_drops_below_floor() {
        let matches: Vec<MatchRecord> = (0..40).map(|i| record(i, 50 - i, &[1], &[2])).collect();
        let config = RatingSettings::default();
        let mut snapshot_ratings = Vec::new();
        for n in 1..=matches.len() {
            let snapshot = replay(1, &matches[..n], now(), &config).unwrap();
            snapshot_ratings.push(snapshot.get_player(2).unwrap().rating);
        }

        assert!(snapshot_ratings.iter().all(|&r| r >= RATING_FLOOR));
        assert_eq!(*snapshot_ratings.last().unwrap(), RATING_FLOOR);
    }

    #[test]
    fn test_floor_clamps_points_applied() {
        let config = RatingSettings {
            rookie_matches: 0,
            ..RatingSettings::default()
        };
        let mut loser = Player::new(2, "user2", 210, true);
        loser.loss_count = 30;

        let (next, applied) = apply_loss(&loser, 16, now(), &config);
        assert_eq!(applied, 10);
        assert_eq!(next.rating, 200);
    }

    #[test]
    fn test_unequal_sides_rounding_correction() {
        let config = RatingSettings {
            rookie_matches: 0,
            ..RatingSettings::default()
        };
        // all at 400: shared delta 16, three winners share 16 / 3 rounded plus one
        let snapshot = replay(1, &[record(1, 1, &[1, 2, 3], &[4])], now(), &config).unwrap();
        let processed = snapshot.get_match(1).unwrap();

        for id in 1..=3 {
            assert_eq!(processed.participant(id).unwrap().points_applied, 6);
            assert_eq!(snapshot.get_player(id).unwrap().rating, 406);
        }
        assert_eq!(processed.participant(4).unwrap().points_applied, 16);
        assert_eq!(snapshot.get_player(4).unwrap().rating, 384);
    }

    #[test]
    fn test_rookie_doubling_stops_after_twenty_matches() {
        // a handicap match keeps the base delta at 4 regardless of ratings
        let matches: Vec<MatchRecord> = (0..21)
            .map(|i| {
                let mut m = record(i, 30 - i, &[1], &[i + 100]);
                m.is_handicap = true;
                m
            })
            .collect();
        let snapshot = run(&matches);

        for i in 0..20 {
            let applied = snapshot.get_match(i).unwrap().participant(1).unwrap().points_applied;
            assert_eq!(applied, 8, "match {} should be doubled", i);
        }
        let last = snapshot.get_match(20).unwrap().participant(1).unwrap().points_applied;
        assert_eq!(last, 4);
        assert_eq!(snapshot.get_player(1).unwrap().rating, 400 + 20 * 8 + 4);
    }

    #[test]
    fn test_handicap_delta_ignores_ratings() {
        let config = RatingSettings {
            rookie_matches: 0,
            ..RatingSettings::default()
        };
        let mut strong = Player::new(1, "user1", 1000, true);
        strong.win_count = 50;
        let even = Player::new(2, "user2", 400, true);

        let mut snapshot = OfficeSnapshot::new(1, now());
        snapshot.players.insert(1, strong);
        snapshot.players.insert(3, Player::new(3, "user3", 400, true));
        snapshot.players.insert(2, even);

        let mut lopsided = record(1, 1, &[1], &[2]);
        lopsided.is_handicap = true;
        let mut balanced = record(2, 1, &[3], &[2]);
        balanced.is_handicap = true;

        let lopsided_winners = [&lopsided.participants[0]];
        let balanced_winners = [&balanced.participants[0]];
        let losers = [&lopsided.participants[1]];

        let a = side_deltas(&snapshot, &lopsided, &lopsided_winners, &losers, &config);
        let b = side_deltas(&snapshot, &balanced, &balanced_winners, &losers, &config);
        assert_eq!(a, b);
        assert_eq!(a, SideDeltas::symmetric(4));
    }

    #[test]
    fn test_activity_window() {
        let stale = run(&[record(1, 63, &[1], &[2])]);
        assert!(stale.ranked_players().is_empty());
        assert!(stale.get_player(1).is_some());

        let fresh = run(&[record(1, 49, &[1], &[2])]);
        assert_eq!(fresh.ranked_players().len(), 2);
    }

    #[test]
    fn test_activity_window_edge() {
        let edge = run(&[record(1, 56, &[1], &[2])]);
        assert!(!edge.get_player(1).unwrap().is_active);

        let mut inside = record(1, 56, &[1], &[2]);
        inside.created_at += Duration::seconds(1);
        assert!(run(&[inside]).get_player(1).unwrap().is_active);
    }

    #[test]
    fn test_activity_comes_from_any_recent_match() {
        let snapshot = run(&[
            record(1, 70, &[1], &[2]),
            record(2, 63, &[3], &[1]),
            record(3, 1, &[1], &[4]),
        ]);

        assert!(snapshot.get_player(1).unwrap().is_active);
        assert!(!snapshot.get_player(2).unwrap().is_active);
        assert!(!snapshot.get_player(3).unwrap().is_active);
        assert!(snapshot.get_player(4).unwrap().is_active);
    }

    #[test]
    fn test_record_rating_tracks_high_water_mark() {
        let snapshot = run(&[
            record(1, 3, &[1], &[2]),
            record(2, 2, &[2], &[1]),
            record(3, 1, &[2], &[1]),
        ]);
        let player = snapshot.get_player(1).unwrap();

        assert_eq!(player.record_rating, 432);
        assert_eq!(player.record_rating_date, Some(now() - Duration::days(3)));
        assert!(player.rating < player.record_rating);
    }

    #[test]
    fn test_pairings_follow_sides() {
        let snapshot = run(&[
            record(1, 3, &[1, 2], &[3, 4]),
            record(2, 2, &[1, 2], &[3]),
        ]);

        let teammates = snapshot.most_common_pairing().unwrap();
        assert_eq!(teammates.match_ids, vec![1, 2]);
        assert_eq!(teammates.other(1).user_id, 2);

        assert_eq!(snapshot.opponents_for_player(1).len(), 2);
        assert_eq!(snapshot.pairings_for_player(3).len(), 1);
        assert_eq!(
            snapshot.most_common_opponent(4).unwrap().other(4).user_id,
            1
        );
    }

    #[test]
    fn test_player_count_distribution() {
        let snapshot = run(&[
            record(1, 3, &[1], &[2]),
            record(2, 2, &[1, 2], &[3, 4]),
            record(3, 1, &[3], &[4]),
        ]);

        let distribution = snapshot.player_count_distribution();
        assert_eq!(distribution.get(&2), Some(&2));
        assert_eq!(distribution.get(&4), Some(&1));
    }

    #[test]
    fn test_empty_side_is_rejected() {
        let err = replay(1, &[record(7, 1, &[1, 2], &[])], now(), &RatingSettings::default())
            .unwrap_err();
        assert_eq!(err, LadderError::EmptySide(7));
    }

    #[test]
    fn test_no_participants_is_rejected() {
        let err = replay(1, &[record(7, 1, &[], &[])], now(), &RatingSettings::default())
            .unwrap_err();
        assert_eq!(err, LadderError::NoParticipants(7));
    }

    #[test]
    fn test_player_on_both_sides_is_rejected() {
        let err = replay(1, &[record(7, 1, &[1], &[1])], now(), &RatingSettings::default())
            .unwrap_err();
        assert_eq!(
            err,
            LadderError::ParticipantOnBothSides {
                match_id: 7,
                user_id: 1
            }
        );
    }

    #[test]
    fn test_non_player_is_rejected() {
        let mut m = record(7, 1, &[1], &[2]);
        m.participants[1].non_player = true;

        let err = replay(1, &[m], now(), &RatingSettings::default()).unwrap_err();
        assert_eq!(
            err,
            LadderError::NonPlayerParticipant {
                match_id: 7,
                user_id: 2
            }
        );
    }
}
