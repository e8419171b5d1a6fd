use std::sync::Arc;

use chrono::Utc;
use office_ladder::cache::SnapshotCache;
use office_ladder::config::RatingSettings;
use office_ladder::database::{self, SqliteStore, create_memory_pool, offices, setup, users};
use office_ladder::domain::{MatchState, MatchStore, MemoryStore, UserId};
use office_ladder::processing::{OfficeProcessor, replay};
use office_ladder::services::ladder::LadderService;
use rand::SeedableRng;
use rand::rngs::StdRng;

struct Office {
    store: Arc<SqliteStore>,
    processor: Arc<OfficeProcessor>,
    ladder: LadderService,
    office_id: i64,
    admin: UserId,
    players: Vec<UserId>,
}

fn office_with_players(names: &[&str]) -> Office {
    let pool = create_memory_pool().unwrap();
    let (office_id, admin, players) = {
        let conn = database::get_connection(&pool).unwrap();
        setup::init_database(&conn).unwrap();
        let admin = users::insert_user(&conn, "admin", false).unwrap().id;
        let office = offices::insert_office(&conn, "Krakow", admin).unwrap();
        let players = names
            .iter()
            .map(|name| {
                let id = users::insert_user(&conn, name, false).unwrap().id;
                offices::add_player(&conn, office.id, id).unwrap();
                id
            })
            .collect();
        (office.id, admin, players)
    };

    let store = Arc::new(SqliteStore::new(pool.clone()));
    let processor = Arc::new(OfficeProcessor::new(
        Arc::clone(&store) as Arc<dyn MatchStore>,
        Arc::new(SnapshotCache::new()),
        RatingSettings::default(),
    ));
    Office {
        ladder: LadderService::new(pool, Arc::clone(&processor)),
        store,
        processor,
        office_id,
        admin,
        players,
    }
}

#[test]
fn test_sqlite_round_trip_matches_in_memory_replay() {
    let office = office_with_players(&["ada", "bob", "cy", "dee"]);
    let p = &office.players;

    let results = [
        (vec![p[0]], vec![p[1]]),
        (vec![p[0], p[2]], vec![p[1], p[3]]),
        (vec![p[3]], vec![p[0], p[1], p[2]]),
        (vec![p[1]], vec![p[2]]),
    ];
    for (winners, losers) in &results {
        office
            .ladder
            .record_match(office.admin, office.office_id, winners, losers, false)
            .unwrap();
    }

    let snapshot = office.processor.process(office.office_id).unwrap();
    assert_eq!(snapshot.matches_played(), 4);
    assert_eq!(snapshot.ranked_players().len(), 4);

    let loaded = office.store.load_approved_matches(office.office_id).unwrap();
    let in_memory = MemoryStore::with_matches(loaded);
    let replayed = replay(
        office.office_id,
        &in_memory.load_approved_matches(office.office_id).unwrap(),
        snapshot.processed_at,
        &RatingSettings::default(),
    )
    .unwrap();

    assert_eq!(*snapshot, replayed);
    assert_eq!(
        serde_json::to_string(&*snapshot).unwrap(),
        serde_json::to_string(&replayed).unwrap()
    );
}

#[test]
fn test_approval_invalidates_cached_snapshot() {
    let office = office_with_players(&["ada", "bob"]);
    let (ada, bob) = (office.players[0], office.players[1]);

    let (match_id, state) = office
        .ladder
        .record_match(ada, office.office_id, &[ada], &[bob], false)
        .unwrap();
    assert_eq!(state, MatchState::Pending);

    let before = office.processor.process(office.office_id).unwrap();
    assert_eq!(before.matches_played(), 0);

    office.ladder.approve_match(bob, match_id).unwrap();
    let after = office.processor.process(office.office_id).unwrap();
    assert_eq!(after.matches_played(), 1);
    assert_eq!(after.get_player(ada).unwrap().rating, 432);
    assert_eq!(after.get_player(bob).unwrap().rating, 368);
    assert_eq!(after.most_common_opponent(ada).unwrap().other(ada).user_id, bob);
}

#[test]
fn test_tournament_bracket_from_sqlite() {
    let office = office_with_players(&["ada", "bob", "cy", "dee", "eve", "fay", "gus", "hal"]);
    let mut rng = StdRng::seed_from_u64(11);

    let tournament = office
        .ladder
        .create_tournament(office.admin, office.office_id, "Summer open", &office.players, &mut rng)
        .unwrap();

    let view = office.processor.tournament(tournament.id).unwrap();
    assert_eq!(view.bracket.round_sizes(), vec![4, 2, 1]);
    assert_eq!(view.summary.scheduled_count, 7);
    assert_eq!(view.summary.played_count, 0);
    assert_eq!(view.summary.progress, 0.0);

    let mut seated: Vec<UserId> = view.bracket.rounds[0]
        .iter()
        .flat_map(|m| m.participants.iter().map(|p| p.user_id))
        .collect();
    seated.sort_unstable();
    assert_eq!(seated, office.players);

    let summaries = office.processor.office_tournaments(office.office_id).unwrap();
    assert_eq!(summaries.len(), 1);
    assert!(summaries[0].is_active);
    assert!(tournament.created_at <= Utc::now());
}
