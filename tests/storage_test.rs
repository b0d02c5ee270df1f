//! Integration tests for the SQLite cache through the public API

use chrono::NaiveDate;
use duprly::{storage::*, MatchId, PlayerId};
use tempfile::TempDir;

fn rated_player(id: u64, name: &str, doubles: Option<f64>) -> Player {
    let mut player = Player::thin(PlayerId::new(id), name, None);
    player.is_thin = false;
    player.rating.doubles = doubles;
    player
}

fn doubles_match(id: u64, players: [u64; 4]) -> Match {
    let team = |a: u64, b: u64, won: bool| Team {
        games: [Some(11), Some(if won { 11 } else { 7 }), None],
        is_winner: won,
        players: vec![PlayerId::new(a), PlayerId::new(b)],
    };
    Match {
        match_id: MatchId::new(id),
        name: "Club Night".to_string(),
        event_date: NaiveDate::from_ymd_opt(2024, 4, 20).unwrap(),
        format: MatchFormat::Doubles,
        source: Some("CLUB".to_string()),
        match_type: None,
        confirmed: Some(true),
        teams: vec![
            team(players[0], players[1], true),
            team(players[2], players[3], false),
        ],
    }
}

#[test]
fn test_backfill_selection() {
    let mut db = DuprDatabase::open_in_memory().unwrap();
    for (id, doubles) in [(1, None), (2, Some(4.1)), (3, None), (4, Some(0.0))] {
        db.upsert_player(&rated_player(id, &format!("P{}", id), doubles))
            .unwrap();
    }

    let ids: Vec<u64> = db
        .select_players(PlayerFilter::MissingDoubles)
        .unwrap()
        .iter()
        .map(|p| p.player_id.as_u64())
        .collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn test_cache_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dupr.sqlite");

    {
        let mut db = DuprDatabase::open(&path).unwrap();
        db.upsert_player(&rated_player(1, "Ann", Some(3.75))).unwrap();
        db.insert_match(&doubles_match(500, [1, 2, 3, 4])).unwrap();
    }

    let db = DuprDatabase::open(&path).unwrap();
    let ann = db.find_player(PlayerId::new(1)).unwrap().unwrap();
    assert_eq!(ann.rating.doubles, Some(3.75));

    let stored = db.find_match(MatchId::new(500)).unwrap().unwrap();
    assert_eq!(stored, doubles_match(500, [1, 2, 3, 4]));
    assert_eq!(db.stats().unwrap().teams, 2);
}

#[test]
fn test_remove_player_keeps_match_history() {
    let mut db = DuprDatabase::open_in_memory().unwrap();
    db.upsert_player(&rated_player(1, "Ann", Some(3.75))).unwrap();
    db.insert_match(&doubles_match(500, [1, 2, 3, 4])).unwrap();

    assert!(db.remove_player(PlayerId::new(1)).unwrap());
    assert!(!db.remove_player(PlayerId::new(1)).unwrap());
    assert!(db.find_player(PlayerId::new(1)).unwrap().is_none());
    assert_eq!(
        db.match_ids_for_player(PlayerId::new(1)).unwrap(),
        vec![MatchId::new(500)]
    );
}

#[test]
fn test_upsert_never_duplicates() {
    let mut db = DuprDatabase::open_in_memory().unwrap();
    db.insert_thin_player(&Player::thin(PlayerId::new(42), "Forty Two", None))
        .unwrap();
    db.upsert_player(&rated_player(42, "Forty Two Full", Some(4.0)))
        .unwrap();
    db.upsert_player(&rated_player(42, "Forty Two Full", Some(4.2)))
        .unwrap();

    let all = db.select_players(PlayerFilter::All).unwrap();
    assert_eq!(all.len(), 1);
    assert!(!all[0].is_thin);
    assert_eq!(all[0].rating.doubles, Some(4.2));
}
