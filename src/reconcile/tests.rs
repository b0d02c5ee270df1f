//! Unit tests for reconciliation

use super::*;
use crate::cli::types::{MatchId, PlayerId};
use crate::storage::{DuprDatabase, PlayerFilter};
use serde_json::json;

fn create_test_db() -> DuprDatabase {
    DuprDatabase::open_in_memory().unwrap()
}

fn player_payload(id: u64, name: &str, doubles: &str) -> Value {
    json!({
        "id": id,
        "duprId": format!("C{}", id),
        "fullName": name,
        "gender": "MALE",
        "age": 51,
        "ratings": {"singles": "NR", "doubles": doubles, "doublesProvisional": false}
    })
}

fn match_payload(match_id: u64, team1: [u64; 2], team2: [u64; 2], game1: i64) -> Value {
    let member = |id: u64| json!({"id": id, "fullName": format!("Player {}", id)});
    json!({
        "matchId": match_id,
        "eventDate": "2024-05-01",
        "eventFormat": "DOUBLES",
        "eventName": "Open Play",
        "teams": [
            {"game1": game1, "game2": 11, "winner": true,
             "player1": member(team1[0]), "player2": member(team1[1])},
            {"game1": 3, "game2": 6, "winner": false,
             "player1": member(team2[0]), "player2": member(team2[1])}
        ]
    })
}

#[test]
fn test_player_insert_then_idempotent() {
    let mut db = create_test_db();
    let raw = player_payload(7, "Pat Doe", "3.45");

    let mut reconciler = Reconciler::new(&mut db);
    assert_eq!(reconciler.reconcile_player(&raw).unwrap(), PlayerOutcome::Inserted);
    assert_eq!(reconciler.reconcile_player(&raw).unwrap(), PlayerOutcome::Unchanged);

    let stored = db.find_player(PlayerId::new(7)).unwrap().unwrap();
    assert_eq!(stored.full_name, "Pat Doe");
    assert_eq!(stored.rating.doubles, Some(3.45));
    assert_eq!(stored.rating.singles, None);
    assert_eq!(db.select_players(PlayerFilter::All).unwrap().len(), 1);
}

#[test]
fn test_player_update_in_place() {
    let mut db = create_test_db();
    let mut reconciler = Reconciler::new(&mut db);
    reconciler
        .reconcile_player(&player_payload(7, "Pat Doe", "3.45"))
        .unwrap();

    let outcome = reconciler
        .reconcile_player(&player_payload(7, "Pat Doe-Smith", "3.60"))
        .unwrap();
    assert_eq!(outcome, PlayerOutcome::Updated);

    let all = db.select_players(PlayerFilter::All).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].full_name, "Pat Doe-Smith");
    assert_eq!(all[0].rating.doubles, Some(3.60));
}

#[test]
fn test_null_rating_overwrites_by_default() {
    let mut db = create_test_db();
    let mut reconciler = Reconciler::new(&mut db);
    reconciler
        .reconcile_player(&player_payload(8, "Lee", "4.10"))
        .unwrap();
    reconciler
        .reconcile_player(&player_payload(8, "Lee", "NR"))
        .unwrap();

    let stored = db.find_player(PlayerId::new(8)).unwrap().unwrap();
    assert_eq!(stored.rating.doubles, None);
}

#[test]
fn test_keep_known_policy_preserves_rating() {
    let mut db = create_test_db();
    let mut reconciler = Reconciler::with_policy(&mut db, NullRatingPolicy::KeepKnown);
    reconciler
        .reconcile_player(&player_payload(8, "Lee", "4.10"))
        .unwrap();
    let outcome = reconciler
        .reconcile_player(&json!({"id": 8, "fullName": "Lee", "gender": "MALE", "age": 51}))
        .unwrap();

    // only the short code differs, and it is retained
    assert_eq!(outcome, PlayerOutcome::Unchanged);
    let stored = db.find_player(PlayerId::new(8)).unwrap().unwrap();
    assert_eq!(stored.rating.doubles, Some(4.10));
    assert_eq!(stored.dupr_code.as_deref(), Some("C8"));
}

#[test]
fn test_thin_record_promotion() {
    let mut db = create_test_db();
    let mut reconciler = Reconciler::new(&mut db);

    let outcome = reconciler
        .reconcile_match(&match_payload(1, [42, 43], [44, 45], 11))
        .unwrap();
    assert_eq!(outcome, MatchOutcome::Inserted { new_thin_players: 4 });

    let thin = db.find_player(PlayerId::new(42)).unwrap().unwrap();
    assert!(thin.is_thin);
    assert_eq!(thin.full_name, "Player 42");
    assert_eq!(thin.rating.doubles, None);

    let mut reconciler = Reconciler::new(&mut db);
    let outcome = reconciler
        .reconcile_player(&player_payload(42, "Full Forty-Two", "4.25"))
        .unwrap();
    assert_eq!(outcome, PlayerOutcome::Updated);

    let promoted = db.find_player(PlayerId::new(42)).unwrap().unwrap();
    assert!(!promoted.is_thin);
    assert_eq!(promoted.full_name, "Full Forty-Two");
    assert_eq!(promoted.rating.doubles, Some(4.25));
    assert_eq!(db.stats().unwrap().players, 4);
    assert_eq!(db.select_players(PlayerFilter::Thin).unwrap().len(), 3);
}

#[test]
fn test_match_links_existing_canonical_player() {
    let mut db = create_test_db();
    let mut reconciler = Reconciler::new(&mut db);
    reconciler
        .reconcile_player(&player_payload(42, "Canonical", "4.00"))
        .unwrap();

    let outcome = reconciler
        .reconcile_match(&match_payload(2, [42, 43], [44, 45], 11))
        .unwrap();
    assert_eq!(outcome, MatchOutcome::Inserted { new_thin_players: 3 });

    let stored = db.find_player(PlayerId::new(42)).unwrap().unwrap();
    assert_eq!(stored.full_name, "Canonical");
    assert!(!stored.is_thin);
    assert_eq!(stored.rating.doubles, Some(4.00));

    let m = db.find_match(MatchId::new(2)).unwrap().unwrap();
    assert_eq!(m.teams[0].players[0], PlayerId::new(42));
}

#[test]
fn test_match_is_immutable_once_stored() {
    let mut db = create_test_db();
    let mut reconciler = Reconciler::new(&mut db);
    reconciler
        .reconcile_match(&match_payload(3, [1, 2], [3, 4], 11))
        .unwrap();

    let altered = match_payload(3, [1, 2], [3, 4], 15);
    assert_eq!(
        reconciler.reconcile_match(&altered).unwrap(),
        MatchOutcome::Skipped
    );

    let stored = db.find_match(MatchId::new(3)).unwrap().unwrap();
    assert_eq!(stored.teams[0].games[0], Some(11));
    assert_eq!(db.stats().unwrap().teams, 2);
}

#[test]
fn test_same_player_in_two_matches_is_one_row() {
    let mut db = create_test_db();
    let mut reconciler = Reconciler::new(&mut db);
    let report = reconciler.reconcile_matches(&[
        match_payload(10, [1, 2], [3, 4], 11),
        match_payload(11, [1, 5], [3, 6], 11),
    ]);

    assert_eq!(report.inserted, 2);
    assert_eq!(report.thin_players, 6);
    assert_eq!(db.stats().unwrap().players, 6);
}

#[test]
fn test_bad_record_does_not_abort_page() {
    let mut db = create_test_db();
    let mut reconciler = Reconciler::new(&mut db);

    let mut broken = match_payload(21, [1, 2], [3, 4], 11);
    broken["eventDate"] = json!("not a date");
    let report = reconciler.reconcile_matches(&[
        match_payload(20, [1, 2], [3, 4], 11),
        broken,
        match_payload(22, [1, 2], [3, 4], 11),
        match_payload(20, [1, 2], [3, 4], 11),
    ]);

    assert_eq!(report.inserted, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.total(), 4);
    assert!(db.find_match(MatchId::new(21)).unwrap().is_none());
    assert!(db.find_match(MatchId::new(22)).unwrap().is_some());
}

#[test]
fn test_player_page_report() {
    let mut db = create_test_db();
    let mut reconciler = Reconciler::new(&mut db);
    reconciler
        .reconcile_player(&player_payload(1, "Existing", "3.0"))
        .unwrap();

    let report = reconciler.reconcile_players(&[
        player_payload(1, "Existing", "3.0"),
        player_payload(1, "Existing Renamed", "3.0"),
        player_payload(2, "New", "NR"),
        json!({"fullName": "No id at all"}),
    ]);

    assert_eq!(
        report,
        PageReport {
            inserted: 1,
            updated: 1,
            unchanged: 1,
            skipped: 0,
            failed: 1,
            thin_players: 0,
        }
    );
    assert!(report.to_string().contains("1 failed"));
}

#[test]
fn test_thin_player_never_downgrades_full_row() {
    let mut db = create_test_db();
    let mut reconciler = Reconciler::new(&mut db);
    reconciler
        .reconcile_player(&player_payload(9, "Full Nine", "4.5"))
        .unwrap();

    let outcome = reconciler
        .apply_player(Player::thin(PlayerId::new(9), "Nine", None))
        .unwrap();
    assert_eq!(outcome, PlayerOutcome::Unchanged);

    let stored = db.find_player(PlayerId::new(9)).unwrap().unwrap();
    assert_eq!(stored.full_name, "Full Nine");
    assert!(!stored.is_thin);
}

#[test]
fn test_report_absorb() {
    let mut total = PageReport::default();
    total.absorb(PageReport {
        inserted: 2,
        failed: 1,
        ..PageReport::default()
    });
    total.absorb(PageReport {
        skipped: 3,
        thin_players: 4,
        ..PageReport::default()
    });
    assert_eq!(total.total(), 6);
    assert_eq!(total.thin_players, 4);
}

#[test]
fn test_nested_null_rating_clears_stale_flat_value() {
    let mut db = create_test_db();
    let mut reconciler = Reconciler::new(&mut db);
    reconciler
        .reconcile_player(&player_payload(6, "Sam", "3.9"))
        .unwrap();

    let outcome = reconciler
        .reconcile_player(&json!({
            "id": 6,
            "duprId": "C6",
            "fullName": "Sam",
            "gender": "MALE",
            "age": 51,
            "doubles": "3.9",
            "ratings": {"doubles": null}
        }))
        .unwrap();

    assert_eq!(outcome, PlayerOutcome::Updated);
    let stored = db.find_player(PlayerId::new(6)).unwrap().unwrap();
    assert_eq!(stored.rating.doubles, None);
}
