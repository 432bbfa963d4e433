mod common;

use common::serve;
use xp_terminal::error::FetchError;
use xp_terminal::leaderboard::RankDelta;
use xp_terminal::scoring_fetch::{
    LeaderboardQuery, ScoringService, SnapshotSource, fetch_with_changes,
};

#[test]
fn server_error_is_fetch_error() {
    let (base, _rx) = serve(vec![(500, r#"{"error":"boom"}"#.to_string())]);
    let service = ScoringService::new(base, Some("key".to_string()));
    let err = service
        .fetch_snapshot(&LeaderboardQuery::new("arbitrum-sepolia", "app"))
        .expect_err("500 must fail");
    match err {
        FetchError::Status { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("boom"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn request_carries_key_and_params() {
    let body = r#"{"status":"success","data":[{"user":"0xA","xp_rewarded":"5"}]}"#;
    let (base, rx) = serve(vec![(200, body.to_string())]);
    let service = ScoringService::new(base, Some("secret-key".to_string()));
    let mut query = LeaderboardQuery::new("arbitrum-sepolia", "dapp-1");
    query.end = Some(1_700_000_000);

    let snap = service.fetch_snapshot(&query).expect("fetch ok");
    assert_eq!(snap.len(), 1);

    let head = rx.recv().expect("request head").to_ascii_lowercase();
    assert!(head.starts_with("get /leaderboard?"));
    assert!(head.contains("chain=arbitrum-sepolia"));
    assert!(head.contains("app_id=dapp-1"));
    assert!(head.contains("end=1700000000"));
    assert!(!head.contains("start="));
    assert!(head.contains("x-api-key: secret-key"));
}

#[test]
fn proxy_without_key_is_queried_bare() {
    let body = r#"[{"user":"0xA","xp_rewarded":"5"}]"#;
    let (base, rx) = serve(vec![(200, body.to_string())]);
    let service = ScoringService::new(format!("{base}/api"), None);

    let snap = service
        .fetch_snapshot(&LeaderboardQuery::new("arbitrum-sepolia", "dapp-1"))
        .expect("proxy fetch ok");
    assert_eq!(snap.len(), 1);
    assert_eq!(snap[0].participant_id, "0xA");

    let head = rx.recv().expect("request head").to_ascii_lowercase();
    assert!(head.starts_with("get /api/leaderboard?"));
    assert!(!head.contains("x-api-key"));
}

#[test]
fn both_snapshots_are_fetched_and_merged() {
    // Both requests get the same body, so every row is unchanged.
    let body = r#"[{"user":"0xA","xp_rewarded":"9"},{"user":"0xB","xp_rewarded":"3"}]"#;
    let (base, rx) = serve(vec![(200, body.to_string()), (200, body.to_string())]);
    let service = ScoringService::new(base, Some("k".to_string()));
    let query = LeaderboardQuery::new("c", "a");

    let merged = fetch_with_changes(&service, &query, 1_000_000, 12).expect("merge ok");
    assert_eq!(merged.len(), 2);
    assert!(merged.iter().all(|e| e.rank_delta == Some(RankDelta::Moved(0))));

    let heads = [rx.recv().expect("first"), rx.recv().expect("second")];
    let with_end = heads
        .iter()
        .filter(|h| h.contains(&format!("end={}", 1_000_000 - 12 * 3600)))
        .count();
    assert_eq!(with_end, 1);
}

#[test]
fn one_failed_snapshot_fails_the_cycle() {
    let ok = r#"[{"user":"0xA","xp_rewarded":"9"}]"#.to_string();
    let (base, _rx) = serve(vec![(200, ok), (503, "down".to_string())]);
    let service = ScoringService::new(base, Some("k".to_string()));
    let result = fetch_with_changes(&service, &LeaderboardQuery::new("c", "a"), 1_000_000, 12);
    assert!(result.is_err());
}
