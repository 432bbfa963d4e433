use xp_terminal::leaderboard::{LeaderboardEntry, RankDelta};
use xp_terminal::rank_delta::merge;

fn entry(id: &str, xp: &str) -> LeaderboardEntry {
    LeaderboardEntry::new(id, xp)
}

fn deltas(entries: &[LeaderboardEntry]) -> Vec<(String, Option<RankDelta>)> {
    entries
        .iter()
        .map(|e| (e.participant_id.clone(), e.rank_delta))
        .collect()
}

#[test]
fn swapped_and_new_participants() {
    let current = vec![entry("A", "100"), entry("B", "90"), entry("C", "80")];
    let previous = vec![entry("B", "90"), entry("A", "100")];

    let merged = merge(&current, &previous);
    assert_eq!(
        deltas(&merged),
        vec![
            ("A".to_string(), Some(RankDelta::Moved(1))),
            ("B".to_string(), Some(RankDelta::Moved(-1))),
            ("C".to_string(), Some(RankDelta::New)),
        ]
    );
}

#[test]
fn snapshot_against_itself_has_no_movement() {
    let snap = (0..25)
        .map(|i| entry(&format!("0x{i:040x}"), &(1000 - i).to_string()))
        .collect::<Vec<_>>();
    let merged = merge(&snap, &snap);
    assert_eq!(merged.len(), snap.len());
    assert!(
        merged
            .iter()
            .all(|e| e.rank_delta == Some(RankDelta::Moved(0)))
    );
}

#[test]
fn lookup_ignores_case() {
    let current = vec![entry("0xABCDEF", "10")];
    let previous = vec![entry("0x000001", "50"), entry("0xabcdef", "5")];
    let merged = merge(&current, &previous);
    assert_eq!(merged[0].rank_delta, Some(RankDelta::Moved(1)));
}

#[test]
fn duplicate_previous_ids_use_first_match() {
    let current = vec![entry("x", "1"), entry("y", "1"), entry("z", "1")];
    let previous = vec![entry("z", "9"), entry("y", "8"), entry("z", "7")];
    let merged = merge(&current, &previous);
    assert_eq!(merged[2].rank_delta, Some(RankDelta::Moved(-2)));
    assert_eq!(merged[0].rank_delta, Some(RankDelta::New));
}

#[test]
fn merge_leaves_inputs_untouched() {
    let current = vec![entry("A", "100"), entry("B", "90")];
    let previous = vec![entry("B", "90")];
    let before = current.clone();
    let merged = merge(&current, &previous);
    assert_eq!(current, before);
    assert!(current.iter().all(|e| e.rank_delta.is_none()));
    assert_eq!(merged[0].score, "100");
    assert_eq!(merged[1].participant_id, "B");
}

#[test]
fn empty_previous_marks_everyone_new() {
    let current = vec![entry("A", "3"), entry("B", "2")];
    let merged = merge(&current, &[]);
    assert!(merged.iter().all(|e| e.rank_delta == Some(RankDelta::New)));
    assert!(merge(&[], &current).is_empty());
}
