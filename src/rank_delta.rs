use crate::leaderboard::{LeaderboardEntry, RankDelta, Snapshot, position_of};

/// Tags every entry of `current` with its movement since `previous`.
///
/// A participant found at previous index `j` and current index `i` gets
/// `Moved(j - i)`, so climbing the table is positive. Participants missing
/// from `previous` are `New`. Duplicate ids in `previous` resolve to the
/// first one in scan order. Neither input is modified.
pub fn merge(current: &[LeaderboardEntry], previous: &[LeaderboardEntry]) -> Snapshot {
    current
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let rank_delta = match position_of(previous, &entry.participant_id) {
                Some(prev_idx) => RankDelta::Moved(prev_idx as i64 - idx as i64),
                None => RankDelta::New,
            };
            LeaderboardEntry {
                rank_delta: Some(rank_delta),
                ..entry.clone()
            }
        })
        .collect()
}
