use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Ranked list of entries. Index 0 is rank 1; rank is never stored.
pub type Snapshot = Vec<LeaderboardEntry>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(rename = "user")]
    pub participant_id: String,
    // Kept as text so upstream precision survives untouched.
    #[serde(rename = "xp_rewarded", deserialize_with = "score_text")]
    pub score: String,
    #[serde(skip)]
    pub rank_delta: Option<RankDelta>,
}

impl LeaderboardEntry {
    pub fn new(participant_id: impl Into<String>, score: impl Into<String>) -> Self {
        Self {
            participant_id: participant_id.into(),
            score: score.into(),
            rank_delta: None,
        }
    }

    pub fn is_participant(&self, id: &str) -> bool {
        same_participant(&self.participant_id, id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankDelta {
    /// No rank in the previous snapshot.
    New,
    /// Positions gained (positive) or lost (negative).
    Moved(i64),
}

impl fmt::Display for RankDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankDelta::New => f.write_str("NEW"),
            RankDelta::Moved(0) => f.write_str("–"),
            RankDelta::Moved(d) if *d > 0 => write!(f, "▲{d}"),
            RankDelta::Moved(d) => write!(f, "▼{}", d.unsigned_abs()),
        }
    }
}

/// Participant equality used everywhere ids are compared (merge, window,
/// "is this me" checks). Wallet addresses differ only by checksum casing.
pub fn same_participant(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Map key consistent with `same_participant`.
pub fn participant_key(id: &str) -> String {
    id.to_ascii_lowercase()
}

/// 0-based position of `id` in `ranked`, first match wins.
pub fn position_of(ranked: &[LeaderboardEntry], id: &str) -> Option<usize> {
    ranked.iter().position(|entry| entry.is_participant(id))
}

pub fn contains_participant(ranked: &[LeaderboardEntry], id: &str) -> bool {
    position_of(ranked, id).is_some()
}

pub fn participant_count_label(count: usize) -> String {
    if count == 1 {
        "1 Participant".to_string()
    } else {
        format!("{count} Participants")
    }
}

fn score_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok("0".to_string()),
        other => Err(serde::de::Error::custom(format!(
            "xp_rewarded must be text or number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_badges() {
        assert_eq!(RankDelta::New.to_string(), "NEW");
        assert_eq!(RankDelta::Moved(0).to_string(), "–");
        assert_eq!(RankDelta::Moved(3).to_string(), "▲3");
        assert_eq!(RankDelta::Moved(-2).to_string(), "▼2");
    }

    #[test]
    fn participant_match_ignores_case() {
        assert!(same_participant("0xAbCd", "0xabcd"));
        assert!(!same_participant("0xabcd", "0xabce"));
    }

    #[test]
    fn numeric_score_is_kept_as_text() {
        let entry: LeaderboardEntry =
            serde_json::from_str(r#"{"user":"0x1","xp_rewarded":1500}"#).expect("entry");
        assert_eq!(entry.score, "1500");
        assert!(entry.rank_delta.is_none());
    }
}
