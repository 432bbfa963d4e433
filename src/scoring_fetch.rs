use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use crate::error::FetchError;
use crate::http_client::http_client;
use crate::leaderboard::{LeaderboardEntry, Snapshot};
use crate::rank_delta::merge;

const API_KEY_HEADER: &str = "X-API-KEY";
const ERROR_BODY_MAX: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardQuery {
    pub chain: String,
    pub app_id: String,
    /// Unix seconds; omitted from the request when `None`.
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl LeaderboardQuery {
    pub fn new(chain: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            chain: chain.into(),
            app_id: app_id.into(),
            start: None,
            end: None,
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("chain", self.chain.clone()),
            ("app_id", self.app_id.clone()),
        ];
        if let Some(start) = self.start {
            pairs.push(("start", start.to_string()));
        }
        if let Some(end) = self.end {
            pairs.push(("end", end.to_string()));
        }
        pairs
    }

    /// Same range, cut off `hours` before `now_secs`.
    pub fn ending_hours_before(&self, now_secs: i64, hours: i64) -> Self {
        Self {
            end: Some(now_secs - hours * 60 * 60),
            ..self.clone()
        }
    }
}

/// Anything that can produce a ranked snapshot, best first.
pub trait SnapshotSource: Send + Sync {
    fn fetch_snapshot(&self, query: &LeaderboardQuery) -> Result<Snapshot, FetchError>;
}

/// The hosted scoring service (or a pass-through proxy in front of it).
#[derive(Debug, Clone)]
pub struct ScoringService {
    base_url: String,
    api_key: Option<String>,
}

impl ScoringService {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
        }
    }

    pub fn leaderboard_url(&self) -> String {
        format!("{}/leaderboard", self.base_url.trim_end_matches('/'))
    }
}

impl SnapshotSource for ScoringService {
    fn fetch_snapshot(&self, query: &LeaderboardQuery) -> Result<Snapshot, FetchError> {
        let client = http_client()?;

        let mut req = client
            .get(self.leaderboard_url())
            .query(&query.query_pairs())
            .header(CONTENT_TYPE, "application/json");
        // A pass-through proxy holds the key server side.
        if let Some(api_key) = self.api_key.as_deref() {
            req = req.header(API_KEY_HEADER, api_key);
        }
        let resp = req.send()?;
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }
        parse_leaderboard_json(&body)
    }
}

/// Accepts `{"status":"success","data":[...]}` or a bare array of
/// `{user, xp_rewarded}` rows. Order is preserved as the ranking.
pub fn parse_leaderboard_json(raw: &str) -> Result<Snapshot, FetchError> {
    let root: Value = serde_json::from_str(raw.trim())
        .map_err(|err| FetchError::payload(format!("not json: {err}")))?;

    let rows = match root {
        Value::Array(rows) => rows,
        Value::Object(mut obj) => {
            let status = obj
                .get("status")
                .and_then(Value::as_str)
                .map(str::to_string);
            if status.as_deref() != Some("success") {
                return Err(FetchError::payload(format!(
                    "unexpected status {}",
                    status.as_deref().unwrap_or("<none>")
                )));
            }
            match obj.remove("data") {
                Some(Value::Array(rows)) => rows,
                Some(_) => return Err(FetchError::payload("data is not an array")),
                None => return Err(FetchError::payload("missing data")),
            }
        }
        _ => return Err(FetchError::payload("expected object or array")),
    };

    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| {
            serde_json::from_value::<LeaderboardEntry>(row)
                .map_err(|err| FetchError::payload(format!("row {idx}: {err}")))
        })
        .collect()
}

/// Fetches the current and the time-shifted snapshot side by side and
/// merges them. Both must succeed; a partial pair is never merged.
pub fn fetch_with_changes(
    source: &dyn SnapshotSource,
    query: &LeaderboardQuery,
    now_secs: i64,
    compare_hours: i64,
) -> Result<Snapshot, FetchError> {
    let previous_query = query.ending_hours_before(now_secs, compare_hours);
    let (current, previous) = rayon::join(
        || source.fetch_snapshot(query),
        || source.fetch_snapshot(&previous_query),
    );
    let current = current?;
    let previous = previous?;
    Ok(merge(&current, &previous))
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(ERROR_BODY_MAX) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
