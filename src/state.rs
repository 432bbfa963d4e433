use std::collections::{HashMap, HashSet, VecDeque};

use chrono::{DateTime, Local};

use crate::handles::truncate_address;
use crate::leaderboard::{LeaderboardEntry, Snapshot, participant_key, position_of};
use crate::window::{WindowParams, select, window_range};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardView {
    /// First load still in flight.
    Loading,
    /// Refresh failed and nothing has loaded yet.
    Error,
    /// A focal wallet is set but has no entry.
    NoPoints,
    Empty,
    Board,
}

#[derive(Debug, Clone)]
pub enum Delta {
    LeaderboardLoaded { generation: u64, entries: Snapshot },
    LeaderboardFailed { generation: u64, error: String },
    /// `resolved` is false when the lookup degraded and should be retried.
    SetHandle {
        participant_id: String,
        handle: String,
        resolved: bool,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    Refresh { generation: u64 },
    ResolveHandles { participant_ids: Vec<String> },
}

#[derive(Debug)]
pub struct AppState {
    pub entries: Snapshot,
    pub focal_wallet: Option<String>,
    pub window: WindowParams,
    /// Resolved display handles keyed by `participant_key`.
    pub handles: HashMap<String, String>,
    handle_requested: HashSet<String>,
    handle_retry: HashSet<String>,
    latest_generation: u64,
    pub refreshing: bool,
    pub loaded: bool,
    pub last_error: Option<String>,
    pub last_updated: Option<DateTime<Local>>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(focal_wallet: Option<String>, window: WindowParams) -> Self {
        Self {
            entries: Vec::new(),
            focal_wallet,
            window,
            handles: HashMap::new(),
            handle_requested: HashSet::new(),
            handle_retry: HashSet::new(),
            latest_generation: 0,
            refreshing: false,
            loaded: false,
            last_error: None,
            last_updated: None,
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    /// Issues the tag for a new refresh. Results carrying any older tag
    /// are discarded by `apply_delta`.
    pub fn begin_refresh(&mut self) -> u64 {
        self.latest_generation += 1;
        self.refreshing = true;
        self.latest_generation
    }

    pub fn latest_generation(&self) -> u64 {
        self.latest_generation
    }

    pub fn view(&self) -> BoardView {
        if !self.loaded {
            if self.last_error.is_some() {
                return BoardView::Error;
            }
            return BoardView::Loading;
        }
        if let Some(focal) = self.focal_wallet.as_deref()
            && position_of(&self.entries, focal).is_none()
        {
            return BoardView::NoPoints;
        }
        if self.entries.is_empty() {
            return BoardView::Empty;
        }
        BoardView::Board
    }

    /// Rows to draw, recomputed from the current entries every call.
    pub fn visible_entries(&self) -> &[LeaderboardEntry] {
        select(&self.entries, self.focal_wallet.as_deref(), self.window)
    }

    /// 1-based rank of the first visible row.
    pub fn visible_first_rank(&self) -> usize {
        let (start, _) = window_range(&self.entries, self.focal_wallet.as_deref(), self.window);
        start + 1
    }

    pub fn focal_rank(&self) -> Option<usize> {
        let focal = self.focal_wallet.as_deref()?;
        position_of(&self.entries, focal).map(|idx| idx + 1)
    }

    pub fn is_focal(&self, entry: &LeaderboardEntry) -> bool {
        self.focal_wallet
            .as_deref()
            .is_some_and(|focal| entry.is_participant(focal))
    }

    pub fn display_handle(&self, entry: &LeaderboardEntry) -> String {
        self.handles
            .get(&participant_key(&entry.participant_id))
            .cloned()
            .unwrap_or_else(|| truncate_address(&entry.participant_id))
    }

    /// Visible participants whose handle has not been asked for yet.
    /// Each id is handed out once per load; degraded lookups are handed out
    /// again after the next fresh leaderboard. Empty unless the board is shown.
    pub fn take_unrequested_handles(&mut self) -> Vec<String> {
        if self.view() != BoardView::Board {
            return Vec::new();
        }
        let ids = self
            .visible_entries()
            .iter()
            .map(|entry| entry.participant_id.clone())
            .collect::<Vec<_>>();
        ids.into_iter()
            .filter(|id| self.handle_requested.insert(participant_key(id)))
            .collect()
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::LeaderboardLoaded {
            generation,
            entries,
        } => {
            if generation != state.latest_generation {
                state.push_log(format!(
                    "[INFO] Dropped stale leaderboard (#{generation}, latest #{})",
                    state.latest_generation
                ));
                return;
            }
            state.push_log(format!(
                "[INFO] Leaderboard loaded: {} entries",
                entries.len()
            ));
            state.entries = entries;
            for key in state.handle_retry.drain() {
                state.handle_requested.remove(&key);
            }
            state.loaded = true;
            state.refreshing = false;
            state.last_error = None;
            state.last_updated = Some(Local::now());
        }
        Delta::LeaderboardFailed { generation, error } => {
            if generation != state.latest_generation {
                state.push_log(format!(
                    "[INFO] Dropped stale refresh error (#{generation}): {error}"
                ));
                return;
            }
            // Previously loaded entries stay in place.
            state.push_log(format!("[WARN] Leaderboard fetch error: {error}"));
            state.refreshing = false;
            state.last_error = Some(error);
        }
        Delta::SetHandle {
            participant_id,
            handle,
            resolved,
        } => {
            let key = participant_key(&participant_id);
            if resolved {
                state.handle_retry.remove(&key);
            } else {
                state.handle_retry.insert(key.clone());
            }
            state.handles.insert(key, handle);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
