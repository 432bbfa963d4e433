use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use chrono::Utc;

use crate::config::{Config, SourceKind};
use crate::demo_feed::DemoFeed;
use crate::error::HandleLookupError;
use crate::handles::{HandleSource, handle_source_from_config, resolve_handle, truncate_address};
use crate::scoring_fetch::{LeaderboardQuery, ScoringService, SnapshotSource, fetch_with_changes};
use crate::state::{Delta, ProviderCommand};

/// Runs fetches off the UI thread. Every refresh and every handle lookup
/// is its own job, so a slow row never holds up the board or its siblings.
pub fn spawn_provider(config: Config, tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let scores = snapshot_source_from_config(&config, &tx);
        let handles: Option<Arc<dyn HandleSource>> = match handle_source_from_config(&config) {
            Ok(source) => Some(Arc::from(source)),
            Err(err) => {
                let _ = tx.send(Delta::Log(format!(
                    "[INFO] Handle lookup disabled ({err}); showing short wallets"
                )));
                None
            }
        };
        let query = LeaderboardQuery::new(config.chain.clone(), config.app_id.clone());
        let compare_hours = config.compare_hours;

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::Refresh { generation } => {
                    let scores = Arc::clone(&scores);
                    let query = query.clone();
                    let tx = tx.clone();
                    rayon::spawn(move || {
                        let now = Utc::now().timestamp();
                        let delta = match fetch_with_changes(
                            scores.as_ref(),
                            &query,
                            now,
                            compare_hours,
                        ) {
                            Ok(entries) => Delta::LeaderboardLoaded {
                                generation,
                                entries,
                            },
                            Err(err) => Delta::LeaderboardFailed {
                                generation,
                                error: err.to_string(),
                            },
                        };
                        let _ = tx.send(delta);
                    });
                }
                ProviderCommand::ResolveHandles { participant_ids } => {
                    for participant_id in participant_ids {
                        let handles = handles.clone();
                        let tx = tx.clone();
                        rayon::spawn(move || {
                            let resolution = resolve_handle(handles.as_deref(), &participant_id);
                            let resolved = match &resolution.degraded {
                                // Already announced once at startup; retrying cannot help.
                                None | Some(HandleLookupError::MissingConfig(_)) => true,
                                Some(err) => {
                                    let _ = tx.send(Delta::Log(format!(
                                        "[WARN] Handle lookup for {}: {err}",
                                        truncate_address(&participant_id)
                                    )));
                                    false
                                }
                            };
                            let _ = tx.send(Delta::SetHandle {
                                participant_id,
                                handle: resolution.handle,
                                resolved,
                            });
                        });
                    }
                }
            }
        }
    });
}

fn snapshot_source_from_config(config: &Config, tx: &Sender<Delta>) -> Arc<dyn SnapshotSource> {
    match config.source {
        SourceKind::Demo => {
            let _ = tx.send(Delta::Log(
                "[INFO] Using demo leaderboard source".to_string(),
            ));
            let now = Utc::now().timestamp();
            Arc::new(DemoFeed::new(
                now as u64,
                now,
                config.focal_wallet.as_deref(),
            ))
        }
        SourceKind::Live => {
            if config.api_key.is_none() {
                let _ = tx.send(Delta::Log(
                    "[WARN] OPENFORMAT_API_KEY not set; requests go out without a key".to_string(),
                ));
            }
            Arc::new(ScoringService::new(
                config.api_base.clone(),
                config.api_key.clone(),
            ))
        }
    }
}
