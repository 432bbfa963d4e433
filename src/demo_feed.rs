use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::FetchError;
use crate::leaderboard::{LeaderboardEntry, Snapshot};
use crate::scoring_fetch::{LeaderboardQuery, SnapshotSource};

const DEMO_WALLETS: usize = 40;
const BUCKET_SECS: i64 = 60;
// Slot that takes the focal wallet so the board has a "you" row.
const FOCAL_SLOT: usize = 17;

#[derive(Debug, Clone)]
struct DemoWallet {
    address: String,
    base_xp: u64,
    xp_per_bucket: u64,
    joined_bucket: i64,
}

/// Offline scoring source. XP is a pure function of wallet and time
/// bucket, so the current and the time-shifted snapshot stay consistent
/// no matter which fetch runs first.
#[derive(Debug, Clone)]
pub struct DemoFeed {
    seed: u64,
    wallets: Vec<DemoWallet>,
}

impl DemoFeed {
    pub fn new(seed: u64, now_secs: i64, focal_wallet: Option<&str>) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let now_bucket = now_secs / BUCKET_SECS;
        let wallets = (0..DEMO_WALLETS)
            .map(|idx| {
                let address = match focal_wallet {
                    Some(focal) if idx == FOCAL_SLOT => focal.to_string(),
                    _ => random_address(&mut rng),
                };
                // Roughly one in six wallets showed up in the last half day.
                let joined_bucket = if rng.gen_bool(0.15) {
                    now_bucket - rng.gen_range(0..600)
                } else {
                    now_bucket - 30 * 24 * 60
                };
                DemoWallet {
                    address,
                    base_xp: rng.gen_range(100..5_000),
                    xp_per_bucket: rng.gen_range(0..=6),
                    joined_bucket,
                }
            })
            .collect();
        Self { seed, wallets }
    }

    pub fn snapshot_at(&self, at_secs: i64) -> Snapshot {
        let bucket = at_secs / BUCKET_SECS;
        let mut rng = StdRng::seed_from_u64(self.seed ^ bucket as u64);
        let mut rows = self
            .wallets
            .iter()
            .filter(|w| w.joined_bucket <= bucket)
            .map(|w| {
                let active = (bucket - w.joined_bucket).max(0) as u64;
                let jitter = rng.gen_range(0..25);
                let xp = w.base_xp + w.xp_per_bucket * active.min(24 * 60) + jitter;
                (xp, w.address.clone())
            })
            .collect::<Vec<_>>();
        rows.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        rows.into_iter()
            .map(|(xp, address)| LeaderboardEntry::new(address, xp.to_string()))
            .collect()
    }
}

impl SnapshotSource for DemoFeed {
    fn fetch_snapshot(&self, query: &LeaderboardQuery) -> Result<Snapshot, FetchError> {
        let at = query.end.unwrap_or_else(|| Utc::now().timestamp());
        Ok(self.snapshot_at(at))
    }
}

fn random_address(rng: &mut impl Rng) -> String {
    let mut out = String::from("0x");
    for _ in 0..40 {
        let nibble = rng.gen_range(0..16u8);
        out.push(char::from_digit(nibble as u32, 16).unwrap_or('0'));
    }
    out
}
