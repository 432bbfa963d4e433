use std::env;
use std::time::Duration;

use crate::window::WindowParams;

pub const DEFAULT_API_BASE: &str = "https://api.openformat.tech/v1";
pub const DEFAULT_CHAIN: &str = "arbitrum-sepolia";
const DEFAULT_POLL_SECS: u64 = 60;
const DEFAULT_COMPARE_HOURS: i64 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Live,
    Demo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base: String,
    pub api_key: Option<String>,
    pub app_id: String,
    pub chain: String,
    pub source: SourceKind,
    pub poll_interval: Duration,
    pub compare_hours: i64,
    pub window: WindowParams,
    pub handle_lookup_url: Option<String>,
    pub privy_app_id: Option<String>,
    pub privy_app_secret: Option<String>,
    pub focal_wallet: Option<String>,
}

impl Config {
    /// Reads the process environment; `--wallet` on the command line wins
    /// over `FOCAL_WALLET`.
    pub fn from_env() -> Self {
        let args = env::args().skip(1).collect::<Vec<_>>();
        let mut config = Self::from_lookup(|key| env::var(key).ok());
        if let Some(wallet) = parse_wallet_arg(&args) {
            config.focal_wallet = Some(wallet);
        }
        config
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let opt = |key: &str| {
            lookup(key).and_then(|val| {
                let trimmed = val.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
        };

        let source = match opt("LEADERBOARD_SOURCE")
            .map(|val| val.to_lowercase())
            .as_deref()
        {
            Some("demo") => SourceKind::Demo,
            _ => SourceKind::Live,
        };
        let poll_secs = opt("LEADERBOARD_POLL_SECS")
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_POLL_SECS)
            .max(10);
        let compare_hours = opt("LEADERBOARD_COMPARE_HOURS")
            .and_then(|val| val.parse::<i64>().ok())
            .unwrap_or(DEFAULT_COMPARE_HOURS)
            .clamp(1, 168);
        let window = opt("LEADERBOARD_WINDOW")
            .and_then(|val| val.parse::<usize>().ok())
            .map(|size| WindowParams::centered(size.clamp(1, 51)))
            .unwrap_or_default();

        Self {
            api_base: opt("LEADERBOARD_API_BASE")
                .map(|val| val.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            api_key: opt("OPENFORMAT_API_KEY"),
            app_id: opt("OPENFORMAT_DAPP_ID").unwrap_or_default(),
            chain: opt("LEADERBOARD_CHAIN").unwrap_or_else(|| DEFAULT_CHAIN.to_string()),
            source,
            poll_interval: Duration::from_secs(poll_secs),
            compare_hours,
            window,
            handle_lookup_url: opt("HANDLE_LOOKUP_URL")
                .map(|val| val.trim_end_matches('/').to_string()),
            privy_app_id: opt("PRIVY_APP_ID"),
            privy_app_secret: opt("PRIVY_APP_SECRET"),
            focal_wallet: opt("FOCAL_WALLET"),
        }
    }
}

fn parse_wallet_arg(args: &[String]) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix("--wallet=") {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == "--wallet"
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
