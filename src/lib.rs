pub mod config;
pub mod demo_feed;
pub mod error;
pub mod handles;
pub mod http_client;
pub mod leaderboard;
pub mod provider;
pub mod rank_delta;
pub mod scoring_fetch;
pub mod state;
pub mod window;
