//! Client core for a World Cup prediction pool: predicted group tables,
//! a tie-aware leaderboard, and the plumbing that feeds them.

pub mod api_client;
pub mod config;
pub mod demo_feed;
pub mod feed;
pub mod leaderboard;
pub mod ordering;
pub mod prediction;
pub mod session;
pub mod source;
pub mod standings;
pub mod state;
pub mod telemetry;
pub mod wire;
