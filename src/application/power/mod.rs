pub mod engine;
pub mod leaderboard;
pub mod reporting;
pub mod workload;

pub use engine::{MAX_DURATION_SECS, PowerConfig, PowerMeter, StressTestRequest};
pub use leaderboard::{LeaderboardEntry, LeaderboardView};
