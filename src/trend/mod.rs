//! Trend mathematics: per-series deltas, gate history, the overall verdict
//! and recommendations.

pub mod compute;
pub mod gate;
pub mod recommend;
pub mod verdict;

pub use compute::{compute, velocity, Direction, TrendResult, Velocity, MIN_MEANINGFUL_CHANGE};
pub use gate::{gate_history, GateHistory};
pub use recommend::{recommend, Priority, Recommendation};
pub use verdict::overall_verdict;
