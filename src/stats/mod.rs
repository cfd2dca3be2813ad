//! Fight statistics and generation summaries
//!
//! Every resolved fight in a lane's run lands here. At the end of a
//! generation the fights are folded into an average summary and a best
//! summary; the best one seeds the next generation's sampler.

mod aggregator;
mod record;

pub use aggregator::{GenerationReport, StatsAggregator};
pub use record::{FightRecord, GenerationSummary, Victor, WinnerStat};
