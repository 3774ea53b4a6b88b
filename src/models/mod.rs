pub mod action;
pub mod candidate;
pub mod filters;
pub mod record;

pub use action::{Confidence, SwipeAction};
pub use candidate::{normalize_symbol, Holding, Returns, RiskTier, SwipeCandidate, WatchlistEntry};
pub use filters::{FilterCriteria, MarketCapBucket, PeBucket, PerformanceBucket};
pub use record::SwipeRecord;
