pub mod client;
pub mod manager;
pub mod portfolio;

pub use client::{CandidateBatch, DataSource, SwipeClient, WriteOutcome, MAX_REMOTE_OVERFETCH};
pub use manager::{SessionOptions, SessionState, SwipeSession, DEFAULT_PRELOAD_COUNT};
pub use portfolio::{PortfolioCache, PORTFOLIO_CACHE_KEY};
