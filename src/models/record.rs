use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::action::{Confidence, SwipeAction};

/// One swipe, as written to the remote log or the local ring buffer.
/// Timestamped when the user acted, not when the write lands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwipeRecord {
    pub symbol: String,
    pub action: SwipeAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
    pub timestamp: DateTime<Utc>,
}

impl SwipeRecord {
    pub fn new(symbol: &str, action: SwipeAction, confidence: Option<Confidence>) -> Self {
        Self::at(symbol, action, confidence, Utc::now())
    }

    /// A confidence attached to anything but a queue swipe is dropped.
    pub fn at(
        symbol: &str,
        action: SwipeAction,
        confidence: Option<Confidence>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            action,
            confidence: confidence.filter(|_| action.accepts_confidence()),
            timestamp,
        }
    }
}
