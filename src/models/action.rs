use serde::{Deserialize, Serialize};
use std::fmt;

/// What the user did with the card in front of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeAction {
    /// Swipe left: not interested.
    #[serde(alias = "left")]
    Skip,
    /// Swipe right: add to the buy queue.
    #[serde(alias = "right")]
    Queue,
    /// Save to the watchlist for later.
    #[serde(alias = "watchlist")]
    Save,
}

impl SwipeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeAction::Skip => "skip",
            SwipeAction::Queue => "queue",
            SwipeAction::Save => "save",
        }
    }

    /// Only buy-intent swipes carry a confidence tier.
    pub fn accepts_confidence(&self) -> bool {
        match self {
            SwipeAction::Queue => true,
            SwipeAction::Skip | SwipeAction::Save => false,
        }
    }

    pub fn from_str_loose(s: &str) -> Option<SwipeAction> {
        match s.trim().to_lowercase().as_str() {
            "skip" | "left" | "l" => Some(SwipeAction::Skip),
            "queue" | "right" | "r" | "buy" => Some(SwipeAction::Queue),
            "save" | "watchlist" | "s" => Some(SwipeAction::Save),
            _ => None,
        }
    }
}

impl fmt::Display for SwipeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Confidence {
    Conservative,
    Bullish,
    VeryBullish,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Conservative => "conservative",
            Confidence::Bullish => "bullish",
            Confidence::VeryBullish => "very-bullish",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Confidence> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "conservative" => Some(Confidence::Conservative),
            "bullish" => Some(Confidence::Bullish),
            "very-bullish" | "verybullish" => Some(Confidence::VeryBullish),
            _ => None,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
