use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, Utc};

use crate::product::OfferTerms;

/// Where an offer window sits relative to a point in time.
///
/// `Active` and `ExpiringSoon` say nothing about the `warning_sent` overlay;
/// `Expired` covers both swept windows and lapsed ones still awaiting a sweep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferPhase {
    NoOffer,
    Active,
    ExpiringSoon,
    Expired,
}

impl OfferTerms {
    pub fn phase(&self, now: DateTime<Utc>, warn_horizon: Duration) -> OfferPhase {
        if self.expired {
            return OfferPhase::Expired;
        }
        let end = match self.window_end {
            Some(end) if self.has_discount() => end,
            _ => return OfferPhase::NoOffer,
        };

        if end < now {
            OfferPhase::Expired
        } else if end <= now + warn_horizon {
            OfferPhase::ExpiringSoon
        } else {
            OfferPhase::Active
        }
    }

    /// Eligible for the one-time expiry warning.
    pub fn needs_warning(&self, now: DateTime<Utc>, warn_horizon: Duration) -> bool {
        !self.warning_sent && self.phase(now, warn_horizon) == OfferPhase::ExpiringSoon
    }

    /// Window has lapsed but the discount has not been cleared yet.
    pub fn needs_sweep(&self, now: DateTime<Utc>) -> bool {
        !self.expired && self.has_discount() && self.window_end.map_or(false, |end| end < now)
    }

    /// Time remaining until the window closes, never negative.
    pub fn time_left(&self, now: DateTime<Utc>) -> Duration {
        self.window_end
            .map(|end| end - now)
            .filter(|left| *left > Duration::zero())
            .unwrap_or_else(Duration::zero)
    }
}
