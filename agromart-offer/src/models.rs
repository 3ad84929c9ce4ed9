use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use agromart_core::DEFAULT_COUNTRY_CODE;

/// The two scheduled lifecycle jobs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    ScanAndWarn,
    SweepExpired,
}

impl JobKind {
    pub const ALL: [JobKind; 2] = [JobKind::ScanAndWarn, JobKind::SweepExpired];

    /// Short name used in lock keys and URLs.
    pub fn slug(&self) -> &'static str {
        match self {
            JobKind::ScanAndWarn => "scan",
            JobKind::SweepExpired => "sweep",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|job| job.slug() == slug)
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::ScanAndWarn => f.write_str("scan-and-warn"),
            JobKind::SweepExpired => f.write_str("sweep-expired"),
        }
    }
}

/// Tunables for [`crate::OfferMonitor`]
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Lookahead before `window_end` in which the one-time warning fires.
    pub warn_horizon: chrono::Duration,
    /// Minimum gap between two gateway calls.
    pub send_interval: Duration,
    pub default_country_code: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            warn_horizon: chrono::Duration::hours(1),
            send_interval: Duration::from_millis(1100),
            default_country_code: DEFAULT_COUNTRY_CODE.to_string(),
        }
    }
}
