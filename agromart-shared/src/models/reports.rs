use serde::{Deserialize, Serialize};

/// Outcome of one scan-and-warn invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Products that reached the end of their fan-out and were marked warned.
    pub products: usize,
    /// Messages the gateway accepted.
    pub sent: usize,
    /// Attempts rejected locally or by the gateway.
    pub failed: usize,
    /// Recipients dropped before dispatch because their phone was unusable.
    pub skipped_recipients: usize,
}

impl ScanReport {
    pub fn attempts(&self) -> usize {
        self.sent + self.failed
    }
}

/// Outcome of one sweep-expired invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub expired: usize,
}
