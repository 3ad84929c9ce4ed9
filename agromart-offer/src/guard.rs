use std::sync::atomic::{AtomicBool, Ordering};

/// Allows at most one in-flight run of a job inside this process.
#[derive(Debug, Default)]
pub struct SingleFlight {
    busy: AtomicBool,
}

/// Held for the duration of a run; dropping it frees the slot.
#[derive(Debug)]
pub struct FlightGuard<'a> {
    busy: &'a AtomicBool,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` if another run holds the slot.
    pub fn try_enter(&self) -> Option<FlightGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard { busy: &self.busy })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_flight() {
        let flight = SingleFlight::new();

        let guard = flight.try_enter();
        assert!(guard.is_some());
        assert!(flight.is_busy());
        assert!(flight.try_enter().is_none());

        drop(guard);
        assert!(!flight.is_busy());
        assert!(flight.try_enter().is_some());
    }
}
