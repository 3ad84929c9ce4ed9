use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use agromart_core::{MessagingGateway, PhoneNumber, SendOutcome};

/// Serializes gateway calls with a fixed minimum gap between them.
///
/// The gap runs from the end of one call to the start of the next, so a slow
/// provider response never lets two calls land closer than `interval`.
pub struct PacedSender {
    gateway: Arc<dyn MessagingGateway>,
    interval: Duration,
    last_send: Option<Instant>,
}

impl PacedSender {
    pub fn new(gateway: Arc<dyn MessagingGateway>, interval: Duration) -> Self {
        Self {
            gateway,
            interval,
            last_send: None,
        }
    }

    pub async fn send(&mut self, to: &PhoneNumber, body: &str) -> SendOutcome {
        if let Some(last) = self.last_send {
            sleep_until(last + self.interval).await;
        }
        let outcome = self.gateway.send(to, body).await;
        self.last_send = Some(Instant::now());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StampingGateway {
        stamps: Mutex<Vec<Instant>>,
    }

    #[async_trait]
    impl MessagingGateway for StampingGateway {
        async fn send(&self, _to: &PhoneNumber, _body: &str) -> SendOutcome {
            self.stamps.lock().unwrap().push(Instant::now());
            SendOutcome::delivered()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sends_are_spaced() {
        let gateway = Arc::new(StampingGateway::default());
        let mut sender = PacedSender::new(gateway.clone(), Duration::from_millis(1100));
        let phone = PhoneNumber::normalize("9876543210", "91").unwrap();

        for _ in 0..3 {
            assert!(sender.send(&phone, "hello").await.success);
        }

        let stamps = gateway.stamps.lock().unwrap();
        assert_eq!(stamps.len(), 3);
        for pair in stamps.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(1100));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_send_is_immediate() {
        let gateway = Arc::new(StampingGateway::default());
        let mut sender = PacedSender::new(gateway.clone(), Duration::from_secs(5));
        let phone = PhoneNumber::normalize("9876543210", "91").unwrap();

        let start = Instant::now();
        sender.send(&phone, "hello").await;
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
