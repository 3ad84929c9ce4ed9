use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::phone::PhoneNumber;

/// Result of a single gateway call. Failures are data, not errors: a bad
/// number or a provider rejection must never abort the caller's loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOutcome {
    pub success: bool,
    pub error: Option<String>,
}

impl SendOutcome {
    pub fn delivered() -> Self {
        Self { success: true, error: None }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(reason.into()),
        }
    }
}

/// Outbound SMS provider.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn send(&self, to: &PhoneNumber, body: &str) -> SendOutcome;
}
