use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Mutex;
use tracing::{debug, info};
use agromart_core::{CoreError, CoreResult, MessagingGateway, PhoneNumber, SendOutcome};
use agromart_shared::Masked;

use crate::app_config::SmsConfig;

/// Twilio-style REST gateway. One client is built at startup and shared; it
/// is never rebuilt mid-send.
pub struct HttpSmsGateway {
    client: reqwest::Client,
    endpoint: String,
    account_sid: String,
    auth_token: Masked<String>,
    from_number: String,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: String,
}

impl HttpSmsGateway {
    pub fn new(config: &SmsConfig) -> CoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| CoreError::ValidationError(format!("SMS client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: messages_endpoint(&config.base_url, &config.account_sid),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
        })
    }
}

fn messages_endpoint(base_url: &str, account_sid: &str) -> String {
    format!("{}/Accounts/{}/Messages.json", base_url.trim_end_matches('/'), account_sid)
}

#[async_trait]
impl MessagingGateway for HttpSmsGateway {
    async fn send(&self, to: &PhoneNumber, body: &str) -> SendOutcome {
        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.account_sid, Some(self.auth_token.expose()))
            .form(&[("To", to.as_str()), ("From", self.from_number.as_str()), ("Body", body)])
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                debug!(to = %Masked(to.as_str()), "SMS accepted by provider");
                SendOutcome::delivered()
            }
            Ok(resp) => {
                let status = resp.status();
                let detail = match resp.json::<ProviderError>().await {
                    Ok(err) => match err.code {
                        Some(code) => format!("{} ({})", err.message, code),
                        None => err.message,
                    },
                    Err(_) => String::new(),
                };
                SendOutcome::failed(format!("provider returned {}: {}", status, detail))
            }
            Err(e) => SendOutcome::failed(format!("transport error: {}", e)),
        }
    }
}

/// A message captured by [`DryRunGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: String,
    pub body: String,
}

/// Logs and records messages instead of sending them.
#[derive(Default)]
pub struct DryRunGateway {
    outbox: Mutex<Vec<SentMessage>>,
}

impl DryRunGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.outbox.lock().map(|outbox| outbox.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MessagingGateway for DryRunGateway {
    async fn send(&self, to: &PhoneNumber, body: &str) -> SendOutcome {
        info!(to = %Masked(to.as_str()), body, "Dry-run SMS");
        match self.outbox.lock() {
            Ok(mut outbox) => {
                outbox.push(SentMessage {
                    to: to.to_string(),
                    body: body.to_string(),
                });
                SendOutcome::delivered()
            }
            Err(_) => SendOutcome::failed("dry-run outbox lock poisoned"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_endpoint() {
        assert_eq!(
            messages_endpoint("https://api.twilio.com/2010-04-01/", "AC123"),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[tokio::test]
    async fn test_unreachable_provider_reports_failure() {
        let config = SmsConfig {
            dry_run: false,
            base_url: "http://127.0.0.1:9".to_string(),
            account_sid: "AC123".to_string(),
            auth_token: Masked("token".to_string()),
            from_number: "+15005550006".to_string(),
            default_country_code: "91".to_string(),
            request_timeout_secs: 2,
        };
        let gateway = HttpSmsGateway::new(&config).unwrap();
        let phone = PhoneNumber::normalize("9876543210", "91").unwrap();

        let outcome = gateway.send(&phone, "hello").await;

        assert!(!outcome.success);
        assert!(outcome.error.unwrap().starts_with("transport error"));
    }

    #[tokio::test]
    async fn test_dry_run_records_messages() {
        let gateway = DryRunGateway::new();
        let phone = PhoneNumber::normalize("9876543210", "91").unwrap();

        assert!(gateway.send(&phone, "Offer ends soon").await.success);
        assert_eq!(
            gateway.sent(),
            vec![SentMessage { to: "+919876543210".to_string(), body: "Offer ends soon".to_string() }]
        );
    }
}
