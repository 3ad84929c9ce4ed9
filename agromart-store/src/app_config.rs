use serde::Deserialize;
use std::env;
use std::time::Duration;
use agromart_core::{CoreError, CoreResult, DEFAULT_COUNTRY_CODE};
use agromart_shared::Masked;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    /// Absent means the in-memory store, for local runs.
    pub database: Option<DatabaseConfig>,
    /// Enables the cross-process job lock.
    pub redis: Option<RedisConfig>,
    pub monitor: MonitorSettings,
    pub sms: SmsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MonitorSettings {
    #[serde(default = "default_warn_horizon")]
    pub warn_horizon_secs: u64,
    #[serde(default = "default_send_interval")]
    pub send_interval_ms: u64,
    pub scan_interval_secs: u64,
    pub sweep_interval_secs: u64,
    #[serde(default = "default_lock_ttl")]
    pub job_lock_ttl_secs: u64,
}

fn default_warn_horizon() -> u64 { 3600 }
fn default_send_interval() -> u64 { 1100 }
fn default_lock_ttl() -> u64 { 900 }

/// Ten years; anything longer is a misconfiguration chrono cannot represent anyway.
const MAX_HORIZON_SECS: i64 = 10 * 365 * 24 * 3600;

impl MonitorSettings {
    pub fn warn_horizon(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.warn_horizon_secs).unwrap_or(MAX_HORIZON_SECS).min(MAX_HORIZON_SECS))
    }

    pub fn send_interval(&self) -> Duration {
        Duration::from_millis(self.send_interval_ms)
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn job_lock_ttl(&self) -> Duration {
        Duration::from_secs(self.job_lock_ttl_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmsConfig {
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub account_sid: String,
    #[serde(default = "empty_secret")]
    pub auth_token: Masked<String>,
    #[serde(default)]
    pub from_number: String,
    #[serde(default = "default_country_code")]
    pub default_country_code: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn empty_secret() -> Masked<String> { Masked(String::new()) }
fn default_country_code() -> String { DEFAULT_COUNTRY_CODE.to_string() }
fn default_request_timeout() -> u64 { 10 }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `AGROMART_SMS__AUTH_TOKEN=...`
            .add_source(config::Environment::with_prefix("AGROMART").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Checks the values serde cannot: intervals and gateway settings.
    pub fn validate(&self) -> CoreResult<()> {
        let monitor = &self.monitor;
        if monitor.scan_interval_secs == 0 || monitor.sweep_interval_secs == 0 {
            return Err(CoreError::ValidationError("job intervals must be positive".into()));
        }
        if monitor.warn_horizon_secs == 0 {
            return Err(CoreError::ValidationError("warn_horizon_secs must be positive".into()));
        }

        let code = &self.sms.default_country_code;
        if code.is_empty() || code.len() > 3 || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(CoreError::ValidationError(format!("invalid default_country_code {:?}", code)));
        }

        if !self.sms.dry_run {
            let sms = &self.sms;
            if sms.base_url.is_empty() || sms.account_sid.is_empty() || sms.expose_token().is_empty() || sms.from_number.is_empty() {
                return Err(CoreError::ValidationError(
                    "sms.base_url, sms.account_sid, sms.auth_token and sms.from_number are required unless sms.dry_run is set".into(),
                ));
            }
        }
        Ok(())
    }
}

impl SmsConfig {
    pub fn expose_token(&self) -> &str {
        self.auth_token.expose()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
