use std::sync::Arc;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use agromart_catalog::ProductQuery;
use agromart_core::{CatalogRepository, MessagingGateway, RepoError, Recipient, UserDirectory};
use agromart_shared::{Masked, ScanReport, SweepReport};

use crate::guard::SingleFlight;
use crate::message::{format_time_left, render_warning};
use crate::models::{JobKind, MonitorConfig};
use crate::pacing::PacedSender;

/// Drives product offer windows through warning and expiry.
///
/// Both jobs are idempotent: anything left unprocessed by a failed run is
/// still selected by the next one.
pub struct OfferMonitor {
    catalog: Arc<dyn CatalogRepository>,
    users: Arc<dyn UserDirectory>,
    gateway: Arc<dyn MessagingGateway>,
    config: MonitorConfig,
    scan_flight: SingleFlight,
    sweep_flight: SingleFlight,
}

impl OfferMonitor {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        users: Arc<dyn UserDirectory>,
        gateway: Arc<dyn MessagingGateway>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            catalog,
            users,
            gateway,
            config,
            scan_flight: SingleFlight::new(),
            sweep_flight: SingleFlight::new(),
        }
    }

    pub fn is_running(&self, job: JobKind) -> bool {
        match job {
            JobKind::ScanAndWarn => self.scan_flight.is_busy(),
            JobKind::SweepExpired => self.sweep_flight.is_busy(),
        }
    }

    /// Broadcast the one-time expiry warning for offers closing within the horizon.
    pub async fn scan_and_warn(&self) -> Result<ScanReport, MonitorError> {
        self.scan_and_warn_at(Utc::now()).await
    }

    pub async fn scan_and_warn_at(&self, now: DateTime<Utc>) -> Result<ScanReport, MonitorError> {
        let _flight = self
            .scan_flight
            .try_enter()
            .ok_or(MonitorError::AlreadyRunning(JobKind::ScanAndWarn))?;

        let query = ProductQuery::ExpiringWithin {
            now,
            horizon: self.config.warn_horizon,
        };
        let products = self.catalog.find(&query).await.map_err(MonitorError::store)?;

        let mut report = ScanReport::default();
        if products.is_empty() {
            debug!("No offers inside the warning horizon");
            return Ok(report);
        }

        let (recipients, skipped): (Vec<Recipient>, Vec<Recipient>) = self
            .users
            .sms_recipients()
            .await
            .map_err(MonitorError::store)?
            .into_iter()
            .partition(Recipient::has_valid_phone);
        report.skipped_recipients = skipped.len();

        let mut sender = PacedSender::new(self.gateway.clone(), self.config.send_interval);

        for product in products {
            let time_left = format_time_left(product.offer.time_left(now));
            let body = render_warning(&product, &time_left);
            debug!(
                product_id = %product.id,
                discount = product.offer.discount_percent,
                time_left = %time_left,
                recipients = recipients.len(),
                "Broadcasting expiry warning"
            );

            for recipient in &recipients {
                let phone = match recipient.phone_number(&self.config.default_country_code) {
                    Ok(phone) => phone,
                    Err(e) => {
                        report.failed += 1;
                        warn!(
                            user_id = %recipient.user_id,
                            phone = %Masked(&recipient.phone),
                            error = %e,
                            "Rejected phone number before dispatch"
                        );
                        continue;
                    }
                };

                let outcome = sender.send(&phone, &body).await;
                if outcome.success {
                    report.sent += 1;
                } else {
                    report.failed += 1;
                    warn!(
                        user_id = %recipient.user_id,
                        phone = %Masked(phone.as_str()),
                        error = outcome.error.as_deref().unwrap_or("unknown"),
                        "Expiry warning not delivered"
                    );
                }
            }

            // Marked regardless of delivery: one attempt per window, never a resend.
            let transitioned = self
                .catalog
                .mark_warned(product.id)
                .await
                .map_err(MonitorError::store)?;
            if !transitioned {
                warn!(product_id = %product.id, "Product was already marked warned");
            }
            report.products += 1;
        }

        info!(
            products = report.products,
            attempts = report.attempts(),
            sent = report.sent,
            failed = report.failed,
            skipped = report.skipped_recipients,
            "Expiry warning scan finished"
        );
        Ok(report)
    }

    /// Clear discounts whose window has closed.
    pub async fn sweep_expired(&self) -> Result<SweepReport, MonitorError> {
        self.sweep_expired_at(Utc::now()).await
    }

    pub async fn sweep_expired_at(&self, now: DateTime<Utc>) -> Result<SweepReport, MonitorError> {
        let _flight = self
            .sweep_flight
            .try_enter()
            .ok_or(MonitorError::AlreadyRunning(JobKind::SweepExpired))?;

        let products = self
            .catalog
            .find(&ProductQuery::Lapsed { now })
            .await
            .map_err(MonitorError::store)?;

        let mut report = SweepReport::default();
        for product in products {
            let transitioned = self
                .catalog
                .expire(product.id, now)
                .await
                .map_err(MonitorError::store)?;
            if transitioned {
                debug!(product_id = %product.id, "Offer expired");
                report.expired += 1;
            } else {
                debug!(product_id = %product.id, "Offer changed since query, left as is");
            }
        }

        if report.expired > 0 {
            info!(expired = report.expired, "Expired offers swept");
        } else {
            debug!("No lapsed offers to sweep");
        }
        Ok(report)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Catalog store failure: {0}")]
    Store(String),

    #[error("Job already running: {0}")]
    AlreadyRunning(JobKind),
}

impl MonitorError {
    fn store(err: RepoError) -> Self {
        MonitorError::Store(err.to_string())
    }
}
