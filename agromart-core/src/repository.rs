use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;
use agromart_catalog::{Product, ProductQuery};

use crate::recipient::Recipient;

pub type RepoError = Box<dyn std::error::Error + Send + Sync>;
pub type RepoResult<T> = Result<T, RepoError>;

/// Product catalog access needed by the offer lifecycle jobs
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn find(&self, query: &ProductQuery) -> RepoResult<Vec<Product>>;

    /// Replace the offer terms of an existing product. Used by catalog
    /// management; the lifecycle jobs only make the conditional writes below.
    async fn save(&self, product: &Product) -> RepoResult<()>;

    /// Set `warning_sent` only if it is still unset and the offer has not
    /// expired. Returns whether this call made the transition.
    async fn mark_warned(&self, id: Uuid) -> RepoResult<bool>;

    /// Set `expired` and zero the discount only if the offer is still
    /// discounted, not expired, and its window closed before `now`.
    /// Returns whether this call made the transition.
    async fn expire(&self, id: Uuid, now: DateTime<Utc>) -> RepoResult<bool>;
}

/// Customer lookup for SMS broadcasts
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Customers with a non-empty phone number.
    async fn sms_recipients(&self) -> RepoResult<Vec<Recipient>>;
}

/// Cross-process mutual exclusion for scheduled jobs
#[async_trait]
pub trait JobLock: Send + Sync {
    async fn try_acquire(&self, job: &str, ttl: Duration) -> RepoResult<bool>;

    /// Push the expiry of a lock this process holds. `false` means the lock
    /// was lost to expiry or another owner.
    async fn extend(&self, job: &str, ttl: Duration) -> RepoResult<bool>;

    async fn release(&self, job: &str) -> RepoResult<()>;
}
