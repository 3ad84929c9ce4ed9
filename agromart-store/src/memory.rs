use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;
use agromart_catalog::{Product, ProductQuery};
use agromart_core::{CatalogRepository, Recipient, RepoResult, UserDirectory};

/// Process-local catalog for development runs and tests.
#[derive(Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<Uuid, Product>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product.
    pub async fn insert(&self, product: Product) {
        self.products.write().await.insert(product.id, product);
    }

    pub async fn get(&self, id: Uuid) -> Option<Product> {
        self.products.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    async fn find(&self, query: &ProductQuery) -> RepoResult<Vec<Product>> {
        let products = self.products.read().await;
        let mut matched: Vec<Product> = products
            .values()
            .filter(|product| query.matches(product))
            .cloned()
            .collect();
        matched.sort_by_key(|product| product.offer.window_end);
        Ok(matched)
    }

    async fn save(&self, product: &Product) -> RepoResult<()> {
        let mut products = self.products.write().await;
        match products.get_mut(&product.id) {
            Some(existing) => {
                *existing = product.clone();
                Ok(())
            }
            None => Err(format!("Product not found: {}", product.id).into()),
        }
    }

    async fn mark_warned(&self, id: Uuid) -> RepoResult<bool> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(&id)
            .ok_or_else(|| format!("Product not found: {}", id))?;

        if product.offer.warning_sent || product.offer.expired {
            return Ok(false);
        }
        product.offer.mark_warned();
        product.updated_at = Utc::now();
        Ok(true)
    }

    async fn expire(&self, id: Uuid, now: DateTime<Utc>) -> RepoResult<bool> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(&id)
            .ok_or_else(|| format!("Product not found: {}", id))?;

        if !product.offer.needs_sweep(now) {
            return Ok(false);
        }
        product.offer.expire();
        product.updated_at = now;
        Ok(true)
    }
}

/// Process-local customer list.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    customers: RwLock<Vec<Recipient>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_customer(&self, user_id: Uuid, name: impl Into<String>, phone: impl Into<String>) {
        self.customers
            .write()
            .await
            .push(Recipient::new(user_id, name, phone));
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn sms_recipients(&self) -> RepoResult<Vec<Recipient>> {
        let customers = self.customers.read().await;
        Ok(customers
            .iter()
            .filter(|c| !c.phone.trim().is_empty())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agromart_catalog::Category;
    use chrono::{Duration, Utc};

    fn offer_product(ends_in: Duration) -> Product {
        let now = Utc::now();
        let mut product = Product::new(Uuid::new_v4(), "Guavas", Category::Fruits, 8_000, "kg");
        product
            .configure_offer(10, now - Duration::days(1), now + ends_in)
            .unwrap();
        product
    }

    #[tokio::test]
    async fn test_mark_warned_is_test_and_set() {
        let catalog = InMemoryCatalog::new();
        let product = offer_product(Duration::minutes(20));
        let id = product.id;
        catalog.insert(product).await;

        assert!(catalog.mark_warned(id).await.unwrap());
        assert!(!catalog.mark_warned(id).await.unwrap());
        assert!(catalog.mark_warned(Uuid::new_v4()).await.is_err());
    }

    #[tokio::test]
    async fn test_mark_warned_skips_expired() {
        let catalog = InMemoryCatalog::new();
        let mut product = offer_product(Duration::minutes(-20));
        product.offer.expire();
        let id = product.id;
        catalog.insert(product).await;

        assert!(!catalog.mark_warned(id).await.unwrap());
        assert!(!catalog.get(id).await.unwrap().offer.warning_sent);
    }

    #[tokio::test]
    async fn test_find_orders_by_window_end() {
        let catalog = InMemoryCatalog::new();
        let later = offer_product(Duration::minutes(50));
        let sooner = offer_product(Duration::minutes(10));
        let sooner_id = sooner.id;
        catalog.insert(later).await;
        catalog.insert(sooner).await;
        catalog.insert(offer_product(Duration::hours(3))).await;

        let found = catalog
            .find(&ProductQuery::ExpiringWithin { now: Utc::now(), horizon: Duration::hours(1) })
            .await
            .unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, sooner_id);
        assert_eq!(catalog.len().await, 3);
    }

    #[tokio::test]
    async fn test_expire_is_conditional() {
        let catalog = InMemoryCatalog::new();
        let now = Utc::now();
        let lapsed = offer_product(Duration::minutes(-5));
        let live = offer_product(Duration::minutes(30));
        let (lapsed_id, live_id) = (lapsed.id, live.id);
        catalog.insert(lapsed).await;
        catalog.insert(live).await;

        assert!(catalog.expire(lapsed_id, now).await.unwrap());
        assert!(!catalog.expire(lapsed_id, now).await.unwrap());
        let swept = catalog.get(lapsed_id).await.unwrap();
        assert!(swept.offer.expired);
        assert_eq!(swept.offer.discount_percent, 0);

        assert!(!catalog.expire(live_id, now).await.unwrap());
        assert_eq!(catalog.get(live_id).await.unwrap().offer.discount_percent, 10);
        assert!(catalog.expire(Uuid::new_v4(), now).await.is_err());
    }

    #[tokio::test]
    async fn test_save_unknown_product_fails() {
        let catalog = InMemoryCatalog::new();
        assert!(catalog.save(&offer_product(Duration::minutes(5))).await.is_err());
    }

    #[tokio::test]
    async fn test_directory_drops_blank_phones() {
        let users = InMemoryUserDirectory::new();
        users.add_customer(Uuid::new_v4(), "Ravi", "9876543210").await;
        users.add_customer(Uuid::new_v4(), "Meena", "  ").await;
        users.add_customer(Uuid::new_v4(), "Arjun", "123").await;

        let recipients = users.sms_recipients().await.unwrap();
        assert_eq!(recipients.len(), 2);
    }
}
