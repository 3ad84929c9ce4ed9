use chrono::{DateTime, Duration, Utc};

use crate::product::Product;

/// Catalog predicates the lifecycle monitor selects products with.
///
/// Store adapters translate these into native queries; [`ProductQuery::matches`]
/// is the reference semantics they must agree with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductQuery {
    /// Discounted, not yet warned or expired, closing within `[now, now + horizon]`.
    ExpiringWithin {
        now: DateTime<Utc>,
        horizon: Duration,
    },
    /// Discounted, not expired, closed before `now`.
    Lapsed { now: DateTime<Utc> },
}

impl ProductQuery {
    pub fn matches(&self, product: &Product) -> bool {
        let offer = &product.offer;
        if !offer.has_discount() || offer.expired {
            return false;
        }
        let Some(end) = offer.window_end else {
            return false;
        };

        match *self {
            ProductQuery::ExpiringWithin { now, horizon } => {
                !offer.warning_sent && end >= now && end <= now + horizon
            }
            ProductQuery::Lapsed { now } => end < now,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProductQuery::ExpiringWithin { .. } => "expiring_within",
            ProductQuery::Lapsed { .. } => "lapsed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Category;
    use uuid::Uuid;

    fn product_ending_at(discount: u8, end: DateTime<Utc>) -> Product {
        let mut product = Product::new(Uuid::new_v4(), "Mangoes", Category::Fruits, 12_000, "dozen");
        product.offer.discount_percent = discount;
        product.offer.window_end = Some(end);
        product
    }

    #[test]
    fn test_expiring_within_bounds() {
        let now = Utc::now();
        let query = ProductQuery::ExpiringWithin { now, horizon: Duration::hours(1) };

        assert!(query.matches(&product_ending_at(20, now + Duration::minutes(30))));
        assert!(query.matches(&product_ending_at(20, now)));
        assert!(query.matches(&product_ending_at(20, now + Duration::hours(1))));
        assert!(!query.matches(&product_ending_at(20, now + Duration::minutes(61))));
        assert!(!query.matches(&product_ending_at(20, now - Duration::minutes(1))));
        assert!(!query.matches(&product_ending_at(0, now + Duration::minutes(30))));

        let mut warned = product_ending_at(20, now + Duration::minutes(30));
        warned.offer.warning_sent = true;
        assert!(!query.matches(&warned));

        let mut expired = product_ending_at(20, now + Duration::minutes(30));
        expired.offer.expired = true;
        assert!(!query.matches(&expired));
    }

    #[test]
    fn test_lapsed() {
        let now = Utc::now();
        let query = ProductQuery::Lapsed { now };

        assert!(query.matches(&product_ending_at(15, now - Duration::hours(1))));
        assert!(!query.matches(&product_ending_at(15, now)));
        assert!(!query.matches(&product_ending_at(0, now - Duration::hours(1))));

        let mut product = product_ending_at(15, now - Duration::hours(1));
        product.offer.warning_sent = true;
        assert!(query.matches(&product), "warned products still lapse");
        product.offer.expire();
        assert!(!query.matches(&product));
    }

    #[test]
    fn test_missing_window_end_never_matches() {
        let now = Utc::now();
        let mut product = Product::new(Uuid::new_v4(), "Rice", Category::Grains, 6_000, "kg");
        product.offer.discount_percent = 10;
        assert!(!ProductQuery::Lapsed { now }.matches(&product));
        assert!(!ProductQuery::ExpiringWithin { now, horizon: Duration::hours(1) }.matches(&product));
    }
}
