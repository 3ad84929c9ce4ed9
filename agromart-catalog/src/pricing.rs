use chrono::{DateTime, Utc};

use crate::product::Product;

impl Product {
    /// Unit price at `now`, discounted while the offer window is live.
    pub fn effective_price(&self, now: DateTime<Utc>) -> i64 {
        if !self.offer.is_live(now) {
            return self.price_paise;
        }
        discounted(self.price_paise, self.offer.discount_percent)
    }
}

/// Applies a percentage discount, rounding down to whole paise.
pub fn discounted(price_paise: i64, discount_percent: u8) -> i64 {
    let percent = i64::from(discount_percent.min(100));
    price_paise * (100 - percent) / 100
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Category;
    use chrono::Duration;
    use uuid::Uuid;

    #[test]
    fn test_discounted_rounds_down() {
        assert_eq!(discounted(1_000, 20), 800);
        assert_eq!(discounted(999, 15), 849);
        assert_eq!(discounted(500, 100), 0);
        assert_eq!(discounted(500, 0), 500);
    }

    #[test]
    fn test_effective_price_follows_window() {
        let now = Utc::now();
        let mut product = Product::new(Uuid::new_v4(), "Paneer", Category::Dairy, 40_000, "kg");
        assert_eq!(product.effective_price(now), 40_000);

        product.configure_offer(25, now - Duration::minutes(10), now + Duration::minutes(50)).unwrap();
        assert_eq!(product.effective_price(now), 30_000);

        // Not started yet
        assert_eq!(product.effective_price(now - Duration::hours(1)), 40_000);
        // Lapsed but not swept
        assert_eq!(product.effective_price(now + Duration::hours(1)), 40_000);

        product.offer.expire();
        assert_eq!(product.effective_price(now), 40_000);
    }
}
