use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Produce categories listed on the marketplace
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Vegetables,
    Fruits,
    Grains,
    Dairy,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Vegetables => "VEGETABLES",
            Category::Fruits => "FRUITS",
            Category::Grains => "GRAINS",
            Category::Dairy => "DAIRY",
            Category::Other => "OTHER",
        }
    }

    /// Unknown values fall back to `Other` so legacy rows still load.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "VEGETABLES" => Category::Vegetables,
            "FRUITS" => Category::Fruits,
            "GRAINS" => Category::Grains,
            "DAIRY" => Category::Dairy,
            _ => Category::Other,
        }
    }
}

/// Discount window embedded in a product record.
///
/// `expired` and `warning_sent` only ever move from false to true for a given
/// window; [`Product::configure_offer`] is the one place that resets them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OfferTerms {
    pub discount_percent: u8,
    pub window_start: Option<DateTime<Utc>>,
    pub window_end: Option<DateTime<Utc>>,
    pub expired: bool,
    pub warning_sent: bool,
}

impl OfferTerms {
    pub fn has_discount(&self) -> bool {
        self.discount_percent > 0
    }

    /// True while the discount applies at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        if !self.has_discount() || self.expired {
            return false;
        }
        let started = self.window_start.map_or(true, |start| start <= now);
        let open = self.window_end.map_or(false, |end| now < end);
        started && open
    }

    /// Terminal transition: flag the window expired and clear the discount.
    pub fn expire(&mut self) {
        self.expired = true;
        self.discount_percent = 0;
    }

    pub fn mark_warned(&mut self) {
        self.warning_sent = true;
    }
}

/// A produce listing owned by a farmer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub name: String,
    pub category: Category,
    /// Unit price in paise
    pub price_paise: i64,
    pub unit: String,
    pub stock_quantity: i32,
    pub offer: OfferTerms,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(farmer_id: Uuid, name: impl Into<String>, category: Category, price_paise: i64, unit: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            farmer_id,
            name: name.into(),
            category,
            price_paise,
            unit: unit.into(),
            stock_quantity: 0,
            offer: OfferTerms::default(),
            updated_at: Utc::now(),
        }
    }

    /// Start a new discount window. Resets the warning and expiry flags, which
    /// makes the product visible to the lifecycle monitor again.
    pub fn configure_offer(
        &mut self,
        discount_percent: u8,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<(), OfferError> {
        if discount_percent == 0 || discount_percent > 100 {
            return Err(OfferError::InvalidDiscount(discount_percent));
        }
        if window_end <= window_start {
            return Err(OfferError::InvalidWindow {
                start: window_start,
                end: window_end,
            });
        }

        self.offer = OfferTerms {
            discount_percent,
            window_start: Some(window_start),
            window_end: Some(window_end),
            expired: false,
            warning_sent: false,
        };
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Offer configuration errors
#[derive(Debug, thiserror::Error)]
pub enum OfferError {
    #[error("Discount must be between 1 and 100 percent, got {0}")]
    InvalidDiscount(u8),

    #[error("Offer window ends ({end}) before it starts ({start})")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}
