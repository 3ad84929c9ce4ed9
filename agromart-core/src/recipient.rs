use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::phone::{PhoneError, PhoneNumber, NATIONAL_DIGITS};

/// Read-only projection of a customer who can receive SMS broadcasts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub user_id: Uuid,
    pub name: String,
    pub phone: String,
}

impl Recipient {
    pub fn new(user_id: Uuid, name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            phone: phone.into(),
        }
    }

    /// Non-empty with at least ten digits. Anything else is skipped before dispatch.
    pub fn has_valid_phone(&self) -> bool {
        !self.phone.trim().is_empty() && PhoneNumber::digit_count(&self.phone) >= NATIONAL_DIGITS
    }

    pub fn phone_number(&self, default_country_code: &str) -> Result<PhoneNumber, PhoneError> {
        PhoneNumber::normalize(&self.phone, default_country_code)
    }
}
