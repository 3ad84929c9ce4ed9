use serde::{Deserialize, Serialize};
use std::fmt;

/// Country calling code assumed for bare national numbers.
pub const DEFAULT_COUNTRY_CODE: &str = "91";

/// Digits in a national subscriber number.
pub const NATIONAL_DIGITS: usize = 10;

/// A phone number in `+<country><national>` form, ready for the SMS gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhoneError {
    #[error("phone number is empty")]
    Empty,

    #[error("phone number contains invalid character {0:?}")]
    InvalidCharacter(char),

    #[error("phone number has {0} digits, expected at least 10")]
    TooShort(usize),

    #[error("phone number has {0} digits and no recognised country prefix")]
    UnexpectedLength(usize),
}

impl PhoneNumber {
    /// Normalize user-entered input.
    ///
    /// Separators (spaces, dashes, dots, parentheses) are dropped. Input that
    /// already starts with `+` is kept as is. A bare 10-digit number gets the
    /// default country code, a single trunk `0` is dropped, and a number that
    /// already carries the country code just gains the `+`.
    pub fn normalize(raw: &str, default_country_code: &str) -> Result<Self, PhoneError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PhoneError::Empty);
        }

        let (prefixed, body) = match trimmed.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let mut digits = String::with_capacity(body.len());
        for c in body.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' | '.' | '(' | ')' => {}
                other => return Err(PhoneError::InvalidCharacter(other)),
            }
        }

        if digits.len() < NATIONAL_DIGITS {
            return Err(PhoneError::TooShort(digits.len()));
        }

        if prefixed {
            return Ok(Self(format!("+{}", digits)));
        }

        let national = match digits.len() {
            NATIONAL_DIGITS => digits.as_str(),
            n if n == NATIONAL_DIGITS + 1 && digits.starts_with('0') => &digits[1..],
            n if n == NATIONAL_DIGITS + default_country_code.len()
                && digits.starts_with(default_country_code) =>
            {
                &digits[default_country_code.len()..]
            }
            n => return Err(PhoneError::UnexpectedLength(n)),
        };

        Ok(Self(format!("+{}{}", default_country_code, national)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Count of digits in user input, ignoring formatting.
    pub fn digit_count(raw: &str) -> usize {
        raw.chars().filter(char::is_ascii_digit).count()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_number_gets_default_prefix() {
        let phone = PhoneNumber::normalize("9876543210", DEFAULT_COUNTRY_CODE).unwrap();
        assert_eq!(phone.as_str(), "+919876543210");
    }

    #[test]
    fn test_prefixed_number_passes_through() {
        let phone = PhoneNumber::normalize("+919876543210", DEFAULT_COUNTRY_CODE).unwrap();
        assert_eq!(phone.as_str(), "+919876543210");

        let foreign = PhoneNumber::normalize("+14155550123", DEFAULT_COUNTRY_CODE).unwrap();
        assert_eq!(foreign.as_str(), "+14155550123");
    }

    #[test]
    fn test_formatting_is_stripped() {
        let phone = PhoneNumber::normalize(" 98765-43210 ", DEFAULT_COUNTRY_CODE).unwrap();
        assert_eq!(phone.as_str(), "+919876543210");

        let phone = PhoneNumber::normalize("(987) 654.3210", DEFAULT_COUNTRY_CODE).unwrap();
        assert_eq!(phone.as_str(), "+919876543210");
    }

    #[test]
    fn test_trunk_zero_and_country_code_without_plus() {
        assert_eq!(
            PhoneNumber::normalize("09876543210", DEFAULT_COUNTRY_CODE).unwrap().as_str(),
            "+919876543210"
        );
        assert_eq!(
            PhoneNumber::normalize("919876543210", DEFAULT_COUNTRY_CODE).unwrap().as_str(),
            "+919876543210"
        );
    }

    #[test]
    fn test_short_numbers_rejected() {
        assert_eq!(PhoneNumber::normalize("98765", DEFAULT_COUNTRY_CODE), Err(PhoneError::TooShort(5)));
        assert_eq!(PhoneNumber::normalize("+9198", DEFAULT_COUNTRY_CODE), Err(PhoneError::TooShort(4)));
        assert_eq!(PhoneNumber::normalize("   ", DEFAULT_COUNTRY_CODE), Err(PhoneError::Empty));
    }

    #[test]
    fn test_garbage_rejected() {
        assert_eq!(
            PhoneNumber::normalize("98765x43210", DEFAULT_COUNTRY_CODE),
            Err(PhoneError::InvalidCharacter('x'))
        );
        assert_eq!(
            PhoneNumber::normalize("123456789012345", DEFAULT_COUNTRY_CODE),
            Err(PhoneError::UnexpectedLength(15))
        );
    }

    #[test]
    fn test_other_default_country() {
        let phone = PhoneNumber::normalize("4155550123", "1").unwrap();
        assert_eq!(phone.as_str(), "+14155550123");
    }
}
