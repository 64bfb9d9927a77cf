//! Seller registration promo code.

use core::fmt;

use serde::Serialize;

/// Errors that can occur when parsing a [`PromoCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PromoCodeError {
    /// No code was supplied.
    #[error("Promo code is required for seller registration")]
    Missing,
    /// The code is not exactly four ASCII digits.
    #[error("Promo code must be exactly 4 digits")]
    Malformed,
}

/// A four-digit promo code required to register as a seller.
///
/// Only the shape is checked here. Whether the code is active, and how many
/// uses it has left, is decided by the backend.
///
/// ## Examples
///
/// ```
/// use marketplace_core::PromoCode;
///
/// assert!(PromoCode::parse("0420").is_ok());
/// assert!(PromoCode::parse("12a4").is_err());
/// assert!(PromoCode::parse("12345").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PromoCode(String);

impl PromoCode {
    /// Number of digits in a promo code.
    pub const LENGTH: usize = 4;

    /// Parse a `PromoCode`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `PromoCodeError::Missing` for a blank input and
    /// `PromoCodeError::Malformed` unless the input is exactly four ASCII
    /// digits.
    pub fn parse(s: &str) -> Result<Self, PromoCodeError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PromoCodeError::Missing);
        }
        if s.len() != Self::LENGTH || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PromoCodeError::Malformed);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PromoCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
