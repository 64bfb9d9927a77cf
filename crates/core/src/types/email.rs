//! Email address accepted at registration.

/// Why a submitted email was refused.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    /// Zero or several `@`, or nothing on one side of it.
    #[error("email must be a single local part and domain joined by @")]
    Malformed,
}

/// A structurally valid email address.
///
/// Only the shape is checked; the backend owns uniqueness and delivery.
/// Surrounding whitespace is trimmed first.
///
/// ```
/// use marketplace_core::Email;
///
/// assert_eq!(Email::parse(" ana@shop.test ").unwrap().as_str(), "ana@shop.test");
/// assert!(Email::parse("ana@").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse a submitted email.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] for empty, overlong, or malformed input.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        match s.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(s.to_owned()))
            }
            _ => Err(EmailError::Malformed),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
