use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::UserId;
use crate::validate::FormError;

/// A syntactically valid e-mail address.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Parse an address. Only the shape `local@domain.tld` is checked; the
    /// identity provider remains the authority on deliverability.
    ///
    /// # Errors
    ///
    /// Returns `FormError::InvalidEmail` for malformed input.
    pub fn parse(raw: &str) -> Result<Self, FormError> {
        let trimmed = raw.trim();
        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(FormError::InvalidEmail);
        };
        let domain_ok = domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty());
        if local.is_empty()
            || !domain_ok
            || domain.contains('@')
            || trimmed.chars().any(char::is_whitespace)
        {
            return Err(FormError::InvalidEmail);
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Email({})", self.0)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = FormError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

/// Identity record issued by the identity provider. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Email,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_accepts_common_shapes() {
        let email = Email::parse(" Student@Example.com ").unwrap();
        assert_eq!(email.as_str(), "student@example.com");
    }

    #[test]
    fn email_rejects_malformed_input() {
        for raw in ["", "plain", "@example.com", "a@b", "a@.com", "a b@c.de", "a@b@c.de"] {
            assert_eq!(Email::parse(raw).unwrap_err(), FormError::InvalidEmail, "{raw}");
        }
    }
}
