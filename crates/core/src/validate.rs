//! Client-side form validation. Everything here runs before any network call.

use thiserror::Error;

use crate::model::Email;

/// Minimum password length accepted by the identity provider.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Inclusive bounds for the retrieval depth of a question.
pub const TOP_K_RANGE: std::ops::RangeInclusive<u32> = 1..=20;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FormError {
    #[error("Please enter a question")]
    EmptyQuery,

    #[error("top_k must be between 1 and 20")]
    TopKOutOfRange(u32),

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password must be at least 6 characters")]
    WeakPassword,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Please enter your password")]
    MissingPassword,
}

/// Trim a question and reject it when nothing is left.
///
/// # Errors
///
/// Returns `FormError::EmptyQuery` for blank input.
pub fn validate_query(text: &str) -> Result<&str, FormError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FormError::EmptyQuery);
    }
    Ok(trimmed)
}

/// # Errors
///
/// Returns `FormError::TopKOutOfRange` outside `1..=20`.
pub fn validate_top_k(top_k: u32) -> Result<u32, FormError> {
    if TOP_K_RANGE.contains(&top_k) {
        Ok(top_k)
    } else {
        Err(FormError::TopKOutOfRange(top_k))
    }
}

/// Raw sign-up form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Sign-up input that passed local validation.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: Email,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl SignUpForm {
    /// # Errors
    ///
    /// Returns the first failing rule: e-mail shape, password policy, then
    /// confirmation mismatch.
    pub fn validate(&self) -> Result<Credentials, FormError> {
        let email = Email::parse(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(FormError::WeakPassword);
        }
        if self.password != self.confirm_password {
            return Err(FormError::PasswordMismatch);
        }
        Ok(Credentials {
            email,
            password: self.password.clone(),
        })
    }
}

/// Raw sign-in form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    /// # Errors
    ///
    /// Returns `FormError::InvalidEmail` or `FormError::MissingPassword`.
    pub fn validate(&self) -> Result<Credentials, FormError> {
        let email = Email::parse(&self.email)?;
        if self.password.is_empty() {
            return Err(FormError::MissingPassword);
        }
        Ok(Credentials {
            email,
            password: self.password.clone(),
        })
    }
}

/// Raw password-reset form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetForm {
    pub email: String,
}

impl ResetForm {
    /// # Errors
    ///
    /// Returns `FormError::InvalidEmail` for malformed input.
    pub fn validate(&self) -> Result<Email, FormError> {
        Email::parse(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_trimmed() {
        assert_eq!(validate_query("  what is rust? "), Ok("what is rust?"));
        assert_eq!(validate_query(" \n\t "), Err(FormError::EmptyQuery));
    }

    #[test]
    fn top_k_is_bounded() {
        assert_eq!(validate_top_k(5), Ok(5));
        assert_eq!(validate_top_k(0), Err(FormError::TopKOutOfRange(0)));
        assert_eq!(validate_top_k(21), Err(FormError::TopKOutOfRange(21)));
    }

    #[test]
    fn sign_up_detects_mismatch() {
        let form = SignUpForm {
            email: "a@b.co".into(),
            password: "secret1".into(),
            confirm_password: "secret2".into(),
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err, FormError::PasswordMismatch);
        assert_eq!(err.to_string(), "Passwords do not match");
    }

    #[test]
    fn sign_up_enforces_password_policy() {
        let form = SignUpForm {
            email: "a@b.co".into(),
            password: "abc".into(),
            confirm_password: "abc".into(),
        };
        assert_eq!(form.validate().unwrap_err(), FormError::WeakPassword);
    }

    #[test]
    fn sign_in_requires_password() {
        let form = SignInForm {
            email: "a@b.co".into(),
            password: String::new(),
        };
        assert_eq!(form.validate().unwrap_err(), FormError::MissingPassword);
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = SignInForm {
            email: "a@b.co".into(),
            password: "hunter22".into(),
        }
        .validate()
        .unwrap();
        assert!(!format!("{creds:?}").contains("hunter22"));
    }
}
