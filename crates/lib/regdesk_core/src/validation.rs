//! Input validation shared by the registration and admin flows.
//!
//! Every validator trims its input and returns the normalized value on
//! success, so callers store exactly what was checked.

use thiserror::Error;

/// Minimum length of a client's full name, in characters.
pub const FULL_NAME_MIN: usize = 3;

/// Maximum length of a client's full name, in characters.
pub const FULL_NAME_MAX: usize = 100;

/// Minimum account password length.
pub const PASSWORD_MIN: usize = 6;

/// A user-fixable input problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Trim and lowercase an email. Lookups and uniqueness use this form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate and normalize an email address.
///
/// Accepts the `local@domain.tld` shape: no whitespace, a non-empty local
/// part, and a domain containing a dot with characters on both sides.
pub fn email(value: &str) -> Result<String, ValidationError> {
    let email = normalize_email(value);
    if email.is_empty() {
        return Err(ValidationError::new("Email is required"));
    }
    if !is_email_shape(&email) {
        return Err(ValidationError::new("Invalid email"));
    }
    Ok(email)
}

fn is_email_shape(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    s.match_indices('@').any(|(at, _)| {
        let domain = &s[at + 1..];
        at > 0
            && domain
                .match_indices('.')
                .any(|(dot, _)| dot > 0 && dot + 1 < domain.len())
    })
}

/// Validate a client's full name (3–100 characters after trimming).
pub fn full_name(value: &str) -> Result<String, ValidationError> {
    let name = value.trim();
    if name.is_empty() {
        return Err(ValidationError::new("Full name is required"));
    }
    let len = name.chars().count();
    if len < FULL_NAME_MIN {
        return Err(ValidationError::new(format!(
            "Full name must be at least {FULL_NAME_MIN} characters"
        )));
    }
    if len > FULL_NAME_MAX {
        return Err(ValidationError::new(format!(
            "Full name must be at most {FULL_NAME_MAX} characters"
        )));
    }
    Ok(name.to_string())
}

/// Validate an optional phone number. Blank input means "no phone".
pub fn phone(value: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(phone) = value.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(None);
    };
    let allowed = |c: char| c.is_ascii_digit() || c.is_whitespace() || "-()+".contains(c);
    if !phone.chars().all(allowed) {
        return Err(ValidationError::new("Invalid phone number"));
    }
    Ok(Some(phone.to_string()))
}

/// Validate an account display name.
pub fn account_name(value: &str) -> Result<String, ValidationError> {
    let name = value.trim();
    if name.is_empty() {
        return Err(ValidationError::new("Name is required"));
    }
    Ok(name.to_string())
}

/// Validate a new account password.
pub fn password(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new("Password is required"));
    }
    if value.chars().count() < PASSWORD_MIN {
        return Err(ValidationError::new(format!(
            "Password must be at least {PASSWORD_MIN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(email("  Ana.Smith@Example.COM ").unwrap(), "ana.smith@example.com");
    }

    #[test]
    fn email_rejects_malformed_shapes() {
        for bad in ["", "   ", "plain", "@x.com", "a@", "a@x", "a@.com", "a@x.", "a b@x.com"] {
            assert!(email(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn email_accepts_subdomains_and_plus_tags() {
        assert!(email("a+tag@mail.example.co.uk").is_ok());
        assert!(email("x@y.z").is_ok());
    }

    #[test]
    fn full_name_bounds() {
        assert!(full_name("Al").is_err());
        assert_eq!(full_name("  Ana  ").unwrap(), "Ana");
        assert!(full_name(&"x".repeat(100)).is_ok());
        assert!(full_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn full_name_counts_characters_not_bytes() {
        assert!(full_name("Zoë").is_ok());
        assert!(full_name(&"é".repeat(100)).is_ok());
    }

    #[test]
    fn phone_allows_formatting_characters() {
        assert_eq!(
            phone(Some("+55 (11) 91234-5678")).unwrap(),
            Some("+55 (11) 91234-5678".to_string())
        );
        assert_eq!(phone(Some("   ")).unwrap(), None);
        assert_eq!(phone(None).unwrap(), None);
        assert!(phone(Some("call me")).is_err());
        assert!(phone(Some("123#4")).is_err());
    }

    #[test]
    fn password_minimum_length() {
        assert!(password("").is_err());
        assert!(password("12345").is_err());
        assert!(password("123456").is_ok());
    }
}
