use std::sync::LazyLock;

use regex::Regex;

use super::ValidationError;

#[allow(clippy::unwrap_used)]
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

const MAX_EMAIL_LENGTH: usize = 254;

/// Checks that a login identifier looks like an email address.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::EmailEmpty);
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::EmailTooLong);
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::EmailInvalidFormat);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("farm.admin@example.vn").is_ok());
        assert!(validate_email("  operator+night@greenhouse.example.com ").is_ok());
    }

    #[test]
    fn test_invalid_emails() {
        assert_eq!(validate_email("").unwrap_err(), ValidationError::EmailEmpty);
        assert_eq!(validate_email("   ").unwrap_err(), ValidationError::EmailEmpty);
        assert_eq!(validate_email("admin").unwrap_err(), ValidationError::EmailInvalidFormat);
        assert_eq!(validate_email("admin@farm").unwrap_err(), ValidationError::EmailInvalidFormat);
        assert_eq!(validate_email("a b@farm.com").unwrap_err(), ValidationError::EmailInvalidFormat);
    }

    #[test]
    fn test_email_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert_eq!(validate_email(&long).unwrap_err(), ValidationError::EmailTooLong);
    }
}
