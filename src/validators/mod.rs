//! Presence and format checks run before anything is sent to the backend.
//!
//! These are deliberately shallow; the backend is the authority on what it
//! accepts. They only stop obviously incomplete input from costing a round trip.

mod email;
mod password;
mod schedule;

pub use email::validate_email;
pub use password::{validate_new_password, validate_password_present, MIN_NEW_PASSWORD_LENGTH};
pub use schedule::{validate_days_of_week, validate_schedule_time};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Email cannot be empty")]
    EmailEmpty,
    #[error("Email is too long (max 254 characters)")]
    EmailTooLong,
    #[error("Invalid email format")]
    EmailInvalidFormat,
    #[error("Password cannot be empty")]
    PasswordEmpty,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    #[error("Password confirmation does not match")]
    PasswordMismatch,
    #[error("Field `{0}` cannot be empty")]
    Missing(&'static str),
    #[error("Time must use the HH:mm format")]
    InvalidTime,
    #[error("At least one day of the week must be selected")]
    NoDaysSelected,
    #[error("Day of week must be between 0 (Sunday) and 6 (Saturday), got {0}")]
    InvalidDay(u8),
    #[error("Day of week {0} is listed more than once")]
    DuplicateDay(u8),
    #[error("`{field}` must be at most {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        max: u32,
        value: u32,
    },
    #[error("Select at least one recipient or target all users")]
    NoRecipients,
}

/// Rejects an empty or whitespace-only required field.
pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Missing(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require() {
        assert!(require("name", "Morning pump").is_ok());
        assert_eq!(require("name", "  ").unwrap_err(), ValidationError::Missing("name"));
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ValidationError::PasswordTooShort.to_string(),
            "Password must be at least 6 characters"
        );
        assert_eq!(
            ValidationError::InvalidDay(9).to_string(),
            "Day of week must be between 0 (Sunday) and 6 (Saturday), got 9"
        );
    }
}
