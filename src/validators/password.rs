use super::ValidationError;

pub const MIN_NEW_PASSWORD_LENGTH: usize = 6;

/// Login only checks presence; strength rules belong to the backend.
pub fn validate_password_present(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::PasswordEmpty);
    }
    Ok(())
}

/// Checks a new password and its confirmation before a change request.
pub fn validate_new_password(new_password: &str, confirmation: &str) -> Result<(), ValidationError> {
    validate_password_present(new_password)?;

    if new_password.chars().count() < MIN_NEW_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    if new_password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }

    Ok(())
}
