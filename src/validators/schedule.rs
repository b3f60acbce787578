use super::ValidationError;

/// Accepts a 24-hour `HH:mm` time such as `06:30`.
pub fn validate_schedule_time(time: &str) -> Result<(), ValidationError> {
    let (hours, minutes) = time.split_once(':').ok_or(ValidationError::InvalidTime)?;

    let two_digits = |s: &str| s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return Err(ValidationError::InvalidTime);
    }

    let hours: u8 = hours.parse().map_err(|_| ValidationError::InvalidTime)?;
    let minutes: u8 = minutes.parse().map_err(|_| ValidationError::InvalidTime)?;
    if hours > 23 || minutes > 59 {
        return Err(ValidationError::InvalidTime);
    }

    Ok(())
}

/// Days are numbered 0 (Sunday) to 6 (Saturday).
pub fn validate_days_of_week(days: &[u8]) -> Result<(), ValidationError> {
    if days.is_empty() {
        return Err(ValidationError::NoDaysSelected);
    }

    let mut seen = [false; 7];
    for &day in days {
        let slot = seen
            .get_mut(usize::from(day))
            .ok_or(ValidationError::InvalidDay(day))?;
        if *slot {
            return Err(ValidationError::DuplicateDay(day));
        }
        *slot = true;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_times() {
        for time in ["00:00", "06:30", "23:59", "12:05"] {
            assert!(validate_schedule_time(time).is_ok(), "{time}");
        }
    }

    #[test]
    fn test_invalid_times() {
        for time in ["", "6:30", "24:00", "12:60", "12-30", "12:3", "ab:cd", "12:30:00"] {
            assert_eq!(
                validate_schedule_time(time).unwrap_err(),
                ValidationError::InvalidTime,
                "{time}"
            );
        }
    }

    #[test]
    fn test_days_of_week() {
        assert!(validate_days_of_week(&[0, 1, 2, 3, 4, 5, 6]).is_ok());
        assert!(validate_days_of_week(&[3]).is_ok());
        assert_eq!(validate_days_of_week(&[]).unwrap_err(), ValidationError::NoDaysSelected);
        assert_eq!(validate_days_of_week(&[1, 7]).unwrap_err(), ValidationError::InvalidDay(7));
        assert_eq!(validate_days_of_week(&[2, 2]).unwrap_err(), ValidationError::DuplicateDay(2));
    }
}
