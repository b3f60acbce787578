use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Claims read from an access token's payload.
///
/// Only `exp` drives any decision. The others are kept for logging and
/// for callers that want to show who a token belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessClaims {
    /// Expiration time in epoch seconds. Fractional values are accepted.
    #[serde(default)]
    pub exp: Option<f64>,
    #[serde(default)]
    pub iat: Option<f64>,
    /// Subject, usually the user id.
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl AccessClaims {
    /// Returns the expiry as a timestamp, or `None` when the claim is absent
    /// or not a number.
    ///
    /// Values outside chrono's range saturate to the earliest or latest
    /// representable instant.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let exp = self.exp?;
        if exp.is_nan() {
            return None;
        }
        // whole seconds; a fractional part only moves expiry later
        DateTime::from_timestamp(exp.floor() as i64, 0).or(Some(if exp > 0.0 {
            DateTime::<Utc>::MAX_UTC
        } else {
            DateTime::<Utc>::MIN_UTC
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expires_at() {
        let claims: AccessClaims = serde_json::from_str(r#"{"exp": 1700000000}"#).unwrap();
        assert_eq!(claims.expires_at().unwrap().timestamp(), 1_700_000_000);

        let claims: AccessClaims = serde_json::from_str(r#"{"exp": 1700000000.9}"#).unwrap();
        assert_eq!(claims.expires_at().unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_out_of_range_exp_saturates() {
        let claims: AccessClaims = serde_json::from_str(r#"{"exp": 1e20}"#).unwrap();
        assert_eq!(claims.expires_at(), Some(DateTime::<Utc>::MAX_UTC));

        let claims: AccessClaims = serde_json::from_str(r#"{"exp": -1e20}"#).unwrap();
        assert_eq!(claims.expires_at(), Some(DateTime::<Utc>::MIN_UTC));
    }

    #[test]
    fn test_missing_exp() {
        let claims: AccessClaims = serde_json::from_str(r#"{"sub": "u1"}"#).unwrap();
        assert!(claims.expires_at().is_none());
        assert_eq!(claims.sub.as_deref(), Some("u1"));
    }

    #[test]
    fn test_non_numeric_exp_is_rejected() {
        let result = serde_json::from_str::<AccessClaims>(r#"{"exp": "tomorrow"}"#);
        assert!(result.is_err());
    }
}
