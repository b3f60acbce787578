use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, Validation};

use super::AccessClaims;

/// Renewal margin used when the caller has no configured leeway.
pub const DEFAULT_LEEWAY_SECONDS: i64 = 30;

/// Decodes the payload of a compact JWT without verifying its signature.
///
/// Registered-claim validation is switched off too: an expired token must
/// still decode so that its expiry can be compared against the leeway.
pub fn decode_claims(token: &str) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    jsonwebtoken::decode::<AccessClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
}

/// Returns the token's expiry, or `None` if it cannot be determined.
pub fn expires_at(token: &str) -> Option<DateTime<Utc>> {
    decode_claims(token).ok()?.expires_at()
}

/// Returns `true` when the token expires at or before `now + leeway`.
///
/// Fails closed: a token that does not decode, has no `exp`, or has a
/// non-numeric `exp` counts as expired, as does any token when `now + leeway`
/// is past the representable range.
pub fn is_expired_or_near_expiry(token: &str, now: DateTime<Utc>, leeway: Duration) -> bool {
    let Some(limit) = now.checked_add_signed(leeway) else {
        return true;
    };
    match expires_at(token) {
        Some(exp) => exp <= limit,
        None => true,
    }
}
