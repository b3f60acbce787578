//! Access token inspection.
//!
//! The client never verifies token signatures (it holds no key); it only
//! reads the expiry claim to decide whether the token should be renewed
//! before use. Anything it cannot read is treated as expired.
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use smartfarm_client::jwt::is_expired_or_near_expiry;
//!
//! // not even a JWT: fail closed
//! assert!(is_expired_or_near_expiry("opaque-token", Utc::now(), Duration::seconds(30)));
//! ```

mod claims;
mod expiry;

pub use claims::AccessClaims;
pub use expiry::{decode_claims, expires_at, is_expired_or_near_expiry, DEFAULT_LEEWAY_SECONDS};
