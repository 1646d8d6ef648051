//! Pure verification functions.
//!
//! These functions hold the comparisons behind token and certificate checks.
//! They are deterministic and side-effect free, so they can be tested
//! without keys or clocks.
//!
//! | Function | Property |
//! |----------|----------|
//! | [`validate_issuer`] | Token issuer equals the expected issuer (exact match) |
//! | [`check_expiration`] | Current time is strictly less than expiration |
//! | [`check_validity_window`] | Current time lies inside `[not_before, not_after]` |

use chrono::{DateTime, Utc};

use crate::error::TrustError;

/// Pure function: validates that the token issuer matches the expected issuer.
///
/// # Errors
///
/// Returns `TrustError::InvalidClaims` if `expected` does not equal `token_issuer`.
///
/// # Examples
///
/// ```
/// use ans_trust::validate_issuer;
///
/// assert!(validate_issuer("ans-client", "ans-client").is_ok());
/// assert!(validate_issuer("ans-client", "someone-else").is_err());
/// ```
pub fn validate_issuer(expected: &str, token_issuer: &str) -> Result<(), TrustError> {
    if expected == token_issuer {
        Ok(())
    } else {
        Err(TrustError::claims(format!(
            "issuer '{token_issuer}' does not match expected '{expected}'"
        )))
    }
}

/// Pure function: checks if a token has expired at a given time.
///
/// # Errors
///
/// Returns `TrustError::TokenExpired` if `now >= exp`.
///
/// # Examples
///
/// ```
/// use chrono::{Utc, Duration};
/// use ans_trust::check_expiration;
///
/// let now = Utc::now();
/// assert!(check_expiration(now + Duration::hours(1), now).is_ok());
/// assert!(check_expiration(now - Duration::hours(1), now).is_err());
/// assert!(check_expiration(now, now).is_err());
/// ```
pub fn check_expiration(exp: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), TrustError> {
    if now < exp {
        Ok(())
    } else {
        Err(TrustError::TokenExpired {
            expired_at: exp.to_rfc3339(),
        })
    }
}

/// Pure function: checks that `now` lies inside a certificate validity window.
///
/// Both bounds are inclusive.
///
/// # Errors
///
/// Returns `TrustError::UntrustedCertificate` if `now` is before
/// `not_before` or after `not_after`.
pub fn check_validity_window(
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), TrustError> {
    if now < not_before {
        Err(TrustError::untrusted(format!(
            "certificate not valid before {}",
            not_before.to_rfc3339()
        )))
    } else if now > not_after {
        Err(TrustError::untrusted(format!(
            "certificate expired at {}",
            not_after.to_rfc3339()
        )))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    mod validate_issuer_tests {
        use super::*;

        #[test]
        fn exact_match_succeeds() {
            assert!(validate_issuer("ans-client", "ans-client").is_ok());
        }

        #[test]
        fn case_difference_fails() {
            assert!(matches!(
                validate_issuer("ans-client", "ANS-client"),
                Err(TrustError::InvalidClaims { .. })
            ));
        }
    }

    mod check_expiration_tests {
        use super::*;

        #[test]
        fn future_expiration_is_valid() {
            let now = Utc::now();
            assert!(check_expiration(now + Duration::seconds(1), now).is_ok());
        }

        #[test]
        fn exact_expiration_is_expired() {
            let now = Utc::now();
            assert!(matches!(
                check_expiration(now, now),
                Err(TrustError::TokenExpired { .. })
            ));
        }
    }

    mod check_validity_window_tests {
        use super::*;

        #[test]
        fn inside_window_is_valid() {
            let now = Utc::now();
            assert!(
                check_validity_window(now - Duration::days(1), now + Duration::days(1), now)
                    .is_ok()
            );
        }

        #[test]
        fn bounds_are_inclusive() {
            let now = Utc::now();
            assert!(check_validity_window(now, now, now).is_ok());
        }

        #[test]
        fn before_window_fails() {
            let now = Utc::now();
            let result = check_validity_window(now + Duration::hours(1), now + Duration::days(1), now);
            assert!(matches!(result, Err(TrustError::UntrustedCertificate { .. })));
        }

        #[test]
        fn after_window_fails() {
            let now = Utc::now();
            let result = check_validity_window(now - Duration::days(2), now - Duration::days(1), now);
            assert!(result.unwrap_err().to_string().contains("expired"));
        }
    }
}
