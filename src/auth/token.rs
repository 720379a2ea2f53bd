//! Bearer credential verification.
//!
//! Credentials are HS256 JWTs carrying `userId`, `email` and `userType`.
//! Verification is stateless, so one verifier is shared by every request.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::{Role, User};
use crate::error::{unauthorized_error, Error};

/// Payload stored in the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub user_type: Role,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    pub fn issue(&self, user: &User, ttl: Duration) -> Result<String, Error> {
        let now = Utc::now();

        let claims = Claims {
            user_id: user.id.clone(),
            email: user.email.clone(),
            user_type: user.role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Malformed, expired and badly signed tokens are all reported the same way.
    pub fn verify(&self, token: &str) -> Result<User, Error> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|err| {
            tracing::debug!(error = %err, "rejected bearer token");
            unauthorized_error()
        })?;

        let claims = data.claims;

        Ok(User::new(claims.user_id, claims.email, claims.user_type))
    }

    pub fn verify_header(&self, header: Option<&str>) -> Result<User, Error> {
        let token = bearer_token(header).ok_or_else(unauthorized_error)?;

        self.verify(token)
    }
}

/// Extracts `<token>` from `Bearer <token>`. Any other scheme yields nothing.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let token = header?.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        return None;
    }

    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> TokenVerifier {
        TokenVerifier::new("test-secret-that-is-long-enough-for-hs256")
    }

    fn rider() -> User {
        User::new("1", "rider@demo.com", Role::Rider)
    }

    #[test]
    fn issued_token_round_trips_claims() {
        let verifier = verifier();
        let token = verifier.issue(&rider(), Duration::days(7)).unwrap();

        let user = verifier.verify(&token).unwrap();
        assert_eq!(user, rider());
    }

    #[test]
    fn expired_token_is_unauthenticated() {
        let verifier = verifier();
        let token = verifier.issue(&rider(), Duration::hours(-2)).unwrap();

        let err = verifier.verify(&token).unwrap_err();
        assert!(err.is_unauthorized_error());
    }

    #[test]
    fn token_signed_with_other_secret_is_unauthenticated() {
        let other = TokenVerifier::new("some-other-secret-entirely-0123456789");
        let token = other.issue(&rider(), Duration::days(7)).unwrap();

        let err = verifier().verify(&token).unwrap_err();
        assert!(err.is_unauthorized_error());
    }

    #[test]
    fn garbage_token_is_unauthenticated() {
        let err = verifier().verify("not.a.jwt").unwrap_err();
        assert!(err.is_unauthorized_error());
    }

    #[test]
    fn header_requires_bearer_scheme() {
        let verifier = verifier();
        let token = verifier.issue(&rider(), Duration::days(7)).unwrap();

        let header = format!("Bearer {}", token);
        assert_eq!(verifier.verify_header(Some(&header)).unwrap(), rider());

        let basic = format!("Basic {}", token);
        assert!(verifier.verify_header(Some(&basic)).is_err());
        assert!(verifier.verify_header(Some(&token)).is_err());
        assert!(verifier.verify_header(Some("Bearer ")).is_err());
        assert!(verifier.verify_header(None).is_err());
    }

    #[test]
    fn bearer_token_extraction() {
        assert_eq!(bearer_token(Some("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(Some("Bearer  abc ")), Some("abc"));
        assert_eq!(bearer_token(Some("bearer abc")), None);
        assert_eq!(bearer_token(None), None);
    }
}
