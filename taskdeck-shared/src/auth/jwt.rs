/// Bearer token issuance and validation
///
/// This module provides the stateless session tokens used for request
/// authentication. Tokens are signed JWTs carrying the user id; the signing
/// secret is injected at construction so nothing here reads process globals.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: fixed one hour from issuance
/// - **Validation**: signature and expiration checks, with zero leeway
/// - **Secret Management**: secrets should be at least 32 bytes (256 bits)
///
/// There is no server-side revocation. A token stays valid until its
/// expiration instant regardless of logout.
///
/// # Example
///
/// ```
/// use taskdeck_shared::auth::jwt::TokenService;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenService::new("your-secret-key-at-least-32-bytes");
///
/// let user_id = Uuid::new_v4();
/// let token = tokens.issue(user_id)?;
///
/// assert_eq!(tokens.verify(&token)?, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How long an issued token stays valid.
const TOKEN_LIFETIME_SECONDS: i64 = 3600;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to sign a new token
    #[error("Failed to sign token: {0}")]
    Signing(String),

    /// Token could not be parsed as a JWT
    #[error("Malformed token")]
    Malformed,

    /// Signature does not match the configured secret
    #[error("Token signature mismatch")]
    BadSignature,

    /// Token has expired
    #[error("Token has expired")]
    Expired,
}

/// Claim set embedded in every issued token
///
/// # Claims
///
/// - `sub`: Subject (user ID)
/// - `iat`: Issued at (Unix timestamp)
/// - `exp`: Expiration time (Unix timestamp)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Checks if the claim set has passed its expiration instant
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Issues and verifies signed bearer tokens
///
/// Owns the encoding and decoding keys derived from the configured secret.
/// Cheap to clone; one instance is shared through application state.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl TokenService {
    /// Creates a token service with the standard one hour lifetime
    ///
    /// # Arguments
    ///
    /// * `secret` - Secret key for signing (should be at least 32 bytes)
    pub fn new(secret: &str) -> Self {
        Self::with_lifetime(secret, Duration::seconds(TOKEN_LIFETIME_SECONDS))
    }

    /// Creates a token service with a custom lifetime
    ///
    /// Mainly useful in tests, where a negative lifetime produces an
    /// already-expired token.
    pub fn with_lifetime(secret: &str, lifetime: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime,
        }
    }

    /// Issues a signed token for the given user
    ///
    /// # Returns
    ///
    /// Base64-encoded JWT string with `sub`, `iat`, and `exp` claims
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails
    pub fn issue(&self, user_id: Uuid) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(format!("Token encoding failed: {}", e)))
    }

    /// Verifies a token and extracts the user id it was issued for
    ///
    /// Leeway is disabled so a token is rejected the instant its `exp`
    /// passes. The returned id is taken from the claims as-is; whether that
    /// user still exists is the caller's concern.
    ///
    /// # Errors
    ///
    /// - `TokenError::Expired` if `exp` is in the past
    /// - `TokenError::BadSignature` if the signature does not match
    /// - `TokenError::Malformed` for anything that does not parse as a JWT
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            })?;

        Ok(token_data.claims.sub)
    }
}
