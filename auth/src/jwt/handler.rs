use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::Error as JsonWebTokenError;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Principal;
use super::claims::SessionClaims;
use super::errors::JwtError;
use crate::clock::Clock;
use crate::clock::SystemClock;

/// Lifetime of a session token unless configured otherwise.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// JWT token handler for issuing and parsing session tokens.
///
/// Signs with HS256 and accepts nothing else: a token whose header declares
/// any other algorithm is rejected before its signature is looked at.
/// Expiry and not-before are checked against the handler's [`Clock`].
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens
    /// * `ttl` - Lifetime of issued tokens
    ///
    /// # Returns
    /// JwtHandler using the system clock
    ///
    /// # Errors
    /// * `InvalidSecret` - Secret is empty
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret(
                "secret must not be empty".to_string(),
            ));
        }

        let algorithm = Algorithm::HS256;

        let mut validation = Validation::new(algorithm);
        validation.required_spec_claims.clear();
        // Time claims are checked against the injected clock in `parse`
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm,
            validation,
            ttl,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Lifetime of tokens issued by this handler.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a signed token for a principal.
    ///
    /// # Arguments
    /// * `principal` - Identity to embed
    ///
    /// # Returns
    /// Compact JWT string
    ///
    /// # Errors
    /// * `SigningFailed` - Token encoding failed
    pub fn issue(&self, principal: &Principal) -> Result<String, JwtError> {
        let claims = SessionClaims::mint(principal, self.clock.now(), self.ttl);
        let header = Header::new(self.algorithm);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| JwtError::SigningFailed(e.to_string()))
    }

    /// Verify a token and return its claims.
    ///
    /// # Arguments
    /// * `token` - JWT token string
    ///
    /// # Returns
    /// Verified session claims
    ///
    /// # Errors
    /// * `Malformed` - Not a three-part token, or a part does not decode
    /// * `SignatureMismatch` - Wrong signature or an algorithm other than HS256
    /// * `Expired` - Current time is past `exp`
    /// * `NotYetValid` - Current time is before `nbf`
    pub fn parse(&self, token: &str) -> Result<SessionClaims, JwtError> {
        let claims = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(classify)?
            .claims;

        let now = self.clock.now().timestamp();
        if claims.is_expired(now) {
            return Err(JwtError::Expired);
        }
        if claims.is_premature(now) {
            return Err(JwtError::NotYetValid);
        }

        Ok(claims)
    }
}

impl fmt::Debug for JwtHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtHandler")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

fn classify(error: JsonWebTokenError) -> JwtError {
    match error.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => JwtError::SignatureMismatch,
        ErrorKind::ExpiredSignature => JwtError::Expired,
        ErrorKind::ImmatureSignature => JwtError::NotYetValid,
        _ => JwtError::Malformed(error.to_string()),
    }
}
