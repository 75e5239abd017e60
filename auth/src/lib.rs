//! Authentication core library
//!
//! Provides the credential and session primitives the account service is built on:
//! - Password hashing (Argon2id)
//! - Session token issuance and validation (HS256 JWT, pinned algorithm)
//! - An injectable clock for deterministic expiry checks
//! - Authentication coordination
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).is_ok());
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::{JwtHandler, Principal};
//! use chrono::Duration;
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(24)).unwrap();
//! let principal = Principal::new("user123", "alice@example.com", "alice");
//! let token = handler.issue(&principal).unwrap();
//! let claims = handler.parse(&token).unwrap();
//! assert_eq!(claims.principal(), principal);
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, JwtHandler, PasswordHasher, Principal};
//! use chrono::Duration;
//!
//! let auth = Authenticator::new(
//!     PasswordHasher::new(),
//!     JwtHandler::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(24)).unwrap(),
//! );
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify, then generate token
//! auth.verify_password("password123", &hash).unwrap();
//! let principal = Principal::new("user123", "alice@example.com", "alice");
//! let token = auth.generate_token(&principal).unwrap();
//!
//! // Validate token
//! let claims = auth.validate_token(&token).unwrap();
//! assert_eq!(claims.user_id(), "user123");
//! ```

pub mod authenticator;
pub mod clock;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use clock::Clock;
pub use clock::FixedClock;
pub use clock::SystemClock;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::Principal;
pub use jwt::SessionClaims;
pub use jwt::DEFAULT_TOKEN_TTL_HOURS;
pub use password::PasswordError;
pub use password::PasswordHasher;
