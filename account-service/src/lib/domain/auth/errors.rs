use auth::AuthenticationError;
use auth::JwtError;
use auth::PasswordError;
use thiserror::Error;

use crate::user::errors::UserError;

/// Error for password policy violations at registration
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Password too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Caller-visible error for register and login.
///
/// Login never says whether the email or the password was wrong.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Email already exists: {0}")]
    DuplicateEmail(String),

    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Token issuance failed: {0}")]
    TokenIssuanceFailed(String),

    #[error("Persistence failed: {0}")]
    PersistenceFailed(String),
}

impl From<UserError> for AuthError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::EmailAlreadyExists(email) => AuthError::DuplicateEmail(email),
            UserError::UsernameAlreadyExists(username) => AuthError::DuplicateUsername(username),
            other => AuthError::PersistenceFailed(other.to_string()),
        }
    }
}

/// Internal cause of a failed login, kept for logging only.
#[derive(Debug)]
pub enum LoginFailure {
    UnknownEmail,
    PasswordMismatch,
    MalformedStoredHash(String),
    Inactive,
    Lookup(UserError),
    Verification(String),
    Signing(JwtError),
}

impl From<AuthenticationError> for LoginFailure {
    fn from(err: AuthenticationError) -> Self {
        match err {
            AuthenticationError::InvalidCredentials => LoginFailure::PasswordMismatch,
            AuthenticationError::PasswordError(PasswordError::MalformedHash(reason)) => {
                LoginFailure::MalformedStoredHash(reason)
            }
            AuthenticationError::PasswordError(other) => {
                LoginFailure::Verification(other.to_string())
            }
        }
    }
}

impl From<LoginFailure> for AuthError {
    fn from(failure: LoginFailure) -> Self {
        match failure {
            LoginFailure::UnknownEmail
            | LoginFailure::PasswordMismatch
            | LoginFailure::MalformedStoredHash(_)
            | LoginFailure::Inactive => AuthError::InvalidCredentials,
            LoginFailure::Lookup(err) => AuthError::PersistenceFailed(err.to_string()),
            LoginFailure::Verification(reason) => AuthError::HashingFailed(reason),
            LoginFailure::Signing(err) => AuthError::TokenIssuanceFailed(err.to_string()),
        }
    }
}
