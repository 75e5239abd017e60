use std::fmt;

use crate::domain::auth::errors::PasswordPolicyError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;

const PASSWORD_MIN_LENGTH: usize = 6;
const PASSWORD_MAX_LENGTH: usize = 128;

/// Check a plaintext password against the registration policy (6-128 characters).
///
/// # Errors
/// * `TooShort` - Fewer than 6 characters
/// * `TooLong` - More than 128 characters
pub fn check_password_policy(password: &str) -> Result<(), PasswordPolicyError> {
    let length = password.chars().count();
    if length < PASSWORD_MIN_LENGTH {
        Err(PasswordPolicyError::TooShort {
            min: PASSWORD_MIN_LENGTH,
            actual: length,
        })
    } else if length > PASSWORD_MAX_LENGTH {
        Err(PasswordPolicyError::TooLong {
            max: PASSWORD_MAX_LENGTH,
            actual: length,
        })
    } else {
        Ok(())
    }
}

/// Command to register a new account.
pub struct RegisterCommand {
    pub email: EmailAddress,
    pub username: Username,
    pub password: String,
    pub first_name: PersonName,
    pub last_name: PersonName,
}

impl fmt::Debug for RegisterCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterCommand")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

/// Command to log in with email and password.
pub struct LoginCommand {
    pub email: EmailAddress,
    pub password: String,
}

impl fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCommand")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login: the user (hash cleared) and a signed access token.
pub struct LoginResult {
    pub user: User,
    pub access_token: String,
}
