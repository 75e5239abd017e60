use async_trait::async_trait;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::LoginResult;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::user::models::User;

/// Port for credential issuance.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Create a new account.
    ///
    /// # Arguments
    /// * `command` - Validated registration data with plaintext password
    ///
    /// # Returns
    /// Created user with the password hash cleared
    ///
    /// # Errors
    /// * `DuplicateEmail` - Email is already registered (checked first)
    /// * `DuplicateUsername` - Username is already taken
    /// * `HashingFailed` - Password could not be hashed
    /// * `PersistenceFailed` - Storage operation failed
    async fn register(&self, command: RegisterCommand) -> Result<User, AuthError>;

    /// Exchange email and password for an access token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email, wrong password or inactive account
    /// * `PersistenceFailed` - Lookup failed
    /// * `TokenIssuanceFailed` - Token could not be signed
    async fn login(&self, command: LoginCommand) -> Result<LoginResult, AuthError>;
}
