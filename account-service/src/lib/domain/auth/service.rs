use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::Principal;
use chrono::Utc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::LoginFailure;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::LoginResult;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::ports::UserRepository;

/// Domain service for registration and login.
///
/// Argon2 work runs on the blocking pool; every step of a call is sequential.
pub struct AuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> AuthService<UR>
where
    UR: UserRepository,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Shared password hasher and token codec
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let authenticator = Arc::clone(&self.authenticator);
        tokio::task::spawn_blocking(move || authenticator.hash_password(&password))
            .await
            .map_err(|e| AuthError::HashingFailed(e.to_string()))?
            .map_err(|e| AuthError::HashingFailed(e.to_string()))
    }

    async fn attempt_login(&self, command: LoginCommand) -> Result<LoginResult, LoginFailure> {
        let found = self
            .repository
            .find_by_email(&command.email)
            .await
            .map_err(LoginFailure::Lookup)?;

        let authenticator = Arc::clone(&self.authenticator);
        let password = command.password;

        let Some(user) = found else {
            // Same Argon2 cost as a wrong password
            tokio::task::spawn_blocking(move || authenticator.spend_decoy_verification(&password))
                .await
                .map_err(|e| LoginFailure::Verification(e.to_string()))?;
            return Err(LoginFailure::UnknownEmail);
        };

        let stored_hash = user.password_hash.clone();
        tokio::task::spawn_blocking(move || authenticator.verify_password(&password, &stored_hash))
            .await
            .map_err(|e| LoginFailure::Verification(e.to_string()))??;

        if !user.is_active {
            return Err(LoginFailure::Inactive);
        }

        let principal = Principal::new(user.id, user.email.as_str(), user.username.as_str());
        let access_token = self
            .authenticator
            .generate_token(&principal)
            .map_err(LoginFailure::Signing)?;

        Ok(LoginResult {
            user: user.without_password(),
            access_token,
        })
    }
}

#[async_trait]
impl<UR> AuthServicePort for AuthService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<User, AuthError> {
        if self
            .repository
            .find_by_email(&command.email)
            .await?
            .is_some()
        {
            return Err(AuthError::DuplicateEmail(command.email.to_string()));
        }

        if self
            .repository
            .find_by_username(&command.username)
            .await?
            .is_some()
        {
            return Err(AuthError::DuplicateUsername(command.username.to_string()));
        }

        let password_hash = self.hash_password(command.password).await?;

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            email: command.email,
            username: command.username,
            password_hash,
            first_name: command.first_name,
            last_name: command.last_name,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(
            user_id = %created_user.id,
            username = %created_user.username,
            "User registered"
        );

        Ok(created_user.without_password())
    }

    async fn login(&self, command: LoginCommand) -> Result<LoginResult, AuthError> {
        let email = command.email.clone();

        match self.attempt_login(command).await {
            Ok(result) => {
                tracing::info!(user_id = %result.user.id, "User logged in");
                Ok(result)
            }
            Err(failure) => {
                match &failure {
                    LoginFailure::UnknownEmail
                    | LoginFailure::PasswordMismatch
                    | LoginFailure::Inactive => {
                        tracing::debug!(email = %email, reason = ?failure, "Login rejected");
                    }
                    _ => {
                        tracing::error!(email = %email, reason = ?failure, "Login failed");
                    }
                }
                Err(failure.into())
            }
        }
    }
}
