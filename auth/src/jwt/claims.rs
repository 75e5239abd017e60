use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Identity carried by a session token.
///
/// Supplied when a token is issued and recovered when it is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Opaque user identifier
    pub user_id: String,
    pub email: String,
    pub username: String,
}

impl Principal {
    pub fn new(
        user_id: impl ToString,
        email: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            email: email.into(),
            username: username.into(),
        }
    }
}

/// Session token payload.
///
/// Timestamps are Unix seconds. `nbf` always equals `iat`, and `exp` is
/// `iat` plus the issuing handler's TTL. Fields are private so minted claims
/// cannot be altered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    user_id: String,
    email: String,
    username: String,
    iat: i64,
    nbf: i64,
    exp: i64,
}

impl SessionClaims {
    /// Mint claims for a principal at `now` expiring after `ttl`.
    pub(crate) fn mint(principal: &Principal, now: DateTime<Utc>, ttl: Duration) -> Self {
        let issued_at = now.timestamp();

        Self {
            user_id: principal.user_id.clone(),
            email: principal.email.clone(),
            username: principal.username.clone(),
            iat: issued_at,
            nbf: issued_at,
            exp: issued_at + ttl.num_seconds(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Issued at (Unix timestamp)
    pub fn issued_at(&self) -> i64 {
        self.iat
    }

    /// Not before (Unix timestamp)
    pub fn not_before(&self) -> i64 {
        self.nbf
    }

    /// Expiration time (Unix timestamp)
    pub fn expires_at(&self) -> i64 {
        self.exp
    }

    /// Check if token is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp > self.exp
    }

    /// Check if token is not valid yet.
    pub fn is_premature(&self, current_timestamp: i64) -> bool {
        current_timestamp < self.nbf
    }

    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            username: self.username.clone(),
        }
    }

    pub fn into_principal(self) -> Principal {
        Principal {
            user_id: self.user_id,
            email: self.email,
            username: self.username,
        }
    }
}
