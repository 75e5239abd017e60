use std::sync::Arc;

use auth::Authenticator;
use auth::JwtError;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use thiserror::Error;

use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::user::errors::UserIdError;

const BEARER_PREFIX: &str = "Bearer ";

/// Principal of an authenticated request, stored in its extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub email: String,
    pub username: String,
}

/// Reason a request was turned away by the gate. Logged, never returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Authorization header is not visible ASCII")]
    InvalidHeader,

    #[error("Authorization scheme is not Bearer")]
    WrongScheme,

    #[error("Empty bearer token")]
    EmptyToken,

    #[error("Token rejected: {0}")]
    Token(#[from] JwtError),

    #[error("Token subject is not a user ID: {0}")]
    Subject(#[from] UserIdError),
}

/// Resolve the caller from the `Authorization: Bearer <token>` header.
///
/// # Errors
/// * `GateError` - Header missing or malformed, or token invalid
pub fn authorize(
    headers: &HeaderMap,
    authenticator: &Authenticator,
) -> Result<AuthenticatedUser, GateError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(GateError::MissingHeader)?
        .to_str()
        .map_err(|_| GateError::InvalidHeader)?;

    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(GateError::WrongScheme)?
        .trim();

    if token.is_empty() {
        return Err(GateError::EmptyToken);
    }

    let claims = authenticator.validate_token(token)?;
    let user_id = UserId::from_string(claims.user_id())?;
    let principal = claims.into_principal();

    Ok(AuthenticatedUser {
        user_id,
        email: principal.email,
        username: principal.username,
    })
}

/// Middleware that validates the bearer token and adds the caller to request extensions.
///
/// Every rejection is the same 401 response.
pub async fn authenticate(
    State(authenticator): State<Arc<Authenticator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authorize(req.headers(), &authenticator).map_err(|reason| {
        tracing::debug!(
            method = %req.method(),
            uri = %req.uri(),
            reason = %reason,
            "Request rejected by authorization gate"
        );
        ApiError::Unauthorized("Unauthorized".to_string())
    })?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use auth::FixedClock;
    use auth::JwtHandler;
    use auth::PasswordHasher;
    use auth::Principal;
    use axum::body::Body;
    use axum::body::Bytes;
    use axum::http::HeaderValue;
    use axum::http::StatusCode;
    use axum::middleware;
    use axum::routing::get;
    use axum::Extension;
    use axum::Router;
    use chrono::Duration;
    use tower::ServiceExt;

    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn authenticator() -> Authenticator {
        Authenticator::new(
            PasswordHasher::with_params(1024, 1, 1).unwrap(),
            JwtHandler::new(SECRET, Duration::hours(24)).unwrap(),
        )
    }

    fn valid_token(authenticator: &Authenticator, user_id: &UserId) -> String {
        authenticator
            .generate_token(&Principal::new(user_id, "a@x.com", "alice"))
            .unwrap()
    }

    fn expired_token(user_id: &UserId) -> String {
        let stale = JwtHandler::new(SECRET, Duration::hours(1))
            .unwrap()
            .with_clock(Arc::new(FixedClock::at_timestamp(1_000_000)));
        stale
            .issue(&Principal::new(user_id, "a@x.com", "alice"))
            .unwrap()
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_authorize_success() {
        let authenticator = authenticator();
        let user_id = UserId::new();
        let token = valid_token(&authenticator, &user_id);

        let user = authorize(&headers_with(&format!("Bearer {}", token)), &authenticator).unwrap();
        assert_eq!(
            user,
            AuthenticatedUser {
                user_id,
                email: "a@x.com".to_string(),
                username: "alice".to_string(),
            }
        );
    }

    #[test]
    fn test_authorize_rejections() {
        let authenticator = authenticator();
        let user_id = UserId::new();
        let token = valid_token(&authenticator, &user_id);

        assert_eq!(
            authorize(&HeaderMap::new(), &authenticator),
            Err(GateError::MissingHeader)
        );
        assert_eq!(
            authorize(&headers_with(&format!("Basic {}", token)), &authenticator),
            Err(GateError::WrongScheme)
        );
        assert_eq!(
            authorize(&headers_with(&format!("bearer {}", token)), &authenticator),
            Err(GateError::WrongScheme)
        );
        assert_eq!(
            authorize(&headers_with("Bearer "), &authenticator),
            Err(GateError::EmptyToken)
        );
        assert_eq!(
            authorize(&headers_with("Bearer    "), &authenticator),
            Err(GateError::EmptyToken)
        );
        assert_eq!(
            authorize(
                &headers_with(&format!("Bearer {}", expired_token(&user_id))),
                &authenticator
            ),
            Err(GateError::Token(JwtError::Expired))
        );
        assert!(matches!(
            authorize(&headers_with("Bearer a.b.c"), &authenticator),
            Err(GateError::Token(JwtError::Malformed(_)))
        ));

        let mut opaque = HeaderMap::new();
        opaque.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xfftoken").unwrap(),
        );
        assert_eq!(
            authorize(&opaque, &authenticator),
            Err(GateError::InvalidHeader)
        );
    }

    #[test]
    fn test_authorize_rejects_non_uuid_subject() {
        let authenticator = authenticator();
        let token = authenticator
            .generate_token(&Principal::new("user123", "a@x.com", "alice"))
            .unwrap();

        assert!(matches!(
            authorize(&headers_with(&format!("Bearer {}", token)), &authenticator),
            Err(GateError::Subject(_))
        ));
    }

    fn gated_app(authenticator: Arc<Authenticator>, hits: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route(
                "/protected",
                get(move |Extension(user): Extension<AuthenticatedUser>| {
                    let hits = Arc::clone(&hits);
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        user.username
                    }
                }),
            )
            .route_layer(middleware::from_fn_with_state(authenticator, authenticate))
    }

    async fn call(app: Router, authorization: Option<String>) -> (StatusCode, Bytes) {
        let mut request = axum::http::Request::builder().uri("/protected");
        if let Some(value) = authorization {
            request = request.header(header::AUTHORIZATION, value);
        }

        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn test_gate_rejections_are_uniform() {
        let authenticator = Arc::new(authenticator());
        let hits = Arc::new(AtomicUsize::new(0));
        let user_id = UserId::new();

        let rejected = [
            None,
            Some(format!("Token {}", valid_token(&authenticator, &user_id))),
            Some("Bearer ".to_string()),
            Some(format!("Bearer {}", expired_token(&user_id))),
            Some("Bearer not-a-token".to_string()),
        ];

        let mut bodies = Vec::new();
        for authorization in rejected {
            let (status, body) = call(
                gated_app(Arc::clone(&authenticator), Arc::clone(&hits)),
                authorization,
            )
            .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            bodies.push(body);
        }

        assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&bodies[0]).unwrap(),
            serde_json::json!({"status_code": 401, "data": {"message": "Unauthorized"}})
        );
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_gate_passes_principal_to_handler() {
        let authenticator = Arc::new(authenticator());
        let hits = Arc::new(AtomicUsize::new(0));
        let token = valid_token(&authenticator, &UserId::new());

        let (status, body) = call(
            gated_app(Arc::clone(&authenticator), Arc::clone(&hits)),
            Some(format!("Bearer {}", token)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"alice");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
