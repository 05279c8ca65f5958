use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::verify_jwt;
use crate::config;
use crate::database::models::UserPublic;
use crate::error::ApiError;
use crate::state::AppState;

/// Current user resolved from the bearer token, if any. `None` means the
/// request is anonymous.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub Option<UserPublic>);

impl CurrentUser {
    /// Unwrap the current user or fail with the handler's own message.
    pub fn require(&self, message: &str) -> Result<&UserPublic, ApiError> {
        self.0
            .as_ref()
            .ok_or_else(|| ApiError::unauthorized(message))
    }
}

/// Optional-auth middleware, run once per request before routing.
///
/// A missing, malformed, or expired token never fails the pipeline here:
/// the request proceeds anonymously and handlers that need a user reject
/// with their own messages.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let current = resolve_current_user(&state, request.headers()).await;
    request.extensions_mut().insert(CurrentUser(current));
    next.run(request).await
}

async fn resolve_current_user(state: &AppState, headers: &HeaderMap) -> Option<UserPublic> {
    let token = bearer_token(headers)?;

    let secret = &config::config().security.jwt_secret;
    let claims = match verify_jwt(token, secret) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("ignoring invalid bearer token: {}", e);
            return None;
        }
    };

    // Token may outlive its user; treat a vanished subject as anonymous
    let user = match state.store.find_user_by_id(claims.user_id).await {
        Ok(user) => user?,
        Err(e) => {
            tracing::debug!("user lookup failed for token subject {}: {}", claims.user_id, e);
            return None;
        }
    };

    Some(user.into())
}

/// Extract the bearer token from the Authorization header, if present.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
