// POST /users/register, POST /users/login, GET /users/token

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{extract::State, response::Json, Extension};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{generate_jwt, Claims};
use crate::config;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Login failures never reveal whether the username exists.
const BAD_CREDENTIALS: &str = "Incorrect username or password";

#[derive(Debug, Default, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// POST /users/register - create an account and return a signed token
pub async fn register_post(
    State(state): State<AppState>,
    body: Option<Json<CredentialsRequest>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let (username, password) = validate_credentials(&body)?;

    if state
        .store
        .find_user_by_username(username)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("Username already exists, please login."));
    }

    let password_hash = hash_password(password)?;
    let user = state.store.create_user(username, &password_hash).await?;

    let secret = &config::config().security.jwt_secret;
    let token = generate_jwt(&Claims::new(user.id), secret)?;

    Ok(Json(json!({ "success": true, "token": token })))
}

/// POST /users/login - verify credentials and return a signed token
pub async fn login_post(
    State(state): State<AppState>,
    body: Option<Json<CredentialsRequest>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let (username, password) = validate_credentials(&body)?;

    let user = state
        .store
        .find_user_by_username(username)
        .await?
        .ok_or_else(|| ApiError::unauthorized(BAD_CREDENTIALS))?;

    if !verify_password(password, &user.password) {
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    }

    let secret = &config::config().security.jwt_secret;
    let token = generate_jwt(&Claims::new(user.id), secret)?;

    Ok(Json(json!({ "success": true, "token": token })))
}

/// GET /users/token - return the user resolved from the bearer token
pub async fn token_get(
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Value>, ApiError> {
    let user = current.require("You must be logged in.")?;
    Ok(Json(json!({ "success": true, "user": user })))
}

/// Credential shape shared by register and login: username 3-20 chars,
/// password required.
fn validate_credentials(body: &CredentialsRequest) -> Result<(&str, &str), ApiError> {
    let username = match body.username.as_deref() {
        Some(u) if !u.is_empty() => u,
        _ => return Err(ApiError::validation("Username must be provided.")),
    };

    let length = username.chars().count();
    if !(3..=20).contains(&length) {
        return Err(ApiError::validation(
            "Username must be between 3 and 20 characters long.",
        ));
    }

    let password = match body.password.as_deref() {
        Some(p) if !p.is_empty() => p,
        _ => return Err(ApiError::validation("Password must be provided.")),
    };

    Ok((username, password))
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!("password hashing failed: {}", e);
            ApiError::internal("An error occurred while processing your request.")
        })
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
