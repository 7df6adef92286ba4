use super::{AppState, JsonBody};
use crate::{
    auth::{hash_password, verify_password},
    models::{normalize_email, User, UserInfo},
    HubError,
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct Credentials {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    token: String,
    user: UserInfo,
}

impl Credentials {
    fn validate(self) -> Result<(String, String), HubError> {
        let email = normalize_email(&self.email);
        if email.is_empty() || self.password.is_empty() {
            return Err(HubError::BadRequest(
                "Email and password are required".to_string(),
            ));
        }
        Ok((email, self.password))
    }
}

pub async fn signup_handler(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Credentials>,
) -> Result<(StatusCode, Json<UserInfo>), HubError> {
    let (email, password) = body.validate()?;

    if state
        .store
        .read(|db| db.find_user_by_email(&email).is_some())
        .await
    {
        return Err(HubError::Conflict("User already exists".to_string()));
    }

    let rounds = state.password_hash_rounds;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, rounds))
        .await
        .map_err(|error| HubError::Internal(error.to_string()))?;

    let user = state
        .store
        .update(|db| {
            // Checked again under the lock.
            if db.find_user_by_email(&email).is_some() {
                return Err(HubError::Conflict("User already exists".to_string()));
            }
            let user = User {
                id: db.next_id(),
                email: email.clone(),
                password_hash,
                created_at: Utc::now(),
            };
            db.users.push(user.clone());
            Ok(user)
        })
        .await?;

    tracing::info!(user_id = user.id, "user signed up");
    Ok((StatusCode::CREATED, Json(UserInfo::from(&user))))
}

pub async fn login_handler(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Credentials>,
) -> Result<Json<LoginResponse>, HubError> {
    let (email, password) = body.validate()?;
    let invalid = || HubError::Unauthorized("Invalid credentials".to_string());

    let user = state
        .store
        .read(|db| db.find_user_by_email(&email).cloned())
        .await
        .ok_or_else(invalid)?;

    let password_hash = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .map_err(|error| HubError::Internal(error.to_string()))?
        .map_err(|error| HubError::Internal(format!("user {}: {error}", user.id)))?;

    if !matches {
        tracing::info!(user_id = user.id, "login rejected");
        return Err(invalid());
    }

    let token = state
        .tokens
        .issue(user.id, &user.email)
        .map_err(|error| HubError::Internal(error.to_string()))?;

    tracing::info!(user_id = user.id, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user: UserInfo::from(&user),
    }))
}
