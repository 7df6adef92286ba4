//! HTTP surface of the hub.

mod account;
mod chat;
mod posts;
mod projects;

use crate::{auth::TokenSigner, store::Store, Assistant, HubError};
use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{header, request::Parts},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub tokens: Arc<TokenSigner>,
    pub assistant: Arc<Assistant>,
    pub password_hash_rounds: u32,
}

/// The authenticated caller, taken from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: u64,
    pub email: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = HubError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| HubError::Unauthorized("Authentication required".to_string()))?;

        let claims = state.tokens.verify(token).map_err(|error| {
            tracing::debug!(%error, "rejected token");
            HubError::Unauthorized("Invalid or expired token".to_string())
        })?;

        Ok(Self {
            id: claims.id,
            email: claims.email,
        })
    }
}

/// JSON request body. A body that does not parse is answered with a
/// `{ "message" }` 400 instead of axum's plain-text rejection.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = HubError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Path parameters, rejected the same way as [`JsonBody`].
pub struct PathParams<T>(pub T);

impl<S, T> FromRequestParts<S> for PathParams<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = HubError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/api/signup", post(account::signup_handler))
        .route("/api/login", post(account::login_handler))
        .route(
            "/api/projects",
            get(projects::list_projects_handler).post(projects::create_project_handler),
        )
        .route("/api/projects/{id}", delete(projects::delete_project_handler))
        .route("/api/projects/{id}/todos", post(projects::add_todo_handler))
        .route(
            "/api/projects/{id}/todos/{todo_id}",
            put(projects::toggle_todo_handler),
        )
        .route(
            "/api/projects/{id}/materials",
            post(projects::add_material_handler),
        )
        .route(
            "/api/posts",
            get(posts::list_posts_handler).post(posts::create_post_handler),
        )
        .route("/api/posts/{id}", delete(posts::delete_post_handler))
        .route("/api/chat", post(chat::chat_handler))
        .route("/api/project-ideas", get(chat::project_ideas_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn home_handler() -> &'static str {
    "Welcome to the Project Hub API!"
}
