use super::{AppState, AuthUser, PathParams};
use crate::{models::Post, HubError};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

pub async fn list_posts_handler(State(state): State<AppState>) -> Json<Vec<Post>> {
    let mut posts = state.store.read(|db| db.posts.clone()).await;
    posts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
    Json(posts)
}

/// Multipart form with a `content` text field. An `image` field is accepted
/// and discarded.
pub async fn create_post_handler(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Post>), HubError> {
    let mut multipart = multipart?;
    let mut content = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| HubError::BadRequest(error.body_text()))?
    {
        match field.name() {
            Some("content") => {
                content = field
                    .text()
                    .await
                    .map_err(|error| HubError::BadRequest(error.body_text()))?;
            }
            Some("image") => {
                let image = field
                    .bytes()
                    .await
                    .map_err(|error| HubError::BadRequest(error.body_text()))?;
                tracing::debug!(bytes = image.len(), "ignoring uploaded post image");
            }
            _ => {}
        }
    }

    let content = content.trim().to_string();
    if content.is_empty() {
        return Err(HubError::BadRequest("Post content is required".to_string()));
    }

    let post = state
        .store
        .update(|db| {
            let post = Post {
                id: db.next_id(),
                user_id: user.id,
                user_email: user.email.clone(),
                content,
                image_url: None,
                timestamp: Utc::now(),
            };
            db.posts.push(post.clone());
            Ok::<_, HubError>(post)
        })
        .await?;

    tracing::info!(user_id = user.id, post_id = post.id, "post created");
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn delete_post_handler(
    State(state): State<AppState>,
    user: AuthUser,
    PathParams(post_id): PathParams<u64>,
) -> Result<StatusCode, HubError> {
    state
        .store
        .update(|db| {
            let index = db
                .posts
                .iter()
                .position(|post| post.id == post_id)
                .ok_or_else(|| HubError::NotFound("Post not found".to_string()))?;
            if db.posts[index].user_id != user.id {
                return Err(HubError::Forbidden(
                    "You can only delete your own posts".to_string(),
                ));
            }
            db.posts.remove(index);
            Ok(())
        })
        .await?;

    tracing::info!(user_id = user.id, post_id, "post deleted");
    Ok(StatusCode::NO_CONTENT)
}
