use super::{AppState, AuthUser, JsonBody};
use crate::{
    history::parse_history, AssistantRequest, HubError, ProjectContext, ProjectIdea,
    StructuredReply,
};
use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::Value;

/// Wire form of a chat message. History entries are validated by
/// [`parse_history`] so a bad entry yields a precise 400.
#[derive(Deserialize)]
pub struct ChatBody {
    #[serde(default)]
    history: Vec<Value>,
    #[serde(default)]
    prompt: String,
    #[serde(default)]
    context: ProjectContext,
}

pub async fn chat_handler(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(body): JsonBody<ChatBody>,
) -> Result<Json<StructuredReply>, HubError> {
    let history = parse_history(&body.history)?;

    tracing::info!(user_id = user.id, turns = history.len(), "chat request");

    let reply = state
        .assistant
        .ask(AssistantRequest {
            history,
            prompt: body.prompt,
            context: body.context,
        })
        .await?;

    Ok(Json(reply))
}

pub async fn project_ideas_handler(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ProjectIdea>>, HubError> {
    tracing::info!(user_id = user.id, "project ideas request");
    let ideas = state.assistant.suggest_ideas().await?;
    Ok(Json(ideas))
}
