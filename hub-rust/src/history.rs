//! Caller-supplied conversation history.
//!
//! The server keeps no transcript; the client resends the whole history with
//! every message. Earlier model turns often come back as the structured object
//! the client received, so content is either text or a [`StructuredReply`].
//! The model client only accepts text, hence [`sanitize_history`].

use crate::{AssistantError, StructuredReply};
use hub_llm::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnContent {
    Text(String),
    Structured(StructuredReply),
}

impl TurnContent {
    /// Collapse the content to text. Structured replies become their canonical
    /// JSON string.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Structured(reply) => reply.to_json_string(),
        }
    }
}

impl From<&str> for TurnContent {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<StructuredReply> for TurnContent {
    fn from(value: StructuredReply) -> Self {
        Self::Structured(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: TurnContent,
}

impl ConversationTurn {
    pub fn user(content: impl Into<TurnContent>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<TurnContent>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
        }
    }
}

/// Parse the wire form `[{ "role": "user" | "model", "content": string | object }]`.
///
/// Fails with [`AssistantError::InvalidRequest`] naming the first bad entry.
pub fn parse_history(entries: &[Value]) -> Result<Vec<ConversationTurn>, AssistantError> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            parse_turn(entry).map_err(|reason| {
                AssistantError::InvalidRequest(format!("history entry {index}: {reason}"))
            })
        })
        .collect()
}

fn parse_turn(entry: &Value) -> Result<ConversationTurn, String> {
    let object = entry
        .as_object()
        .ok_or_else(|| "expected an object".to_string())?;

    let role = match object.get("role").and_then(Value::as_str) {
        Some("user") => Role::User,
        Some("model") => Role::Model,
        Some(other) => return Err(format!("unknown role '{other}'")),
        None => return Err("missing role".to_string()),
    };

    let content = match object.get("content") {
        Some(Value::String(text)) => TurnContent::Text(text.clone()),
        Some(value @ Value::Object(_)) => TurnContent::Structured(
            serde_json::from_value(value.clone())
                .map_err(|error| format!("content is not a reply object: {error}"))?,
        ),
        Some(_) => return Err("content must be a string or an object".to_string()),
        None => return Err("missing content".to_string()),
    };

    Ok(ConversationTurn { role, content })
}

/// Rewrite every turn so its content is text, preserving count and order.
///
/// The collapse does not depend on the role: a user turn carrying a structured
/// object is serialized the same way as a model turn.
#[must_use]
pub fn sanitize_history(turns: Vec<ConversationTurn>) -> Vec<ConversationTurn> {
    turns
        .into_iter()
        .map(|turn| ConversationTurn {
            role: turn.role,
            content: TurnContent::Text(turn.content.into_text()),
        })
        .collect()
}

/// Convert turns into model-client messages.
#[must_use]
pub fn to_messages(turns: Vec<ConversationTurn>) -> Vec<Message> {
    turns
        .into_iter()
        .map(|turn| {
            let text = turn.content.into_text();
            match turn.role {
                Role::User => Message::user([text]),
                Role::Model => Message::assistant([text]),
            }
        })
        .collect()
}
