//! Recovery of a [`StructuredReply`] from free-form model text.
//!
//! Models wrap their JSON in prose or code fences despite instructions, so the
//! reply is located by brace matching: the span from the first `{` to the last
//! `}` is parsed, everything outside it is discarded.

use crate::AssistantError;
use serde::{Deserialize, Serialize};

/// The assistant's answer as returned to the caller.
///
/// Deserialization is lenient about absence: a missing or `null` field becomes
/// an empty string or an empty list. A field of the wrong type is still an
/// error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawReply")]
pub struct StructuredReply {
    pub summary: String,
    pub materials: Vec<String>,
    pub steps: Vec<String>,
    pub questions: Vec<String>,
}

#[derive(Deserialize)]
struct RawReply {
    summary: Option<String>,
    materials: Option<Vec<String>>,
    steps: Option<Vec<String>>,
    questions: Option<Vec<String>>,
}

impl From<RawReply> for StructuredReply {
    fn from(raw: RawReply) -> Self {
        Self {
            summary: raw.summary.unwrap_or_default(),
            materials: raw.materials.unwrap_or_default(),
            steps: raw.steps.unwrap_or_default(),
            questions: raw.questions.unwrap_or_default(),
        }
    }
}

impl StructuredReply {
    /// Canonical JSON text of the reply, fields in declaration order.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        // Only strings and string lists; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// How to treat a reply whose `summary` is missing or blank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReplyPolicy {
    /// Accept it as an empty summary.
    #[default]
    Lenient,
    /// Reject it as malformed.
    Strict,
}

/// Return the span from the first `open` to the last `close`, inclusive.
pub fn extract_json_span(raw: &str, open: char, close: char) -> Option<&str> {
    let start = raw.find(open)?;
    let end = raw.rfind(close)?;
    (end > start).then(|| &raw[start..=end])
}

pub fn extract_reply(raw: &str, policy: ReplyPolicy) -> Result<StructuredReply, AssistantError> {
    let span = extract_json_span(raw, '{', '}').ok_or_else(|| {
        AssistantError::MalformedReply("no JSON object found in model reply".to_string())
    })?;

    let reply: StructuredReply = serde_json::from_str(span).map_err(|error| {
        AssistantError::MalformedReply(format!("model reply is not a valid reply object: {error}"))
    })?;

    if policy == ReplyPolicy::Strict && reply.summary.trim().is_empty() {
        return Err(AssistantError::MalformedReply(
            "model reply has an empty summary".to_string(),
        ));
    }

    if !(3..=4).contains(&reply.questions.len()) {
        tracing::warn!(
            questions = reply.questions.len(),
            "model reply has an unexpected number of research questions"
        );
    }

    Ok(reply)
}
