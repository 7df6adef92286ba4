use crate::{reply::extract_json_span, Assistant, AssistantError};
use hub_llm::{LanguageModelInput, Message, ResponseFormatJson, ResponseFormatOption};
use serde::{Deserialize, Serialize};

/// A project suggestion shown on the home screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectIdea {
    pub title: String,
    pub description: String,
    pub time: String,
    pub cost: String,
    pub materials: Vec<String>,
    pub image_url: String,
}

const IDEAS_SYSTEM_PROMPT: &str = "You suggest home-improvement and DIY projects. Respond \
with a JSON array of 4 objects and nothing else, no markdown or code fences. Each object \
has the fields \"title\", \"description\" (one or two sentences), \"time\" (an estimate such \
as \"2-3 hours\"), \"cost\" (an estimate such as \"$50-$100\"), \"materials\" (an array of \
strings) and \"imageUrl\" (a royalty-free image URL illustrating the project).";

const IDEAS_PROMPT: &str = "Suggest a varied set of projects for this week.";

impl Assistant {
    /// Ask the model for a handful of project ideas. Uses no project context.
    #[tracing::instrument(skip_all)]
    pub async fn suggest_ideas(&self) -> Result<Vec<ProjectIdea>, AssistantError> {
        let input = LanguageModelInput {
            system_prompt: Some(IDEAS_SYSTEM_PROMPT.to_string()),
            messages: vec![Message::user([IDEAS_PROMPT])],
            response_format: Some(ResponseFormatOption::Json(ResponseFormatJson {
                name: "project_ideas".to_string(),
                description: None,
                schema: None,
            })),
            ..Default::default()
        };

        let response = self.generate(input).await?;
        extract_ideas(&response.text())
    }
}

/// Parse the span from the first `[` to the last `]` as a list of ideas.
/// Entries without a title are dropped.
pub fn extract_ideas(raw: &str) -> Result<Vec<ProjectIdea>, AssistantError> {
    let span = extract_json_span(raw, '[', ']').ok_or_else(|| {
        AssistantError::MalformedReply("no JSON array found in model reply".to_string())
    })?;

    let ideas: Vec<ProjectIdea> = serde_json::from_str(span).map_err(|error| {
        AssistantError::MalformedReply(format!("model reply is not a list of ideas: {error}"))
    })?;

    Ok(ideas
        .into_iter()
        .filter(|idea| !idea.title.trim().is_empty())
        .collect())
}
