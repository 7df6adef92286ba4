use crate::{
    history::{sanitize_history, to_messages},
    instruction::{get_prompt, project_planner_instructions},
    reply::extract_reply,
    AssistantError, ConversationTurn, InstructionParam, ProjectContext, ReplyPolicy,
    StructuredReply,
};
use hub_llm::{
    LanguageModel, LanguageModelInput, Message, ModelResponse, ResponseFormatJson,
    ResponseFormatOption,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Input to a single assistant call. Nothing is retained between calls.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AssistantRequest {
    pub history: Vec<ConversationTurn>,
    pub prompt: String,
    pub context: ProjectContext,
}

/// Stateless conversation assistant over an injected language model.
///
/// Every [`Assistant::ask`] makes exactly one model call. Failures are
/// returned as-is and never retried.
pub struct Assistant {
    model: Arc<dyn LanguageModel + Send + Sync>,
    instructions: Arc<Vec<InstructionParam<ProjectContext>>>,
    reply_policy: ReplyPolicy,
    response_format: Option<ResponseFormatOption>,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
}

impl Assistant {
    #[must_use]
    pub fn new(params: AssistantParams) -> Self {
        Self {
            model: params.model,
            instructions: Arc::new(params.instructions),
            reply_policy: params.reply_policy,
            response_format: params.response_format,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        }
    }

    pub fn builder(model: Arc<dyn LanguageModel + Send + Sync>) -> AssistantParams {
        AssistantParams::new(model)
    }

    /// Answer `request.prompt` in the light of the prior conversation and the
    /// project's current state.
    #[tracing::instrument(skip_all, fields(turns = request.history.len()))]
    pub async fn ask(&self, request: AssistantRequest) -> Result<StructuredReply, AssistantError> {
        if request.prompt.trim().is_empty() {
            return Err(AssistantError::InvalidRequest(
                "prompt must not be empty".to_string(),
            ));
        }

        let history = sanitize_history(request.history);
        let system_prompt = get_prompt(&self.instructions, &request.context);

        let mut messages = to_messages(history);
        messages.push(Message::user([request.prompt]));

        let input = LanguageModelInput {
            system_prompt: Some(system_prompt),
            messages,
            response_format: self.response_format.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            ..Default::default()
        };

        let response = self.generate(input).await?;
        extract_reply(&response.text(), self.reply_policy)
    }

    pub(crate) async fn generate(
        &self,
        input: LanguageModelInput,
    ) -> Result<ModelResponse, AssistantError> {
        self.model.generate(input).await.map_err(|error| {
            tracing::error!(
                provider = self.model.provider(),
                model = %self.model.model_id(),
                %error,
                "language model call failed"
            );
            AssistantError::ModelUnavailable(error)
        })
    }
}

/// Parameters required to create a new assistant.
/// # Default Values
/// - `instructions`: the project-planner instructions
/// - `reply_policy`: `ReplyPolicy::Lenient`
/// - `response_format`: JSON matching the structured reply shape
/// - `temperature`: `None`
/// - `max_tokens`: `None`
pub struct AssistantParams {
    /// The language model every call is sent to.
    pub model: Arc<dyn LanguageModel + Send + Sync>,
    /// Joined with newlines into the system prompt of every call.
    pub instructions: Vec<InstructionParam<ProjectContext>>,
    pub reply_policy: ReplyPolicy,
    pub response_format: Option<ResponseFormatOption>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl AssistantParams {
    pub fn new(model: Arc<dyn LanguageModel + Send + Sync>) -> Self {
        Self {
            model,
            instructions: project_planner_instructions(),
            reply_policy: ReplyPolicy::default(),
            response_format: Some(structured_reply_format()),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Add an instruction after the existing ones
    #[must_use]
    pub fn add_instruction(
        mut self,
        instruction: impl Into<InstructionParam<ProjectContext>>,
    ) -> Self {
        self.instructions.push(instruction.into());
        self
    }

    /// Replace all instructions
    #[must_use]
    pub fn instructions(mut self, instructions: Vec<InstructionParam<ProjectContext>>) -> Self {
        self.instructions = instructions;
        self
    }

    #[must_use]
    pub fn reply_policy(mut self, reply_policy: ReplyPolicy) -> Self {
        self.reply_policy = reply_policy;
        self
    }

    /// Set the response format. `None` leaves the format to the provider.
    #[must_use]
    pub fn response_format(mut self, response_format: Option<ResponseFormatOption>) -> Self {
        self.response_format = response_format;
        self
    }

    /// Set the temperature for sampling
    /// Amount of randomness injected into the response. Ranges from 0.0 to 1.0
    #[must_use]
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    #[must_use]
    pub fn build(self) -> Assistant {
        Assistant::new(self)
    }
}

fn structured_reply_format() -> ResponseFormatOption {
    let string_list = json!({ "type": "array", "items": { "type": "string" } });
    ResponseFormatOption::Json(ResponseFormatJson {
        name: "structured_reply".to_string(),
        description: Some("A project-planning answer".to_string()),
        schema: Some(json!({
            "type": "object",
            "properties": {
                "summary": { "type": "string" },
                "materials": string_list,
                "steps": string_list,
                "questions": string_list,
            },
            "required": ["summary", "materials", "steps", "questions"],
        })),
    })
}
