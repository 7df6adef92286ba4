use super::api::{
    Content, FinishReason, GenerateContentConfig, GenerateContentParameters,
    GenerateContentResponse, GenerateContentResponseUsageMetadata, Part as GooglePart,
};
use crate::{
    client_utils, LanguageModel, LanguageModelError, LanguageModelInput, LanguageModelResult,
    Message, ModelResponse, ModelUsage, Part, ReasoningPart, ResponseFormatOption,
};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client,
};
use std::collections::HashMap;
use tracing::{info_span, Instrument};

const PROVIDER: &str = "google";
const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GoogleModel {
    model_id: String,
    api_key: String,
    base_url: String,
    client: Client,
    headers: HashMap<String, String>,
}

#[derive(Clone, Default)]
pub struct GoogleModelOptions {
    pub api_key: String,
    pub base_url: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub client: Option<Client>,
}

impl GoogleModel {
    #[must_use]
    pub fn new(model_id: impl Into<String>, options: GoogleModelOptions) -> Self {
        let GoogleModelOptions {
            api_key,
            base_url,
            headers,
            client,
        } = options;

        let base_url = base_url
            .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string())
            .trim_end_matches('/')
            .to_string();
        let client = client.unwrap_or_else(Client::new);
        let headers = headers.unwrap_or_default();

        Self {
            model_id: model_id.into(),
            api_key,
            base_url,
            client,
            headers,
        }
    }

    fn request_headers(&self) -> LanguageModelResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        let mut api_key = HeaderValue::from_str(&self.api_key).map_err(|error| {
            LanguageModelError::InvalidInput(format!("Invalid Google API key: {error}"))
        })?;
        api_key.set_sensitive(true);
        headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key);

        for (key, value) in &self.headers {
            let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|error| {
                LanguageModelError::InvalidInput(format!(
                    "Invalid Google header name '{key}': {error}"
                ))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|error| {
                LanguageModelError::InvalidInput(format!(
                    "Invalid Google header value for '{key}': {error}"
                ))
            })?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }
}

#[async_trait::async_trait]
impl LanguageModel for GoogleModel {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn model_id(&self) -> String {
        self.model_id.clone()
    }

    async fn generate(&self, input: LanguageModelInput) -> LanguageModelResult<ModelResponse> {
        let span = info_span!(
            "hub_llm.generate",
            provider = PROVIDER,
            model = %self.model_id,
            messages = input.messages.len(),
        );

        async move {
            let params = convert_to_generate_content_parameters(input, &self.model_id);

            let url = format!("{}/models/{}:generateContent", self.base_url, self.model_id);

            let headers = self.request_headers()?;
            let response: GenerateContentResponse =
                client_utils::send_json(&self.client, &url, &params, headers).await?;

            let response = map_generate_content_response(response)?;
            if let Some(usage) = &response.usage {
                tracing::debug!(
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    "gemini usage"
                );
            }
            Ok(response)
        }
        .instrument(span)
        .await
    }
}

fn convert_to_generate_content_parameters(
    input: LanguageModelInput,
    model_id: &str,
) -> GenerateContentParameters {
    let mut params = GenerateContentParameters {
        contents: convert_to_google_contents(input.messages),
        model: model_id.to_string(),
        ..Default::default()
    };
    let mut config = GenerateContentConfig::default();

    if let Some(system_prompt) = input.system_prompt {
        params.system_instruction = Some(Content {
            role: Some("system".to_string()),
            parts: Some(vec![GooglePart {
                text: Some(system_prompt),
                ..Default::default()
            }]),
        });
    }

    config.temperature = input.temperature;
    config.max_output_tokens = input.max_tokens;

    if let Some(response_format) = input.response_format {
        let (response_mime_type, response_json_schema) =
            convert_to_google_response_schema(response_format);
        config.response_mime_type = Some(response_mime_type);
        config.response_json_schema = response_json_schema;
    }

    params.generation_config = Some(config);
    params
}

fn convert_to_google_contents(messages: Vec<Message>) -> Vec<Content> {
    messages
        .into_iter()
        .map(|message| match message {
            Message::User(user_message) => Content {
                role: Some("user".to_string()),
                parts: Some(
                    user_message
                        .content
                        .into_iter()
                        .filter_map(convert_to_google_part)
                        .collect(),
                ),
            },
            Message::Assistant(assistant_message) => Content {
                role: Some("model".to_string()),
                parts: Some(
                    assistant_message
                        .content
                        .into_iter()
                        .filter_map(convert_to_google_part)
                        .collect(),
                ),
            },
        })
        .collect()
}

/// Reasoning is never sent back to Gemini.
fn convert_to_google_part(part: Part) -> Option<GooglePart> {
    match part {
        Part::Text(text_part) => Some(GooglePart {
            text: Some(text_part.text),
            ..Default::default()
        }),
        Part::Reasoning(_) => None,
    }
}

fn convert_to_google_response_schema(
    response_format: ResponseFormatOption,
) -> (String, Option<serde_json::Value>) {
    match response_format {
        ResponseFormatOption::Text => ("text/plain".to_string(), None),
        ResponseFormatOption::Json(json_format) => {
            ("application/json".to_string(), json_format.schema)
        }
    }
}

fn map_generate_content_response(
    response: GenerateContentResponse,
) -> LanguageModelResult<ModelResponse> {
    if let Some(block_reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.clone())
    {
        let message = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason_message)
            .unwrap_or_default();
        return Err(LanguageModelError::Refusal(
            format!("prompt blocked ({block_reason}) {message}")
                .trim_end()
                .to_string(),
        ));
    }

    let candidate = response
        .candidates
        .and_then(|c| c.into_iter().next())
        .ok_or_else(|| {
            LanguageModelError::Invariant(PROVIDER, "No candidate in response".to_string())
        })?;

    let content = map_google_content(candidate.content.and_then(|c| c.parts).unwrap_or_default());

    if content.is_empty()
        && matches!(
            candidate.finish_reason,
            Some(FinishReason::Safety | FinishReason::ProhibitedContent)
        )
    {
        return Err(LanguageModelError::Refusal(
            "candidate blocked by safety filters".to_string(),
        ));
    }

    Ok(ModelResponse {
        content,
        usage: response.usage_metadata.map(|u| map_google_usage_metadata(&u)),
    })
}

fn map_google_content(parts: Vec<GooglePart>) -> Vec<Part> {
    parts
        .into_iter()
        .filter_map(|part| {
            let text = part.text?;
            if part.thought.unwrap_or(false) {
                let mut reasoning_part = ReasoningPart::new(text);
                if let Some(signature) = part.thought_signature {
                    reasoning_part = reasoning_part.with_signature(signature);
                }
                Some(reasoning_part.into())
            } else {
                Some(Part::text(text))
            }
        })
        .collect()
}

fn map_google_usage_metadata(usage: &GenerateContentResponseUsageMetadata) -> ModelUsage {
    ModelUsage {
        input_tokens: usage.prompt_token_count.unwrap_or(0),
        output_tokens: usage.candidates_token_count.unwrap_or(0)
            + usage.thoughts_token_count.unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResponseFormatJson;
    use serde_json::json;

    #[test]
    fn converts_system_prompt_history_and_json_format() {
        let input = LanguageModelInput {
            system_prompt: Some("be helpful".to_string()),
            messages: vec![
                Message::user(["How tall?"]),
                Message::assistant(["Six feet."]),
                Message::user(["And wide?"]),
            ],
            response_format: Some(ResponseFormatOption::Json(ResponseFormatJson {
                name: "reply".to_string(),
                description: None,
                schema: Some(json!({ "type": "object" })),
            })),
            temperature: Some(0.4),
            ..Default::default()
        };

        let params = convert_to_generate_content_parameters(input, "gemini-2.5-flash");
        let value = serde_json::to_value(&params).expect("serialize params");

        assert_eq!(value["model"], "gemini-2.5-flash");
        assert_eq!(
            value["systemInstruction"]["parts"][0]["text"],
            json!("be helpful")
        );
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][1]["role"], "model");
        assert_eq!(value["contents"][1]["parts"][0]["text"], "Six feet.");
        assert_eq!(value["contents"][2]["parts"][0]["text"], "And wide?");
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            value["generationConfig"]["responseJsonSchema"],
            json!({ "type": "object" })
        );
        assert_eq!(value["generationConfig"]["temperature"], json!(0.4));
        assert!(value["generationConfig"].get("maxOutputTokens").is_none());
    }

    #[test]
    fn api_key_travels_in_a_sensitive_header() {
        let model = GoogleModel::new(
            "gemini-2.5-flash",
            GoogleModelOptions {
                api_key: "secret-key".to_string(),
                ..Default::default()
            },
        );

        let headers = model.request_headers().expect("headers build");
        let api_key = headers.get(API_KEY_HEADER).expect("api key header");

        assert_eq!(api_key, "secret-key");
        assert!(api_key.is_sensitive());
    }

    #[test]
    fn reasoning_parts_are_not_sent_back() {
        let input = LanguageModelInput {
            messages: vec![Message::Assistant(crate::AssistantMessage {
                content: vec![Part::reasoning("hmm"), Part::text("Use oak.")],
            })],
            ..Default::default()
        };

        let params = convert_to_generate_content_parameters(input, "gemini-2.5-flash");
        let parts = params.contents[0].parts.as_ref().expect("parts");

        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].text.as_deref(), Some("Use oak."));
        assert_eq!(parts[0].thought, None);
    }

    #[test]
    fn maps_text_and_thought_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "thinking...", "thought": true, "thoughtSignature": "sig" },
                        { "text": "{\"summary\":\"ok\"}" }
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {
                "promptTokenCount": 12,
                "candidatesTokenCount": 5,
                "thoughtsTokenCount": 3
            }
        }))
        .expect("decode response");

        let mapped = map_generate_content_response(response).expect("map response");

        assert_eq!(
            mapped.content,
            vec![
                Part::Reasoning(ReasoningPart::new("thinking...").with_signature("sig")),
                Part::text("{\"summary\":\"ok\"}"),
            ]
        );
        assert_eq!(mapped.text(), "{\"summary\":\"ok\"}");
        assert_eq!(
            mapped.usage,
            Some(ModelUsage {
                input_tokens: 12,
                output_tokens: 8,
            })
        );
    }

    #[test]
    fn blocked_prompt_is_a_refusal() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .expect("decode response");

        let err = map_generate_content_response(response).expect_err("should refuse");
        assert!(matches!(err, LanguageModelError::Refusal(_)));
    }

    #[test]
    fn missing_candidates_is_an_invariant_error() {
        let err = map_generate_content_response(GenerateContentResponse::default())
            .expect_err("should fail");
        assert!(matches!(err, LanguageModelError::Invariant("google", _)));
    }

    #[test]
    fn unknown_finish_reason_decodes_as_other() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "finishReason": "SOMETHING_NEW" }]
        }))
        .expect("decode response");

        let candidate = response
            .candidates
            .and_then(|c| c.into_iter().next())
            .expect("candidate");
        assert_eq!(candidate.finish_reason, Some(FinishReason::Other));
    }
}
