//! OpenAI Chat Completions wire format.
//!
//! Shared by OpenAI, Azure OpenAI, OpenRouter, Requesty and custom
//! OpenAI-compatible endpoints.

use super::attachments::{PreparedAttachment, compose_prompt};
use super::ProviderKind;
use gateway_domain::{
    FinishReason, GenerationOutput, GenerationRequest, ModelDescriptor, Role, UsageStats,
};
use serde::Deserialize;
use serde_json::{Value, json};

pub const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

/// Azure routes by deployment and versions the API through the query string.
pub fn azure_path(deployment: &str, api_version: &str) -> String {
    format!("openai/deployments/{deployment}/chat/completions?api-version={api_version}")
}

// ─── Domain → OpenAI ─────────────────────────────────────────────

fn role_name(role: Role) -> &'static str {
    match role {
        Role::Assistant => "assistant",
        // Tool output without a matching tool call is replayed as user text
        Role::User | Role::Tool => "user",
    }
}

/// Build the request body for `model`.
///
/// The requested temperature is passed through the model's constraint, so
/// fixed-temperature reasoning models never receive one.
pub fn build_request(
    kind: ProviderKind,
    model: &ModelDescriptor,
    request: &GenerationRequest,
    attachments: &[PreparedAttachment],
    max_output_tokens: u32,
) -> Value {
    let mut messages = Vec::with_capacity(request.history.len() + 2);
    if let Some(instructions) = &request.instructions {
        messages.push(json!({ "role": "system", "content": instructions }));
    }
    for message in &request.history {
        messages.push(json!({
            "role": role_name(message.role),
            "content": message.content,
        }));
    }

    let text = compose_prompt(&request.prompt, attachments);
    let content = if attachments.iter().any(PreparedAttachment::is_image) {
        let mut parts = vec![json!({ "type": "text", "text": text })];
        parts.extend(attachments.iter().filter_map(PreparedAttachment::data_url).map(|url| {
            json!({ "type": "image_url", "image_url": { "url": url } })
        }));
        Value::Array(parts)
    } else {
        Value::String(text)
    };
    messages.push(json!({ "role": "user", "content": content }));

    // OpenAI's reasoning models reject `max_tokens`
    let token_field = match kind {
        ProviderKind::OpenAi | ProviderKind::Azure => "max_completion_tokens",
        _ => "max_tokens",
    };

    let mut body = json!({
        "model": model.model_id,
        "messages": messages,
        token_field: request.max_output_tokens.unwrap_or(max_output_tokens),
    });
    if let Some(temperature) = model.temperature_for(request.temperature) {
        body["temperature"] = json!(temperature);
    }
    body
}

// ─── OpenAI → Domain ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

/// Parse a successful response body.
pub fn parse_response(body: Value) -> Result<GenerationOutput, String> {
    let response: ChatResponse =
        serde_json::from_value(body).map_err(|e| format!("unexpected response shape: {e}"))?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| "response contained no choices".to_string())?;

    let text = match choice.message.and_then(|m| m.content) {
        Some(Value::String(text)) => text,
        // Some compatible servers return content parts
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(""),
        _ => String::new(),
    };
    let usage = response.usage.unwrap_or_default();

    Ok(GenerationOutput::new(text)
        .with_usage(UsageStats::new(usage.prompt_tokens, usage.completion_tokens))
        .with_finish_reason(
            choice
                .finish_reason
                .as_deref()
                .map(FinishReason::from_vendor)
                .unwrap_or_default(),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_domain::{ContextMessage, CostClass};

    fn model(id: &str) -> ModelDescriptor {
        ModelDescriptor::new("p", id, CostClass::Low, 128_000)
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("What next?")
            .with_instructions("Be brief.")
            .with_history(vec![
                ContextMessage {
                    role: Role::User,
                    content: "Hi".into(),
                },
                ContextMessage {
                    role: Role::Assistant,
                    content: "Hello".into(),
                },
            ])
            .with_temperature(Some(0.2))
    }

    #[test]
    fn test_build_text_request() {
        let body = build_request(ProviderKind::OpenRouter, &model("llama"), &request(), &[], 4096);

        assert_eq!(body["model"], "llama");
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["temperature"], 0.2);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], json!({"role": "system", "content": "Be brief."}));
        assert_eq!(messages[2]["role"], "assistant");
        assert_eq!(messages[3], json!({"role": "user", "content": "What next?"}));
    }

    #[test]
    fn test_openai_uses_completion_token_field() {
        let req = GenerationRequest::new("x").with_max_output_tokens(Some(100));
        let body = build_request(ProviderKind::OpenAi, &model("o3"), &req, &[], 4096);
        assert_eq!(body["max_completion_tokens"], 100);
        assert!(body.get("max_tokens").is_none());
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_azure_path() {
        assert_eq!(
            azure_path("prod-4o", "2024-02-01"),
            "openai/deployments/prod-4o/chat/completions?api-version=2024-02-01"
        );
    }

    #[test]
    fn test_fixed_temperature_model_omits_temperature() {
        let o3 = model("o3").with_fixed_temperature(1.0);
        let body = build_request(ProviderKind::OpenAi, &o3, &request(), &[], 4096);
        assert!(body.get("temperature").is_none());

        let body = build_request(ProviderKind::Azure, &o3, &request(), &[], 4096);
        assert!(body.get("temperature").is_none());
        assert_eq!(body["max_completion_tokens"], 4096);
    }

    #[test]
    fn test_temperature_clamped_to_model_range() {
        let sonar = model("perplexity/sonar").with_temperature_range(0.0, 1.0);
        let req = GenerationRequest::new("x").with_temperature(Some(1.7));
        let body = build_request(ProviderKind::Requesty, &sonar, &req, &[], 4096);
        assert_eq!(body["temperature"], 1.0);
        assert_eq!(body["max_tokens"], 4096);
    }

    #[test]
    fn test_build_request_with_image() {
        let attachments = vec![
            PreparedAttachment::Text {
                path: "/w/a.py".into(),
                text: "print(1)".into(),
            },
            PreparedAttachment::Image {
                path: "/w/s.png".into(),
                media_type: "image/png",
                data: "AAAA".into(),
            },
        ];
        let body = build_request(
            ProviderKind::Custom,
            &model("m"),
            &GenerationRequest::new("Look"),
            &attachments,
            10,
        );

        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["type"], "text");
        assert!(content[0]["text"].as_str().unwrap().contains("print(1)"));
        assert_eq!(content[1]["image_url"]["url"], "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_parse_response() {
        let output = parse_response(json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Done."},
                "finish_reason": "length"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        }))
        .unwrap();

        assert_eq!(output.text, "Done.");
        assert_eq!(output.usage, UsageStats::new(12, 3));
        assert_eq!(output.finish_reason, FinishReason::Length);
    }

    #[test]
    fn test_parse_response_without_choices() {
        assert!(parse_response(json!({"choices": []})).is_err());
        assert!(parse_response(json!({"choices": "nope"})).is_err());
    }
}
