//! Anthropic Messages API wire format.

use super::attachments::{PreparedAttachment, compose_prompt};
use gateway_domain::{
    FinishReason, GenerationOutput, GenerationRequest, ModelDescriptor, Role, UsageStats,
};
use serde::Deserialize;
use serde_json::{Value, json};

pub const MESSAGES_PATH: &str = "v1/messages";
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

// ─── Domain → Anthropic ──────────────────────────────────────────

/// Build the request body. Consecutive messages with the same role are
/// merged, since the API requires strict user/assistant alternation.
pub fn build_request(
    model: &ModelDescriptor,
    request: &GenerationRequest,
    attachments: &[PreparedAttachment],
    max_output_tokens: u32,
) -> Value {
    let mut messages: Vec<(&'static str, Vec<Value>)> = Vec::new();
    let mut push = |role: &'static str, block: Value| {
        if let Some((last, blocks)) = messages.last_mut()
            && *last == role
        {
            blocks.push(block);
        } else {
            messages.push((role, vec![block]));
        }
    };

    for message in &request.history {
        let role = match message.role {
            Role::Assistant => "assistant",
            Role::User | Role::Tool => "user",
        };
        push(role, json!({ "type": "text", "text": message.content }));
    }

    for attachment in attachments {
        if let PreparedAttachment::Image {
            media_type, data, ..
        } = attachment
        {
            push(
                "user",
                json!({
                    "type": "image",
                    "source": { "type": "base64", "media_type": media_type, "data": data },
                }),
            );
        }
    }
    push(
        "user",
        json!({ "type": "text", "text": compose_prompt(&request.prompt, attachments) }),
    );

    let messages: Vec<Value> = messages
        .into_iter()
        .map(|(role, content)| json!({ "role": role, "content": content }))
        .collect();

    let mut body = json!({
        "model": model.model_id,
        "max_tokens": request.max_output_tokens.unwrap_or(max_output_tokens),
        "messages": messages,
    });
    if let Some(instructions) = &request.instructions {
        body["system"] = json!(instructions);
    }
    if let Some(temperature) = model.temperature_for(request.temperature) {
        // Anthropic accepts 0.0 - 1.0
        body["temperature"] = json!(temperature.min(1.0));
    }
    body
}

// ─── Anthropic → Domain ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

pub fn parse_response(body: Value) -> Result<GenerationOutput, String> {
    let response: MessagesResponse =
        serde_json::from_value(body).map_err(|e| format!("unexpected response shape: {e}"))?;

    let text: String = response
        .content
        .iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text.as_deref())
        .collect();

    Ok(GenerationOutput::new(text)
        .with_usage(UsageStats::new(
            response.usage.input_tokens,
            response.usage.output_tokens,
        ))
        .with_finish_reason(
            response
                .stop_reason
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
        ModelDescriptor::new("anthropic", id, CostClass::High, 200_000)
    }

    #[test]
    fn test_build_request_merges_roles() {
        let request = GenerationRequest::new("Continue")
            .with_instructions("Be precise.")
            .with_history(vec![
                ContextMessage {
                    role: Role::User,
                    content: "First".into(),
                },
                ContextMessage {
                    role: Role::Tool,
                    content: "Tool output".into(),
                },
                ContextMessage {
                    role: Role::Assistant,
                    content: "Answer".into(),
                },
            ]);
        let body = build_request(&model("claude-sonnet-4-0"), &request, &[], 8192);

        assert_eq!(body["system"], "Be precise.");
        assert_eq!(body["max_tokens"], 8192);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"].as_array().unwrap().len(), 2);
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[2]["content"][0]["text"], "Continue");
    }

    #[test]
    fn test_build_request_with_image() {
        let attachments = vec![PreparedAttachment::Image {
            path: "/w/s.jpg".into(),
            media_type: "image/jpeg",
            data: "BBBB".into(),
        }];
        let body = build_request(
            &model("claude-opus-4-0"),
            &GenerationRequest::new("Describe").with_temperature(Some(1.5)),
            &attachments,
            1024,
        );

        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["source"]["media_type"], "image/jpeg");
        assert_eq!(content[0]["source"]["data"], "BBBB");
        assert_eq!(content[1]["text"], "Describe");
        assert_eq!(body["temperature"], 1.0);
        assert!(body.get("system").is_none());
    }

    #[test]
    fn test_fixed_temperature_model_omits_temperature() {
        let pinned = model("claude-think").with_fixed_temperature(1.0);
        let request = GenerationRequest::new("x").with_temperature(Some(0.3));
        let body = build_request(&pinned, &request, &[], 1024);
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_parse_response() {
        let output = parse_response(json!({
            "id": "msg_1",
            "type": "message",
            "content": [
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "Part one. "},
                {"type": "text", "text": "Part two."}
            ],
            "stop_reason": "max_tokens",
            "usage": {"input_tokens": 20, "output_tokens": 7}
        }))
        .unwrap();

        assert_eq!(output.text, "Part one. Part two.");
        assert_eq!(output.usage, UsageStats::new(20, 7));
        assert_eq!(output.finish_reason, FinishReason::Length);
    }
}
