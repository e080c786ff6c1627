//! Gemini generateContent wire format.

use super::attachments::{PreparedAttachment, compose_prompt};
use gateway_domain::{
    FinishReason, GenerationOutput, GenerationRequest, ModelDescriptor, Role, UsageStats,
};
use serde::Deserialize;
use serde_json::{Value, json};

pub fn generate_path(model_id: &str) -> String {
    format!("v1beta/models/{model_id}:generateContent")
}

// ─── Domain → Gemini ─────────────────────────────────────────────

pub fn build_request(
    model: &ModelDescriptor,
    request: &GenerationRequest,
    attachments: &[PreparedAttachment],
    max_output_tokens: u32,
) -> Value {
    let mut contents: Vec<(&'static str, Vec<Value>)> = Vec::new();
    for message in &request.history {
        let role = match message.role {
            Role::Assistant => "model",
            Role::User | Role::Tool => "user",
        };
        let part = json!({ "text": message.content });
        if let Some((last, parts)) = contents.last_mut()
            && *last == role
        {
            parts.push(part);
        } else {
            contents.push((role, vec![part]));
        }
    }

    let mut parts = vec![json!({ "text": compose_prompt(&request.prompt, attachments) })];
    for attachment in attachments {
        if let PreparedAttachment::Image {
            media_type, data, ..
        } = attachment
        {
            parts.push(json!({ "inlineData": { "mimeType": media_type, "data": data } }));
        }
    }
    if let Some((last, previous)) = contents.last_mut()
        && *last == "user"
    {
        previous.extend(parts);
    } else {
        contents.push(("user", parts));
    }

    let mut generation_config = json!({
        "maxOutputTokens": request.max_output_tokens.unwrap_or(max_output_tokens),
    });
    if let Some(temperature) = model.temperature_for(request.temperature) {
        generation_config["temperature"] = json!(temperature);
    }

    let mut body = json!({
        "contents": contents
            .into_iter()
            .map(|(role, parts)| json!({ "role": role, "parts": parts }))
            .collect::<Vec<_>>(),
        "generationConfig": generation_config,
    });
    if let Some(instructions) = &request.instructions {
        body["systemInstruction"] = json!({ "parts": [{ "text": instructions }] });
    }
    body
}

// ─── Gemini → Domain ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: UsageMetadata,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: u64,
    candidates_token_count: u64,
}

pub fn parse_response(body: Value) -> Result<GenerationOutput, String> {
    let response: GenerateResponse =
        serde_json::from_value(body).map_err(|e| format!("unexpected response shape: {e}"))?;

    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(format!("prompt rejected: {reason}"));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    Ok(GenerationOutput::new(text)
        .with_usage(UsageStats::new(
            response.usage_metadata.prompt_token_count,
            response.usage_metadata.candidates_token_count,
        ))
        .with_finish_reason(
            candidate
                .finish_reason
                .as_deref()
                .map(FinishReason::from_vendor)
                .unwrap_or_default(),
        ))
}
