//! Prompt templates and request layouts per model family.
//!
//! Bedrock models do not share a request format: Anthropic takes a list of
//! messages, the others take a single prompt string whose chat-turn
//! delimiters depend on how the model was trained.

use serde_json::{Value, json};

use crate::error::ChatError;
use crate::models::{ChatMessage, Role};
use crate::services::bedrock::base_model_id;

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";
const MAX_TOKENS: u32 = 2048;

/// Supported chat model families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    /// Anthropic Claude, messages API
    Anthropic,
    /// Meta Llama 3 header/eot delimiters
    Llama3,
    /// Mistral `[INST]` blocks
    Mistral,
    /// Amazon Titan text `User:`/`Bot:` turns
    TitanText,
}

impl ModelFamily {
    /// Family of a Bedrock model id; `None` when the model is unsupported.
    pub fn from_model_id(model_id: &str) -> Option<Self> {
        let base = base_model_id(model_id);
        if base.starts_with("anthropic.claude") {
            Some(ModelFamily::Anthropic)
        } else if base.starts_with("meta.llama3") {
            Some(ModelFamily::Llama3)
        } else if base.starts_with("mistral.") {
            Some(ModelFamily::Mistral)
        } else if base.starts_with("amazon.titan-text") {
            Some(ModelFamily::TitanText)
        } else {
            None
        }
    }

    /// Build the `InvokeModel` body for a conversation.
    pub fn request_body(&self, messages: &[ChatMessage], temperature: f32) -> Value {
        match self {
            ModelFamily::Anthropic => anthropic_body(messages, temperature),
            ModelFamily::Llama3 => json!({
                "prompt": render_llama3(messages),
                "temperature": temperature,
                "max_gen_len": MAX_TOKENS,
            }),
            ModelFamily::Mistral => json!({
                "prompt": render_mistral(messages),
                "temperature": temperature,
                "max_tokens": MAX_TOKENS,
            }),
            ModelFamily::TitanText => json!({
                "inputText": render_titan(messages),
                "textGenerationConfig": {
                    "temperature": temperature,
                    "maxTokenCount": MAX_TOKENS,
                },
            }),
        }
    }

    /// Pull the generated text out of a response body.
    pub fn parse_response(&self, response: &Value) -> Result<String, ChatError> {
        let text = match self {
            ModelFamily::Anthropic => response["content"].as_array().map(|blocks| {
                blocks
                    .iter()
                    .filter(|b| b["type"] == "text")
                    .filter_map(|b| b["text"].as_str())
                    .collect::<String>()
            }),
            ModelFamily::Llama3 => response["generation"].as_str().map(str::to_string),
            ModelFamily::Mistral => response["outputs"][0]["text"].as_str().map(str::to_string),
            ModelFamily::TitanText => response["results"][0]["outputText"]
                .as_str()
                .map(str::to_string),
        };

        text.map(|t| t.trim().to_string()).ok_or_else(|| {
            ChatError::InvalidResponse(format!("no generated text in {:?} response", self))
        })
    }
}

fn anthropic_body(messages: &[ChatMessage], temperature: f32) -> Value {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();

    // The messages API wants alternating turns, so runs of the same role
    // are merged.
    let mut turns: Vec<(&'static str, String)> = Vec::new();
    for message in messages.iter().filter(|m| m.role != Role::System) {
        let role = if message.role == Role::Ai { "assistant" } else { "user" };
        match turns.last_mut() {
            Some((last, content)) if *last == role => {
                content.push_str("\n\n");
                content.push_str(&message.content);
            }
            _ => turns.push((role, message.content.clone())),
        }
    }

    let mut body = json!({
        "anthropic_version": ANTHROPIC_VERSION,
        "max_tokens": MAX_TOKENS,
        "temperature": temperature,
        "messages": turns
            .into_iter()
            .map(|(role, content)| json!({ "role": role, "content": content }))
            .collect::<Vec<_>>(),
    });
    if !system.is_empty() {
        body["system"] = Value::from(system.join("\n\n"));
    }
    body
}

/// Llama 3 chat template, ending with an open assistant header so the
/// model answers as the assistant.
pub fn render_llama3(messages: &[ChatMessage]) -> String {
    let mut prompt = String::from("<|begin_of_text|>");
    for message in messages {
        let role = match message.role {
            Role::Human => "user",
            Role::Ai => "assistant",
            Role::System => "system",
        };
        prompt.push_str(&format!(
            "<|start_header_id|>{}<|end_header_id|>\n\n{}<|eot_id|>",
            role,
            message.content.trim()
        ));
    }
    prompt.push_str("<|start_header_id|>assistant<|end_header_id|>\n\n");
    prompt
}

/// Mistral instruct template. System text is folded into the first
/// instruction block.
pub fn render_mistral(messages: &[ChatMessage]) -> String {
    let mut prompt = String::from("<s>");
    let mut pending_system = String::new();
    for message in messages {
        match message.role {
            Role::System => {
                pending_system.push_str(message.content.trim());
                pending_system.push_str("\n\n");
            }
            Role::Human => {
                prompt.push_str(&format!(
                    "[INST] {}{} [/INST]",
                    pending_system,
                    message.content.trim()
                ));
                pending_system.clear();
            }
            Role::Ai => prompt.push_str(&format!(" {}</s>", message.content.trim())),
        }
    }
    prompt
}

/// Titan text template.
pub fn render_titan(messages: &[ChatMessage]) -> String {
    let mut prompt = String::new();
    for message in messages {
        let speaker = match message.role {
            Role::Human | Role::System => "User",
            Role::Ai => "Bot",
        };
        prompt.push_str(&format!("\n\n{}: {}", speaker, message.content.trim()));
    }
    prompt.push_str("\n\nBot:");
    prompt
}
