//! Ollama client implementation using the native `/api/chat` endpoint

use crate::config::BackendConfig;
use crate::error::{LlmError, Result};
use crate::llm::{
    ChatOptions, FinishReason, LlmClient, LlmResponse, Message, ToolDefinition, Usage,
};
use crate::tools::ToolCall;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Ollama chat client
pub struct OllamaClient {
    client: Client,
    host: String,
    model: String,
}

impl OllamaClient {
    /// Create a new Ollama client from backend config
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            client: Client::new(),
            host: normalize_host(&config.host),
            model: config.model.clone(),
        }
    }

    fn build_request<'a>(
        &'a self,
        messages: Vec<Message>,
        tools: Option<Vec<ToolDefinition>>,
        options: Option<ChatOptions>,
    ) -> OllamaChatRequest<'a> {
        OllamaChatRequest {
            model: &self.model,
            messages: messages.into_iter().map(OllamaMessage::from).collect(),
            tools: tools.filter(|t| !t.is_empty()),
            stream: false,
            options: options.filter(|o| !o.is_empty()).map(|o| OllamaOptions {
                temperature: o.temperature,
                top_p: o.top_p,
                num_predict: o.max_tokens,
            }),
        }
    }

    fn convert_response(&self, response: OllamaChatResponse) -> LlmResponse {
        let tool_calls: Vec<ToolCall> = response
            .message
            .tool_calls
            .into_iter()
            .map(|call| ToolCall {
                id: call.id,
                function_name: call.function.name,
                arguments: parse_arguments(call.function.arguments),
            })
            .collect();

        let usage = match (response.prompt_eval_count, response.eval_count) {
            (None, None) => None,
            (prompt, completion) => {
                let prompt_tokens = prompt.unwrap_or(0);
                let completion_tokens = completion.unwrap_or(0);
                Some(Usage {
                    prompt_tokens,
                    completion_tokens,
                    total_tokens: prompt_tokens + completion_tokens,
                })
            }
        };

        let finish_reason = if tool_calls.is_empty() {
            response.done_reason.as_deref().map(FinishReason::from_reason)
        } else {
            Some(FinishReason::ToolCalls)
        };

        LlmResponse {
            message: Message::assistant_with_tool_calls(response.message.content, tool_calls),
            model: response.model.unwrap_or_else(|| self.model.clone()),
            usage,
            finish_reason,
        }
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn chat_completion(
        &self,
        messages: Vec<Message>,
        tools: Option<Vec<ToolDefinition>>,
        options: Option<ChatOptions>,
    ) -> Result<LlmResponse> {
        let request = self.build_request(messages, tools, options);
        if let Some(ref tools) = request.tools {
            debug!("Ollama request with {} tools enabled", tools.len());
        }

        let response = self
            .client
            .post(format!("{}/api/chat", self.host))
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::Authentication {
                    message: error_text,
                },
                404 => LlmError::ModelNotFound {
                    model: self.model.clone(),
                },
                429 => LlmError::RateLimit,
                status => LlmError::ApiError {
                    status,
                    message: error_text,
                },
            }
            .into());
        }

        let ollama_response: OllamaChatResponse =
            response.json().await.map_err(|e| LlmError::InvalidResponse {
                message: format!("Failed to parse response: {}", e),
            })?;

        let result = self.convert_response(ollama_response);
        let tool_call_count = result.message.tool_calls().len();
        if tool_call_count > 0 {
            debug!("Ollama response contains {} tool calls", tool_call_count);
            for call in result.message.tool_calls() {
                debug!("Tool call: {}", call.function_name);
            }
        }

        Ok(result)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }
}

/// Add a scheme when missing and drop trailing slashes
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let host = if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    };
    host.trim_end_matches('/').to_string()
}

/// Some models return arguments as a JSON-encoded string instead of an object.
fn parse_arguments(arguments: Value) -> Value {
    match arguments {
        Value::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
        other => other,
    }
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolDefinition>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<OllamaToolCall>,
}

impl From<Message> for OllamaMessage {
    fn from(message: Message) -> Self {
        match message {
            Message::User { content } => Self {
                role: "user".to_string(),
                content,
                tool_calls: Vec::new(),
            },
            Message::Assistant {
                content,
                tool_calls,
            } => Self {
                role: "assistant".to_string(),
                content,
                tool_calls: tool_calls
                    .into_iter()
                    .map(|call| OllamaToolCall {
                        id: call.id,
                        function: OllamaFunctionCall {
                            name: call.function_name,
                            arguments: call.arguments,
                        },
                    })
                    .collect(),
            },
            Message::Tool { content, .. } => Self {
                role: "tool".to_string(),
                content,
                tool_calls: Vec::new(),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaToolCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    function: OllamaFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaFunctionCall {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    model: Option<String>,
    message: OllamaMessage,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}
