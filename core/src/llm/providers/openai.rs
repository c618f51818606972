//! OpenAI-compatible client implementation using async-openai library

use crate::config::BackendConfig;
use crate::error::{LlmError, Result};
use crate::llm::{
    ChatOptions, FinishReason, LlmClient, LlmResponse, Message, ToolDefinition, Usage,
};
use crate::tools::ToolCall;
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessage,
        ChatCompletionRequestAssistantMessageContent, ChatCompletionRequestMessage,
        ChatCompletionRequestToolMessage, ChatCompletionRequestToolMessageContent,
        ChatCompletionRequestUserMessage, ChatCompletionTool, ChatCompletionToolType,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse, FunctionObject,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::Value;

/// OpenAI-compatible client using async-openai library
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiClient {
    /// Create a new OpenAI client from backend config
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| LlmError::Authentication {
                message: "No API key found for OpenAI".to_string(),
            })?;

        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(config.host.trim_end_matches('/'));

        Ok(Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
        })
    }

    /// Convert our internal message format to async-openai format
    fn convert_messages(
        &self,
        messages: Vec<Message>,
    ) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut converted = Vec::with_capacity(messages.len());

        for message in messages {
            match message {
                Message::User { content } => {
                    converted.push(ChatCompletionRequestMessage::User(
                        ChatCompletionRequestUserMessage {
                            content: content.into(),
                            name: None,
                        },
                    ));
                }
                Message::Assistant {
                    content,
                    tool_calls,
                } => {
                    let tool_calls: Vec<ChatCompletionMessageToolCall> = tool_calls
                        .into_iter()
                        .enumerate()
                        .map(|(index, call)| ChatCompletionMessageToolCall {
                            id: call.id.unwrap_or_else(|| format!("call_{}", index)),
                            r#type: ChatCompletionToolType::Function,
                            function: async_openai::types::FunctionCall {
                                name: call.function_name,
                                arguments: encode_arguments(&call.arguments),
                            },
                        })
                        .collect();

                    converted.push(ChatCompletionRequestMessage::Assistant(
                        ChatCompletionRequestAssistantMessage {
                            content: if content.is_empty() {
                                None
                            } else {
                                Some(ChatCompletionRequestAssistantMessageContent::Text(content))
                            },
                            name: None,
                            tool_calls: if tool_calls.is_empty() {
                                None
                            } else {
                                Some(tool_calls)
                            },
                            audio: None,
                            refusal: None,
                            ..Default::default()
                        },
                    ));
                }
                Message::Tool {
                    content,
                    tool_call_id,
                } => {
                    let tool_call_id = tool_call_id.ok_or_else(|| LlmError::InvalidRequest {
                        message: "Tool message must carry a tool_call_id".to_string(),
                    })?;
                    converted.push(ChatCompletionRequestMessage::Tool(
                        ChatCompletionRequestToolMessage {
                            content: ChatCompletionRequestToolMessageContent::Text(content),
                            tool_call_id,
                        },
                    ));
                }
            }
        }

        Ok(converted)
    }

    /// Convert our tool definitions to async-openai format
    fn convert_tools(&self, tools: Vec<ToolDefinition>) -> Vec<ChatCompletionTool> {
        tools
            .into_iter()
            .map(|tool| ChatCompletionTool {
                r#type: ChatCompletionToolType::Function,
                function: FunctionObject {
                    name: tool.function.name,
                    description: Some(tool.function.description),
                    parameters: Some(tool.function.parameters),
                    strict: None,
                },
            })
            .collect()
    }

    /// Convert async-openai response to our internal format
    fn convert_response(&self, response: CreateChatCompletionResponse) -> Result<LlmResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse {
                message: "No choices in response".to_string(),
            })?;

        let tool_calls: Vec<ToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tool_call| {
                ToolCall::new(
                    tool_call.function.name,
                    decode_arguments(tool_call.function.arguments),
                )
                .with_id(tool_call.id)
            })
            .collect();

        let message = Message::assistant_with_tool_calls(
            choice.message.content.unwrap_or_default(),
            tool_calls,
        );

        let usage = response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        let finish_reason = choice.finish_reason.map(|reason| match reason {
            async_openai::types::FinishReason::Stop => FinishReason::Stop,
            async_openai::types::FinishReason::Length => FinishReason::Length,
            async_openai::types::FinishReason::ToolCalls => FinishReason::ToolCalls,
            async_openai::types::FinishReason::ContentFilter => FinishReason::ContentFilter,
            async_openai::types::FinishReason::FunctionCall => FinishReason::ToolCalls,
        });

        Ok(LlmResponse {
            message,
            model: response.model,
            usage,
            finish_reason,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    #[allow(deprecated)]
    async fn chat_completion(
        &self,
        messages: Vec<Message>,
        tools: Option<Vec<ToolDefinition>>,
        options: Option<ChatOptions>,
    ) -> Result<LlmResponse> {
        let converted_messages = self.convert_messages(messages)?;
        let converted_tools = tools
            .filter(|t| !t.is_empty())
            .map(|t| self.convert_tools(t));

        if let Some(ref tools) = converted_tools {
            tracing::debug!("OpenAI request with {} tools enabled", tools.len());
        }

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder.model(&self.model);
        request_builder.messages(converted_messages);

        if let Some(tools) = converted_tools {
            request_builder.tools(tools);
        }

        if let Some(opts) = options {
            if let Some(max_tokens) = opts.max_tokens {
                request_builder.max_tokens(max_tokens);
            }
            if let Some(temperature) = opts.temperature {
                request_builder.temperature(temperature);
            }
            if let Some(top_p) = opts.top_p {
                request_builder.top_p(top_p);
            }
        }

        let request = request_builder.build().map_err(|e| {
            tracing::error!("Failed to build OpenAI request: {}", e);
            LlmError::InvalidRequest {
                message: format!("Failed to build request: {}", e),
            }
        })?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            tracing::error!("OpenAI API call failed: {}", e);
            LlmError::ApiError {
                status: 500, // async-openai doesn't expose status codes directly
                message: e.to_string(),
            }
        })?;

        let result = self.convert_response(response)?;
        let tool_call_count = result.message.tool_calls().len();
        if tool_call_count > 0 {
            tracing::debug!("OpenAI response contains {} tool calls", tool_call_count);
        }

        Ok(result)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

/// Arguments that failed to decode are passed through as a JSON string so
/// validation reports them as an argument error.
fn decode_arguments(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

fn encode_arguments(arguments: &Value) -> String {
    match arguments {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModelParams, Protocol};
    use crate::error::Error;
    use serde_json::json;

    fn client() -> OpenAiClient {
        OpenAiClient::new(&BackendConfig {
            protocol: Protocol::OpenAICompat,
            host: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            api_key: Some("sk-test".to_string()),
            params: ModelParams::default(),
        })
        .unwrap()
    }

    #[test]
    fn test_missing_api_key() {
        let result = OpenAiClient::new(&BackendConfig {
            protocol: Protocol::OpenAICompat,
            host: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            api_key: None,
            params: ModelParams::default(),
        });
        assert!(matches!(
            result,
            Err(Error::Backend(LlmError::Authentication { .. }))
        ));
    }

    #[test]
    fn test_convert_assistant_tool_calls() {
        let call = ToolCall::new("trustyReport", json!({"package_name": "left-pad"}))
            .with_id("call_abc");
        let converted = client()
            .convert_messages(vec![
                Message::user("is left-pad safe"),
                Message::assistant_with_tool_calls("", vec![call]),
                Message::tool("{}", Some("call_abc".to_string())),
            ])
            .unwrap();

        assert_eq!(converted.len(), 3);
        match &converted[1] {
            ChatCompletionRequestMessage::Assistant(message) => {
                assert!(message.content.is_none());
                let calls = message.tool_calls.as_ref().unwrap();
                assert_eq!(calls[0].id, "call_abc");
                assert_eq!(calls[0].function.name, "trustyReport");
                assert_eq!(calls[0].function.arguments, r#"{"package_name":"left-pad"}"#);
            }
            other => panic!("expected assistant message, got {other:?}"),
        }
        match &converted[2] {
            ChatCompletionRequestMessage::Tool(message) => {
                assert_eq!(message.tool_call_id, "call_abc");
            }
            other => panic!("expected tool message, got {other:?}"),
        }
    }

    #[test]
    fn test_tool_message_needs_call_id() {
        let err = client()
            .convert_messages(vec![Message::tool("{}", None)])
            .unwrap_err();
        assert!(matches!(err, Error::Backend(LlmError::InvalidRequest { .. })));
    }

    #[test]
    fn test_convert_response_with_tool_call() {
        let response: CreateChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 0,
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "trustyReport",
                            "arguments": "{\"package_name\":\"left-pad\",\"ecosystem\":\"npm\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }))
        .unwrap();

        let result = client().convert_response(response).unwrap();
        let calls = result.message.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id.as_deref(), Some("call_1"));
        assert_eq!(calls[0].arguments["package_name"], "left-pad");
        assert_eq!(result.message.content(), "");
        assert_eq!(result.finish_reason, Some(FinishReason::ToolCalls));
        assert_eq!(result.usage.map(|u| u.total_tokens), Some(15));
    }

    #[test]
    fn test_undecodable_arguments_pass_through() {
        assert_eq!(
            decode_arguments("{\"package_name\":".to_string()),
            Value::String("{\"package_name\":".to_string())
        );
        assert_eq!(encode_arguments(&Value::String("raw".to_string())), "raw");
    }
}
