//! Three-turn orchestration of a tool-assisted recommendation

use super::config::AgentConfig;
use super::prompt::{build_user_prompt, SUMMARY_INSTRUCTION};
use super::timeout::{with_deadline, Turn};
use crate::config::ResolvedConfig;
use crate::conversation::ConversationState;
use crate::error::{Error, Result};
use crate::llm::{create_client, LlmClient, Message, ToolDefinition};
use crate::tools::{default_registry, ToolRegistry, TrustyClient};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Init,
    AwaitingFirstReply,
    DirectAnswer,
    ToolRequested,
    AwaitingToolResult,
    AwaitingSummaryReply,
    Done,
    Failed,
}

impl TurnState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnState::DirectAnswer | TurnState::Done | TurnState::Failed)
    }
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TurnState::Init => "init",
            TurnState::AwaitingFirstReply => "awaiting_first_reply",
            TurnState::DirectAnswer => "direct_answer",
            TurnState::ToolRequested => "tool_requested",
            TurnState::AwaitingToolResult => "awaiting_tool_result",
            TurnState::AwaitingSummaryReply => "awaiting_summary_reply",
            TurnState::Done => "done",
            TurnState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The model answered the first turn without calling a tool
    DirectAnswer {
        answer: String,
        conversation: ConversationState,
    },

    /// The tool was called and the answer summarized.
    ///
    /// `conversation` is the tool-bearing context up to and including the
    /// second turn's reply; the summary turn runs on its own context.
    Done {
        answer: String,
        tool_answer: String,
        conversation: ConversationState,
    },
}

impl RunOutcome {
    pub fn answer(&self) -> &str {
        match self {
            RunOutcome::DirectAnswer { answer, .. } | RunOutcome::Done { answer, .. } => answer,
        }
    }

    pub fn into_answer(self) -> String {
        match self {
            RunOutcome::DirectAnswer { answer, .. } | RunOutcome::Done { answer, .. } => answer,
        }
    }

    /// Terminal state the run finished in
    pub fn state(&self) -> TurnState {
        match self {
            RunOutcome::DirectAnswer { .. } => TurnState::DirectAnswer,
            RunOutcome::Done { .. } => TurnState::Done,
        }
    }

    pub fn conversation(&self) -> &ConversationState {
        match self {
            RunOutcome::DirectAnswer { conversation, .. }
            | RunOutcome::Done { conversation, .. } => conversation,
        }
    }
}

/// Drives one query through tool selection, tool answer and summary
pub struct TurnOrchestrator {
    llm_client: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl TurnOrchestrator {
    pub fn new(llm_client: Arc<dyn LlmClient>, tools: ToolRegistry, config: AgentConfig) -> Self {
        Self {
            llm_client,
            tools,
            config,
        }
    }

    /// Build the backend, the report client and the default registry from config
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        let llm_client = create_client(&config.backend)?;
        let lookup = Arc::new(TrustyClient::new(&config.lookup)?);
        Ok(Self::new(
            llm_client,
            default_registry(lookup),
            AgentConfig::from(config),
        ))
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Run a query to completion. Any error aborts the run.
    pub async fn run(&self, query: &str) -> Result<RunOutcome> {
        let mut state = TurnState::Init;
        match self.drive(query, &mut state).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                advance(&mut state, TurnState::Failed);
                Err(err)
            }
        }
    }

    async fn drive(&self, query: &str, state: &mut TurnState) -> Result<RunOutcome> {
        info!(
            "Starting run with {} ({})",
            self.llm_client.model_name(),
            self.llm_client.provider_name()
        );

        let mut conversation = ConversationState::seeded(build_user_prompt(query));
        advance(state, TurnState::AwaitingFirstReply);

        let definitions = self.tools.definitions();
        let offered = if definitions.is_empty() {
            None
        } else {
            Some(definitions)
        };
        let reply = self.chat_turn(Turn::ToolSelection, &conversation, offered).await?;

        if !reply.has_tool_calls() {
            let answer = reply.content().to_string();
            conversation.push(reply);
            advance(state, TurnState::DirectAnswer);
            return Ok(RunOutcome::DirectAnswer {
                answer,
                conversation,
            });
        }

        let calls = reply.tool_calls();
        if calls.len() > 1 {
            let ignored: Vec<&str> = calls[1..]
                .iter()
                .map(|call| call.function_name.as_str())
                .collect();
            warn!(
                "Model requested {} tool calls, using only the first; ignoring {:?}",
                calls.len(),
                ignored
            );
        }
        let call = calls[0].clone();
        conversation.push(reply);
        advance(state, TurnState::ToolRequested);

        let tool = self
            .tools
            .get(&call.function_name)
            .ok_or_else(|| Error::UnexpectedTool {
                name: call.function_name.clone(),
            })?;

        info!("Calling tool {}", call.function_name);
        let result = tool.invoke(&call.arguments).await?;
        conversation.push(Message::tool(result.content, call.id.clone()));
        advance(state, TurnState::AwaitingToolResult);

        let reply = self.chat_turn(Turn::ToolAnswer, &conversation, None).await?;
        let tool_answer = reply.content().to_string();
        conversation.push(reply);

        let mut summary_context = ConversationState::seeded(tool_answer.clone());
        summary_context.push(Message::user(SUMMARY_INSTRUCTION));
        advance(state, TurnState::AwaitingSummaryReply);

        let reply = self.chat_turn(Turn::Summary, &summary_context, None).await?;
        advance(state, TurnState::Done);

        Ok(RunOutcome::Done {
            answer: reply.content().to_string(),
            tool_answer,
            conversation,
        })
    }

    /// One model turn under its own deadline
    async fn chat_turn(
        &self,
        turn: Turn,
        conversation: &ConversationState,
        tools: Option<Vec<ToolDefinition>>,
    ) -> Result<Message> {
        debug!(
            "{} turn: {} messages, tools offered: {}",
            turn,
            conversation.len(),
            tools.is_some()
        );

        let response = with_deadline(
            turn,
            self.config.turn_timeout,
            self.llm_client.chat_completion(conversation.snapshot(), tools, self.config.options()),
        )
        .await?;

        if let Some(usage) = &response.usage {
            debug!(
                "{} turn used {} tokens ({} prompt, {} completion)",
                turn, usage.total_tokens, usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(response.message)
    }
}

fn advance(state: &mut TurnState, next: TurnState) {
    debug!("state {} -> {}", state, next);
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackendConfig, ModelParams, Protocol};
    use crate::error::{LlmError, LookupError};
    use crate::llm::{ChatOptions, LlmResponse};
    use crate::tools::{ReportLookup, ToolCall};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    struct Step {
        delay: Option<Duration>,
        message: Message,
    }

    struct RecordedCall {
        messages: Vec<Message>,
        tools_offered: bool,
    }

    // Mock LLM client replaying a fixed script of replies
    struct MockLlmClient {
        script: Mutex<VecDeque<Step>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl MockLlmClient {
        fn new() -> Self {
            Self {
                script: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn reply(self, message: Message) -> Self {
            self.script.lock().unwrap().push_back(Step {
                delay: None,
                message,
            });
            self
        }

        fn delayed_reply(self, delay: Duration, message: Message) -> Self {
            self.script.lock().unwrap().push_back(Step {
                delay: Some(delay),
                message,
            });
            self
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn chat_completion(
            &self,
            messages: Vec<Message>,
            tools: Option<Vec<ToolDefinition>>,
            _options: Option<ChatOptions>,
        ) -> Result<LlmResponse> {
            let step = {
                self.calls.lock().unwrap().push(RecordedCall {
                    messages,
                    tools_offered: tools.map_or(false, |t| !t.is_empty()),
                });
                self.script.lock().unwrap().pop_front()
            };

            let step = step.ok_or_else(|| LlmError::InvalidResponse {
                message: "script exhausted".to_string(),
            })?;
            if let Some(delay) = step.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(LlmResponse::new(step.message, "mock-model"))
        }

        fn model_name(&self) -> &str {
            "mock-model"
        }

        fn provider_name(&self) -> &str {
            "mock"
        }
    }

    struct MockLookup {
        body: String,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl MockLookup {
        fn new(body: &str) -> Self {
            Self {
                body: body.to_string(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ReportLookup for MockLookup {
        async fn lookup(
            &self,
            package_name: &str,
            ecosystem: &str,
        ) -> std::result::Result<String, LookupError> {
            self.calls
                .lock()
                .unwrap()
                .push((package_name.to_string(), ecosystem.to_string()));
            Ok(self.body.clone())
        }
    }

    fn report_call(package_name: &str, ecosystem: &str) -> ToolCall {
        ToolCall::new(
            "trustyReport",
            json!({"package_name": package_name, "ecosystem": ecosystem}),
        )
        .with_id("call_1")
    }

    fn orchestrator(
        llm: &Arc<MockLlmClient>,
        lookup: &Arc<MockLookup>,
        config: AgentConfig,
    ) -> TurnOrchestrator {
        TurnOrchestrator::new(llm.clone(), default_registry(lookup.clone()), config)
    }

    #[tokio::test]
    async fn test_direct_answer_skips_tool() {
        let llm = Arc::new(MockLlmClient::new().reply(Message::assistant("Use left-pad.")));
        let lookup = Arc::new(MockLookup::new("{}"));

        let outcome = orchestrator(&llm, &lookup, AgentConfig::default())
            .run("is left-pad safe")
            .await
            .unwrap();

        assert_eq!(outcome.state(), TurnState::DirectAnswer);
        assert_eq!(outcome.answer(), "Use left-pad.");
        assert_eq!(outcome.conversation().len(), 2);
        assert_eq!(llm.call_count(), 1);
        assert!(llm.calls.lock().unwrap()[0].tools_offered);
        assert!(lookup.calls().is_empty());
    }

    #[tokio::test]
    async fn test_tool_flow_runs_three_turns() {
        let llm = Arc::new(
            MockLlmClient::new()
                .reply(Message::assistant_with_tool_calls(
                    "",
                    vec![report_call("left-pad", "npm")],
                ))
                .reply(Message::assistant("looks fine"))
                .reply(Message::assistant("left-pad is safe to use.")),
        );
        let lookup = Arc::new(MockLookup::new(r#"{"score":0.9}"#));

        let outcome = orchestrator(&llm, &lookup, AgentConfig::default())
            .run("is left-pad safe")
            .await
            .unwrap();

        assert_eq!(outcome.state(), TurnState::Done);
        assert_eq!(outcome.answer(), "left-pad is safe to use.");
        match &outcome {
            RunOutcome::Done { tool_answer, .. } => assert_eq!(tool_answer, "looks fine"),
            other => panic!("expected Done, got {other:?}"),
        }
        assert_eq!(
            lookup.calls(),
            vec![("left-pad".to_string(), "npm".to_string())]
        );

        let calls = llm.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);

        assert_eq!(
            calls[0].messages,
            vec![Message::user(build_user_prompt("is left-pad safe"))]
        );
        assert!(calls[0].tools_offered);

        assert_eq!(calls[1].messages.len(), 3);
        assert_eq!(
            calls[1].messages[2],
            Message::tool("{\n  \"score\": 0.9\n}", Some("call_1".to_string()))
        );
        assert!(!calls[1].tools_offered);

        assert_eq!(
            calls[2].messages,
            vec![Message::user("looks fine"), Message::user(SUMMARY_INSTRUCTION)]
        );
        assert!(!calls[2].tools_offered);
    }

    #[tokio::test]
    async fn test_unregistered_tool_fails_fast() {
        let llm = Arc::new(MockLlmClient::new().reply(Message::assistant_with_tool_calls(
            "",
            vec![ToolCall::new("otherTool", json!({}))],
        )));
        let lookup = Arc::new(MockLookup::new("{}"));

        let err = orchestrator(&llm, &lookup, AgentConfig::default())
            .run("is left-pad safe")
            .await
            .unwrap_err();

        assert!(matches!(&err, Error::UnexpectedTool { name } if name == "otherTool"));
        assert_eq!(err.kind(), "UnexpectedToolError");
        assert_eq!(llm.call_count(), 1);
        assert!(lookup.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_argument_is_fatal() {
        let llm = Arc::new(MockLlmClient::new().reply(Message::assistant_with_tool_calls(
            "",
            vec![ToolCall::new(
                "trustyReport",
                json!({"package_name": "left-pad"}),
            )],
        )));
        let lookup = Arc::new(MockLookup::new("{}"));

        let err = orchestrator(&llm, &lookup, AgentConfig::default())
            .run("is left-pad safe")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "ArgumentError");
        assert_eq!(llm.call_count(), 1);
        assert!(lookup.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_report_stops_before_second_turn() {
        let llm = Arc::new(
            MockLlmClient::new()
                .reply(Message::assistant_with_tool_calls(
                    "",
                    vec![report_call("left-pad", "npm")],
                ))
                .reply(Message::assistant("unreachable")),
        );
        let lookup = Arc::new(MockLookup::new("<html>oops</html>"));

        let err = orchestrator(&llm, &lookup, AgentConfig::default())
            .run("is left-pad safe")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "LookupError");
        assert_eq!(lookup.calls().len(), 1);
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_second_turn_timeout() {
        let llm = Arc::new(
            MockLlmClient::new()
                .reply(Message::assistant_with_tool_calls(
                    "",
                    vec![report_call("left-pad", "npm")],
                ))
                .delayed_reply(Duration::from_secs(2), Message::assistant("too late")),
        );
        let lookup = Arc::new(MockLookup::new(r#"{"score":0.9}"#));
        let config = AgentConfig::default().with_turn_timeout(Duration::from_millis(50));

        let err = orchestrator(&llm, &lookup, config)
            .run("is left-pad safe")
            .await
            .unwrap_err();

        match err {
            Error::Timeout { turn, .. } => assert_eq!(turn, Turn::ToolAnswer),
            other => panic!("expected timeout, got {other:?}"),
        }
        assert_eq!(llm.call_count(), 2);
        assert_eq!(lookup.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_each_turn_gets_its_own_deadline() {
        // Every turn takes most of the bound; the run as a whole exceeds it.
        let delay = Duration::from_millis(100);
        let llm = Arc::new(
            MockLlmClient::new()
                .delayed_reply(
                    delay,
                    Message::assistant_with_tool_calls("", vec![report_call("left-pad", "npm")]),
                )
                .delayed_reply(delay, Message::assistant("looks fine"))
                .delayed_reply(delay, Message::assistant("safe")),
        );
        let lookup = Arc::new(MockLookup::new(r#"{"score":0.9}"#));
        let config = AgentConfig::default().with_turn_timeout(Duration::from_millis(250));

        let outcome = orchestrator(&llm, &lookup, config)
            .run("is left-pad safe")
            .await
            .unwrap();

        assert_eq!(outcome.into_answer(), "safe");
    }

    #[tokio::test]
    async fn test_only_first_tool_call_is_used() {
        let llm = Arc::new(
            MockLlmClient::new()
                .reply(Message::assistant_with_tool_calls(
                    "",
                    vec![
                        report_call("left-pad", "npm"),
                        ToolCall::new(
                            "trustyReport",
                            json!({"package_name": "requests", "ecosystem": "pypi"}),
                        ),
                    ],
                ))
                .reply(Message::assistant("looks fine"))
                .reply(Message::assistant("safe")),
        );
        let lookup = Arc::new(MockLookup::new(r#"{"score":0.9}"#));

        let outcome = orchestrator(&llm, &lookup, AgentConfig::default())
            .run("compare left-pad and requests")
            .await
            .unwrap();

        assert_eq!(outcome.state(), TurnState::Done);
        assert_eq!(
            lookup.calls(),
            vec![("left-pad".to_string(), "npm".to_string())]
        );
        assert_eq!(llm.call_count(), 3);
    }

    #[test]
    fn test_from_config_requires_api_key_for_openai() {
        let config = ResolvedConfig::new(BackendConfig {
            protocol: Protocol::OpenAICompat,
            host: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            api_key: None,
            params: ModelParams::default(),
        });
        let err = TurnOrchestrator::from_config(&config).err().unwrap();
        assert_eq!(err.kind(), "BackendError");
    }

    #[test]
    fn test_from_config_ollama() {
        let config = ResolvedConfig::new(BackendConfig {
            protocol: Protocol::Ollama,
            host: "localhost:11434".to_string(),
            model: "llama3.1".to_string(),
            api_key: None,
            params: ModelParams::default(),
        });
        let orchestrator = TurnOrchestrator::from_config(&config).unwrap();
        assert_eq!(orchestrator.config().turn_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_terminal_states() {
        assert!(TurnState::Done.is_terminal());
        assert!(TurnState::Failed.is_terminal());
        assert!(!TurnState::AwaitingToolResult.is_terminal());
        assert_eq!(
            TurnState::AwaitingSummaryReply.to_string(),
            "awaiting_summary_reply"
        );
    }
}
