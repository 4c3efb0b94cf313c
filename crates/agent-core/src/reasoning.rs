//! Reasoning Loop
//!
//! Implements the ReAct (Reason + Act) pattern: the agent asks the gateway for
//! the next step, runs the requested tool, folds the result back into the
//! conversation, and repeats until the model produces a plain answer or the
//! iteration ceiling is hit.
//!
//! ```text
//!   Reasoning ──directive──▶ AwaitingToolResult ──result──▶ Reasoning
//!       │                                                      │
//!       └──plain answer──▶ Done          ceiling reached ──▶ Aborted
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::error::{AgentError, Result};
use crate::gateway::ChatGateway;
use crate::message::{Conversation, Message};
use crate::tool::{ToolCall, ToolInvocation, ToolOutcome, ToolRegistry};

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// System persona
    pub system_prompt: String,

    /// Maximum reasoning iterations; values below 1 are treated as 1
    pub max_iterations: usize,

    /// Deadline for a single tool invocation
    pub tool_timeout: Duration,

    /// Whether to append tool descriptions to system prompt
    pub inject_tool_descriptions: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_iterations: 10,
            tool_timeout: Duration::from_secs(30),
            inject_tool_descriptions: true,
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a helpful AI assistant.

When you need to use a tool, respond with a JSON block in this exact format:
```tool
{"tool": "tool_name", "arguments": {"arg1": "value1"}}
```

After receiving tool results, synthesize them into a helpful response.
If you can answer directly without tools, do so.
Be concise and accurate."#;

/// Loop state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    Reasoning,
    AwaitingToolResult,
    Done,
    Aborted,
}

/// Result of one reasoning run
#[derive(Clone, Debug, Serialize)]
pub struct AgentOutcome {
    /// Final answer, or the best partial text when aborted
    pub answer: String,

    /// `Done` or `Aborted`
    pub state: AgentState,

    /// Gateway calls made
    pub iterations: usize,

    /// Tool calls made, in order
    pub invocations: Vec<ToolInvocation>,
}

impl AgentOutcome {
    pub fn is_done(&self) -> bool {
        self.state == AgentState::Done
    }
}

/// The main Agent struct
pub struct Agent {
    gateway: Arc<ChatGateway>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        gateway: Arc<ChatGateway>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            gateway,
            tools,
            config,
        }
    }

    /// Create with default configuration
    pub fn with_defaults(gateway: Arc<ChatGateway>, tools: Arc<ToolRegistry>) -> Self {
        Self::new(gateway, tools, AgentConfig::default())
    }

    /// Build the full system prompt including tool descriptions
    pub fn build_system_prompt(&self) -> String {
        let mut prompt = self.config.system_prompt.clone();

        if self.config.inject_tool_descriptions && !self.tools.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(&self.tools.generate_prompt_section());
        }

        prompt
    }

    /// Seed a conversation with the persona, tool docs and the user request
    pub fn conversation_for(&self, request: &str) -> Conversation {
        let mut conversation = Conversation::with_system_prompt(self.build_system_prompt());
        conversation.push(Message::user(request));
        conversation
    }

    /// Run the reasoning loop on a seeded conversation.
    ///
    /// Always terminates within `max_iterations` gateway calls.
    pub async fn run(&self, conversation: &mut Conversation) -> AgentOutcome {
        if !conversation.has_system_prompt() {
            tracing::debug!("Running agent on a conversation without a system prompt");
        }

        let ceiling = self.config.max_iterations.max(1);
        let mut state = AgentState::Reasoning;
        let mut invocations = Vec::new();
        let mut last_reply = String::new();
        let mut iterations = 0;

        while iterations < ceiling {
            iterations += 1;

            let content = self.gateway.complete(conversation.messages()).await;
            conversation.push(Message::assistant(&content));

            let Some(call) = parse_tool_call(&content) else {
                transition(&mut state, AgentState::Done, iterations);
                return AgentOutcome {
                    answer: content,
                    state,
                    iterations,
                    invocations,
                };
            };

            transition(&mut state, AgentState::AwaitingToolResult, iterations);
            tracing::debug!(tool = %call.name, iteration = iterations, "Executing tool");

            let invocation = self.invoke_tool(call).await;
            conversation.push(Message::tool(invocation.to_message_content(), &invocation.tool));
            invocations.push(invocation);
            last_reply = content;

            transition(&mut state, AgentState::Reasoning, iterations);
        }

        tracing::warn!(
            ceiling,
            tool_calls = invocations.len(),
            "{}; returning best partial answer",
            AgentError::MaxIterations(ceiling)
        );
        transition(&mut state, AgentState::Aborted, iterations);

        AgentOutcome {
            answer: last_reply,
            state,
            iterations,
            invocations,
        }
    }

    /// Run with a simple string input (creates temporary conversation)
    pub async fn ask(&self, question: &str) -> AgentOutcome {
        let mut conversation = self.conversation_for(question);
        self.run(&mut conversation).await
    }

    /// Invoke a tool, converting every failure into descriptive text
    async fn invoke_tool(&self, call: ToolCall) -> ToolInvocation {
        let timeout = self.config.tool_timeout;
        let result = match tokio::time::timeout(timeout, self.tools.invoke(&call)).await {
            Ok(result) => result,
            Err(_) => Err(AgentError::Timeout(timeout)),
        };

        let (result, outcome) = match result {
            Ok(output) => (output, ToolOutcome::Ok),
            Err(AgentError::ToolNotFound(name)) => (
                format!(
                    "Tool '{}' is not available. Available tools: {}",
                    name,
                    self.tools.names().join(", ")
                ),
                ToolOutcome::Error,
            ),
            Err(e) => {
                tracing::debug!(tool = %call.name, error = %e, "Tool invocation failed");
                (format!("Error: {}", e), ToolOutcome::Error)
            }
        };

        ToolInvocation {
            tool: call.name,
            arguments: call.arguments,
            result,
            outcome,
        }
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

fn transition(state: &mut AgentState, next: AgentState, iteration: usize) {
    tracing::trace!(from = ?*state, to = ?next, iteration, "Agent state transition");
    *state = next;
}

/// Parse a tool call directive from an LLM response.
///
/// Recognizes a fenced ```` ```tool ```` block first, then an inline JSON object
/// carrying a `"tool"` key.
pub fn parse_tool_call(content: &str) -> Option<ToolCall> {
    const TOOL_FENCE: &str = "```tool";
    const FENCE: &str = "```";

    if let Some(start_idx) = content.find(TOOL_FENCE) {
        let after_marker = &content[start_idx + TOOL_FENCE.len()..];
        if let Some(end_idx) = after_marker.find(FENCE) {
            if let Some(call) = ToolCall::from_directive(after_marker[..end_idx].trim()) {
                return Some(call);
            }
        }
    }

    parse_inline_tool_call(content)
}

fn parse_inline_tool_call(content: &str) -> Option<ToolCall> {
    if !content.contains(r#""tool""#) {
        return None;
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;

    if end <= start {
        return None;
    }

    ToolCall::from_directive(&content[start..=end])
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    gateway: Option<Arc<ChatGateway>>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            gateway: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
        }
    }

    pub fn gateway(mut self, gateway: Arc<ChatGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn tool<T: crate::tool::Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn tool_timeout(mut self, timeout: Duration) -> Self {
        self.config.tool_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let gateway = self
            .gateway
            .ok_or_else(|| AgentError::Config("Chat gateway is required".into()))?;

        Ok(Agent::new(gateway, Arc::new(self.tools), self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayConfig, DEGRADED_RESPONSE};
    use crate::message::Role;
    use crate::mock::{MockProvider, MockReply};
    use crate::provider::{ProviderKind, ProviderProfile};
    use crate::tool::{Tool, ToolSchema};
    use async_trait::async_trait;

    struct SumTool;

    #[async_trait]
    impl Tool for SumTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "sum".into(),
                description: "Sum a JSON array of integers".into(),
                parameters: Vec::new(),
                example: None,
            }
        }

        async fn invoke(&self, arguments: &str) -> Result<String> {
            let values: Vec<i64> = serde_json::from_str(arguments)
                .map_err(|e| AgentError::ToolValidation(e.to_string()))?;
            Ok(values.iter().sum::<i64>().to_string())
        }
    }

    struct SlowTool;

    #[async_trait]
    impl Tool for SlowTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "slow".into(),
                description: "Never finishes".into(),
                parameters: Vec::new(),
                example: None,
            }
        }

        async fn invoke(&self, _arguments: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("late".into())
        }
    }

    fn agent_with(provider: MockProvider, max_iterations: usize) -> (Agent, Arc<MockProvider>) {
        let provider = Arc::new(provider);
        let gateway = ChatGateway::new(GatewayConfig {
            attempt_timeout: Duration::from_millis(50),
        })
        .with_provider(
            ProviderProfile::new("mock", ProviderKind::OpenAiCompatible, "http://mock", "mock-model", 0),
            provider.clone(),
        );

        let agent = AgentBuilder::new()
            .gateway(Arc::new(gateway))
            .tool(SumTool)
            .tool(SlowTool)
            .max_iterations(max_iterations)
            .tool_timeout(Duration::from_millis(50))
            .build()
            .unwrap();
        (agent, provider)
    }

    #[test]
    fn test_parse_fenced_tool_call() {
        let content = r#"Let me check that for you.
```tool
{"tool": "sum", "arguments": [1, 2]}
```"#;
        let call = parse_tool_call(content).unwrap();
        assert_eq!(call.name, "sum");
        assert_eq!(call.arguments, "[1,2]");
    }

    #[test]
    fn test_parse_inline_tool_call() {
        let call = parse_tool_call(r#"Calling {"tool": "sum", "arguments": "[3]"} now"#).unwrap();
        assert_eq!(call.name, "sum");
        assert_eq!(call.arguments, "[3]");
    }

    #[test]
    fn test_plain_answer_is_not_a_tool_call() {
        assert!(parse_tool_call(r#"{"destination": "Beijing", "daily_plans": []}"#).is_none());
        assert!(parse_tool_call("Here is your plan.").is_none());
    }

    #[tokio::test]
    async fn test_tool_round_trip_then_answer() {
        let provider = MockProvider::new("mock")
            .reply("```tool\n{\"tool\": \"sum\", \"arguments\": [1947, 450, 0, 498]}\n```")
            .reply("Daily cost is 2895.");
        let (agent, _) = agent_with(provider, 5);

        let mut conversation = agent.conversation_for("How much is day one?");
        let outcome = agent.run(&mut conversation).await;

        assert_eq!(outcome.state, AgentState::Done);
        assert_eq!(outcome.answer, "Daily cost is 2895.");
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.invocations.len(), 1);
        assert_eq!(outcome.invocations[0].result, "2895");
        assert!(outcome.invocations[0].is_ok());

        let roles: Vec<Role> = conversation.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::Tool, Role::Assistant]
        );
        assert!(conversation.messages()[3].content.contains("2895"));
    }

    #[tokio::test]
    async fn test_unknown_tool_continues_loop() {
        let provider = MockProvider::new("mock")
            .reply(r#"```tool
{"tool": "teleport", "arguments": {}}
```"#)
            .reply("Final answer without teleporting.");
        let (agent, provider) = agent_with(provider, 5);

        let mut conversation = agent.conversation_for("go");
        let outcome = agent.run(&mut conversation).await;

        assert!(outcome.is_done());
        assert_eq!(provider.calls(), 2);
        let inv = &outcome.invocations[0];
        assert_eq!(inv.outcome, ToolOutcome::Error);
        assert!(inv.result.contains("not available"));
        assert!(inv.result.contains("sum"));

        // The second gateway call saw the tool-role explanation.
        let seen = provider.seen_messages().await;
        assert!(seen[1].last().unwrap().contains("teleport"));
    }

    #[tokio::test]
    async fn test_tool_error_becomes_text() {
        let provider = MockProvider::new("mock")
            .reply(r#"{"tool": "sum", "arguments": "not json"}"#)
            .reply("done");
        let (agent, _) = agent_with(provider, 5);

        let outcome = agent.ask("x").await;
        assert!(outcome.is_done());
        assert!(outcome.invocations[0].result.starts_with("Error: Tool validation error"));
    }

    #[tokio::test]
    async fn test_tool_timeout_becomes_text() {
        let provider = MockProvider::new("mock")
            .reply(r#"```tool
{"tool": "slow"}
```"#)
            .reply("gave up on slow tool");
        let (agent, _) = agent_with(provider, 5);

        let outcome = agent.ask("x").await;
        assert!(outcome.is_done());
        assert!(outcome.invocations[0].result.contains("Timed out"));
    }

    #[tokio::test]
    async fn test_loop_terminates_at_ceiling() {
        let directive = "Still working\n```tool\n{\"tool\": \"sum\", \"arguments\": [1]}\n```";
        let provider = MockProvider::new("mock").always(MockReply::Text(directive.into()));
        let (agent, provider) = agent_with(provider, 3);

        let outcome = agent.ask("loop forever").await;

        assert_eq!(outcome.state, AgentState::Aborted);
        assert_eq!(outcome.iterations, 3);
        assert_eq!(provider.calls(), 3);
        assert_eq!(outcome.invocations.len(), 3);
        assert_eq!(outcome.answer, directive);
    }

    #[tokio::test]
    async fn test_zero_ceiling_treated_as_one() {
        let provider = MockProvider::new("mock").always(MockReply::Text("answer".into()));
        let (agent, provider) = agent_with(provider, 0);

        let outcome = agent.ask("x").await;
        assert!(outcome.is_done());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_degraded_gateway_yields_plain_answer() {
        let provider = MockProvider::new("mock").timeout();
        let (agent, _) = agent_with(provider, 3);

        let outcome = agent.ask("x").await;
        assert!(outcome.is_done());
        assert_eq!(outcome.answer, DEGRADED_RESPONSE);
    }

    #[test]
    fn test_builder_requires_gateway() {
        assert!(matches!(AgentBuilder::new().build(), Err(AgentError::Config(_))));
    }

    #[test]
    fn test_system_prompt_includes_tools() {
        let (agent, _) = agent_with(MockProvider::new("mock"), 1);
        let prompt = agent.build_system_prompt();
        assert!(prompt.contains("### slow"));
        assert!(prompt.contains("### sum"));
    }
}
