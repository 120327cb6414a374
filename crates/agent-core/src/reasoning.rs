//! Reasoning Loop
//!
//! ReAct-style loop: ask the model, run any tool it requests, feed the tool's
//! JSON back as context, and repeat until the model answers in plain text.

use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::message::{Conversation, Message};
use crate::provider::{GenerationOptions, LlmProvider};
use crate::tool::{Tool, ToolCall, ToolRegistry, ToolResult};

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Base system prompt
    pub system_prompt: String,

    /// Maximum model round trips per user turn
    pub max_iterations: usize,

    pub generation: GenerationOptions,

    /// Whether to append tool descriptions to the system prompt
    pub inject_tool_descriptions: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_iterations: 10,
            generation: GenerationOptions::default(),
            inject_tool_descriptions: true,
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Use the available tools when they help answer the question. Be concise and accurate.";

const TOOL_FENCE: &str = "```tool";

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    pub fn new(provider: Arc<dyn LlmProvider>, tools: Arc<ToolRegistry>, config: AgentConfig) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Build the full system prompt including tool descriptions
    pub fn system_prompt(&self) -> String {
        let mut prompt = self.config.system_prompt.clone();

        if self.config.inject_tool_descriptions && !self.tools.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(&self.tools.generate_prompt_section());
        }

        prompt
    }

    /// Run the agent until it produces a final answer.
    ///
    /// The conversation must already contain the user's message.
    pub async fn run(&self, conversation: &mut Conversation) -> Result<String> {
        conversation.ensure_system_prompt(|| self.system_prompt());

        for iteration in 1..=self.config.max_iterations {
            conversation.truncate_to_fit();

            let completion = self
                .provider
                .complete(conversation.messages(), &self.config.generation)
                .await?;

            let content = completion.content;
            conversation.push(Message::assistant(&content));

            let Some(call) = parse_tool_call(&content) else {
                tracing::debug!(iteration, "Agent produced final answer");
                return Ok(content);
            };

            tracing::info!(tool = %call.name, iteration, "Executing tool");
            let result = self.execute_tool(&call).await;
            conversation.push(Message::tool(&result));
        }

        Err(AgentError::MaxIterations(self.config.max_iterations))
    }

    /// Answer a single question in a fresh conversation
    pub async fn ask(&self, question: &str) -> Result<String> {
        let mut conversation = Conversation::with_system_prompt(self.system_prompt());
        conversation.push(Message::user(question));
        self.run(&mut conversation).await
    }

    /// Execute a tool call. Registry failures become error results so they
    /// reach the model instead of aborting the turn.
    async fn execute_tool(&self, call: &ToolCall) -> ToolResult {
        let result = match self.tools.execute(call).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "Tool call rejected");
                ToolResult::failure(call.name.clone(), e.to_string())
            }
        };

        match &call.id {
            Some(id) => result.with_id(id.clone()),
            None => result,
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Parse a tool call from a model response.
///
/// Accepts a fenced ```` ```tool ```` block, or failing that an inline JSON
/// object with a `"tool"` key.
pub fn parse_tool_call(content: &str) -> Option<ToolCall> {
    let call = parse_fenced_tool_call(content).or_else(|| parse_inline_tool_call(content))?;

    Some(match call.id {
        Some(_) => call,
        None => ToolCall {
            id: Some(uuid::Uuid::new_v4().to_string()),
            ..call
        },
    })
}

fn parse_fenced_tool_call(content: &str) -> Option<ToolCall> {
    let start = content.find(TOOL_FENCE)?;
    let after_marker = &content[start + TOOL_FENCE.len()..];
    let end = after_marker.find("```")?;
    serde_json::from_str(after_marker[..end].trim()).ok()
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

    serde_json::from_str(&content[start..=end]).ok()
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
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
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
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

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    pub const fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        Ok(Agent::new(provider, Arc::new(self.tools), self.config))
    }
}
