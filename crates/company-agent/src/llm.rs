use crate::backends::claude::ClaudeBackend;
use crate::backends::openai::OpenAiBackend;
use crate::backends::LlmBackend;
use crate::config::{LlmProvider, ModelConfig};
use crate::failover::FailoverBackend;
use company_core::{CompanyResult, Message, ToolCall};
use company_tools::ToolDescriptor;

/// Response from the LLM: text content or a tool call request.
#[derive(Debug)]
pub enum LlmResponse {
    /// Text that was cut short (e.g. hit the token limit).
    Text(String),
    /// The model wants tools run before it continues.
    ToolUse {
        /// Text emitted alongside the calls.
        content: Option<String>,
        /// Calls to execute, in order.
        tool_calls: Vec<ToolCall>,
    },
    /// The model finished its turn.
    Done(String),
}

fn provider_backend(config: ModelConfig) -> Box<dyn LlmBackend> {
    match config.provider {
        LlmProvider::Claude => Box::new(ClaudeBackend::new(config)),
        LlmProvider::OpenAi | LlmProvider::OpenRouter | LlmProvider::Groq => {
            Box::new(OpenAiBackend::new(config))
        }
    }
}

/// Build the backend for `config`, wrapped in a [`FailoverBackend`] when it
/// declares fallback models or a retry policy.
pub fn build_backend(config: &ModelConfig) -> CompanyResult<Box<dyn LlmBackend>> {
    if config.fallback_models.is_empty() && config.retry_policy.is_none() {
        return Ok(provider_backend(config.clone()));
    }

    let policy = config.retry_policy.clone().unwrap_or_default();
    let mut backends = vec![provider_backend(config.clone())];
    backends.extend(config.fallback_models.iter().cloned().map(provider_backend));
    Ok(Box::new(FailoverBackend::new(backends, policy)?))
}

/// LLM client that dispatches to the configured provider backend.
pub struct LlmClient {
    backend: Box<dyn LlmBackend>,
}

impl LlmClient {
    /// Client for `config`, including its fallback models.
    pub fn new(config: &ModelConfig) -> CompanyResult<Self> {
        Ok(Self {
            backend: build_backend(config)?,
        })
    }

    /// Create from a pre-built backend (custom providers, tests).
    pub fn from_backend(backend: Box<dyn LlmBackend>) -> Self {
        Self { backend }
    }

    /// One model call.
    pub async fn chat(
        &self,
        system_prompt: Option<&str>,
        messages: &[Message],
        tools: &[ToolDescriptor],
    ) -> CompanyResult<LlmResponse> {
        self.backend.chat(system_prompt, messages, tools).await
    }
}
