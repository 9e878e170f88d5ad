use crate::failover::RetryPolicy;
use serde::{Deserialize, Serialize};

/// Supported model providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Anthropic Claude.
    Claude,
    /// OpenAI.
    OpenAi,
    /// OpenRouter, OpenAI-compatible API.
    OpenRouter,
    /// Groq cloud inference, OpenAI-compatible API.
    Groq,
}

impl LlmProvider {
    /// Environment variable holding this provider's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            LlmProvider::Claude => "ANTHROPIC_API_KEY",
            LlmProvider::OpenAi => "OPENAI_API_KEY",
            LlmProvider::OpenRouter => "OPENROUTER_API_KEY",
            LlmProvider::Groq => "GROQ_API_KEY",
        }
    }
}

/// Which model an agent talks to, and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider to call.
    pub provider: LlmProvider,
    /// Provider-specific model name.
    pub model_id: String,
    /// Left empty in config files; filled from the provider's env var.
    #[serde(default)]
    pub api_key: String,
    /// Overrides the provider's default endpoint.
    pub api_base_url: Option<String>,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Completion token limit per call.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Tool loop turns before the agent gives up.
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
    /// Tried in order when this model keeps failing.
    #[serde(default)]
    pub fallback_models: Vec<ModelConfig>,
    /// Transport retries; defaults apply when unset.
    #[serde(default)]
    pub retry_policy: Option<RetryPolicy>,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_max_turns() -> u32 {
    20
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Claude,
            model_id: "claude-sonnet-4-20250514".to_string(),
            api_key: String::new(),
            api_base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_turns: default_max_turns(),
            fallback_models: Vec::new(),
            retry_policy: None,
        }
    }
}

impl ModelConfig {
    /// Endpoint root, with the provider default when no override is set.
    pub fn base_url(&self) -> &str {
        if let Some(url) = &self.api_base_url {
            url
        } else {
            match self.provider {
                LlmProvider::Claude => "https://api.anthropic.com",
                LlmProvider::OpenAi => "https://api.openai.com",
                LlmProvider::OpenRouter => "https://openrouter.ai/api",
                LlmProvider::Groq => "https://api.groq.com/openai",
            }
        }
    }

    /// Fill empty API keys (this model and its fallbacks) through `lookup`,
    /// keyed by the provider's env var name.
    pub fn resolve_api_keys<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.api_key.trim().is_empty() {
            if let Some(key) = lookup(self.provider.api_key_env()) {
                self.api_key = key;
            }
        }
        for fallback in &mut self.fallback_models {
            fallback.resolve_api_keys(lookup);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_toml() {
        let config: ModelConfig = toml::from_str(
            r#"
            provider = "groq"
            model_id = "llama-3.3-70b-versatile"
            "#,
        )
        .unwrap();
        assert_eq!(config.provider, LlmProvider::Groq);
        assert_eq!(config.max_turns, 20);
        assert_eq!(config.base_url(), "https://api.groq.com/openai");
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_fallbacks_and_retry_policy() {
        let config: ModelConfig = toml::from_str(
            r#"
            provider = "claude"
            model_id = "claude-sonnet-4-20250514"
            api_base_url = "http://localhost:9999"

            [retry_policy]
            max_retries = 1
            backoff_base_ms = 10
            backoff_max_ms = 100

            [[fallback_models]]
            provider = "openai"
            model_id = "gpt-4o-mini"
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url(), "http://localhost:9999");
        assert_eq!(config.fallback_models[0].provider, LlmProvider::OpenAi);
        assert_eq!(config.retry_policy.unwrap().max_retries, 1);
    }

    #[test]
    fn test_resolve_api_keys_keeps_explicit_key() {
        let mut config = ModelConfig {
            api_key: "explicit".to_string(),
            fallback_models: vec![ModelConfig {
                provider: LlmProvider::OpenRouter,
                ..ModelConfig::default()
            }],
            ..ModelConfig::default()
        };
        config.resolve_api_keys(&|name: &str| Some(format!("from-{name}")));
        assert_eq!(config.api_key, "explicit");
        assert_eq!(config.fallback_models[0].api_key, "from-OPENROUTER_API_KEY");
    }
}
