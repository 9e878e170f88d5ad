use super::LlmBackend;
use crate::config::{LlmProvider, ModelConfig};
use crate::llm::LlmResponse;
use async_trait::async_trait;
use company_core::{CompanyError, CompanyResult, Message, Role, ToolCall};
use company_tools::ToolDescriptor;

/// OpenAI-compatible API backend.
///
/// Works with OpenAI, OpenRouter, Groq and any other provider that
/// implements the chat completions API.
pub struct OpenAiBackend {
    config: ModelConfig,
    http: reqwest::Client,
}

impl OpenAiBackend {
    /// Backend for `config`.
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn build_messages(
        &self,
        system_prompt: Option<&str>,
        messages: &[Message],
    ) -> Vec<serde_json::Value> {
        let mut api_messages: Vec<serde_json::Value> = Vec::new();

        if let Some(sys) = system_prompt {
            api_messages.push(serde_json::json!({
                "role": "system",
                "content": sys
            }));
        }

        for m in messages {
            let role = match m.role {
                Role::User | Role::Tool => "user",
                Role::Assistant => "assistant",
                Role::System => continue,
            };
            api_messages.push(serde_json::json!({
                "role": role,
                "content": m.content
            }));
        }

        api_messages
    }

    fn build_tools(&self, tools: &[ToolDescriptor]) -> Vec<serde_json::Value> {
        tools
            .iter()
            .map(|t| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters_schema,
                    }
                })
            })
            .collect()
    }

    fn add_provider_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json");

        // OpenRouter asks callers to identify themselves
        if matches!(self.config.provider, LlmProvider::OpenRouter) {
            request.header("X-Title", "company-ai")
        } else {
            request
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn chat(
        &self,
        system_prompt: Option<&str>,
        messages: &[Message],
        tools: &[ToolDescriptor],
    ) -> CompanyResult<LlmResponse> {
        let url = format!("{}/v1/chat/completions", self.config.base_url());

        let mut body = serde_json::json!({
            "model": self.config.model_id,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": self.build_messages(system_prompt, messages),
        });

        if !tools.is_empty() {
            body["tools"] = serde_json::json!(self.build_tools(tools));
        }

        let resp = self
            .add_provider_headers(self.http.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| CompanyError::Http(e.to_string()))?;

        let status = resp.status();
        let resp_body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| CompanyError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(CompanyError::Http(format!(
                "OpenAI API error {status}: {resp_body}"
            )));
        }

        parse_openai_response(&resp_body)
    }
}

/// Map a chat completions response body to an [`LlmResponse`].
pub fn parse_openai_response(body: &serde_json::Value) -> CompanyResult<LlmResponse> {
    let choice = &body["choices"][0];
    if choice.is_null() {
        return Err(CompanyError::Agent("Missing choices in OpenAI response".into()));
    }
    let message = &choice["message"];
    let content = message["content"].as_str().unwrap_or_default().to_string();

    if let Some(tool_calls_json) = message["tool_calls"].as_array() {
        let tool_calls: Vec<ToolCall> = tool_calls_json
            .iter()
            .filter_map(|tc| {
                let id = tc["id"].as_str()?;
                let name = tc["function"]["name"].as_str()?;
                let arguments: serde_json::Value =
                    serde_json::from_str(tc["function"]["arguments"].as_str()?).unwrap_or_default();
                Some(ToolCall::new(id, name, arguments))
            })
            .collect();

        if !tool_calls.is_empty() {
            return Ok(LlmResponse::ToolUse {
                content: if content.is_empty() {
                    None
                } else {
                    Some(content)
                },
                tool_calls,
            });
        }
    }

    let finish_reason = choice["finish_reason"].as_str().unwrap_or("stop");
    if finish_reason == "stop" {
        Ok(LlmResponse::Done(content))
    } else {
        Ok(LlmResponse::Text(content))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tool_calls() {
        let body = serde_json::json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "cost_model", "arguments": "{\"initiative\":\"app\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        });
        match parse_openai_response(&body).unwrap() {
            LlmResponse::ToolUse { content, tool_calls } => {
                assert!(content.is_none());
                assert_eq!(tool_calls[0].arguments["initiative"], "app");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_stop() {
        let body = serde_json::json!({
            "choices": [{"message": {"content": "Approved."}, "finish_reason": "stop"}]
        });
        assert!(matches!(
            parse_openai_response(&body).unwrap(),
            LlmResponse::Done(text) if text == "Approved."
        ));
    }

    #[test]
    fn test_empty_tool_calls_array_is_text() {
        let body = serde_json::json!({
            "choices": [{"message": {"content": "Done", "tool_calls": []}, "finish_reason": "stop"}]
        });
        assert!(matches!(parse_openai_response(&body).unwrap(), LlmResponse::Done(_)));
    }

    #[test]
    fn test_missing_choices() {
        assert!(parse_openai_response(&serde_json::json!({})).is_err());
    }
}
