use super::LlmBackend;
use crate::config::ModelConfig;
use crate::llm::LlmResponse;
use async_trait::async_trait;
use company_core::{CompanyError, CompanyResult, Message, Role, ToolCall};
use company_tools::ToolDescriptor;
use serde::Serialize;

/// Claude (Anthropic) API backend.
pub struct ClaudeBackend {
    config: ModelConfig,
    http: reqwest::Client,
}

impl ClaudeBackend {
    /// Backend for `config`; no request is sent until `chat`.
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LlmBackend for ClaudeBackend {
    async fn chat(
        &self,
        system_prompt: Option<&str>,
        messages: &[Message],
        tools: &[ToolDescriptor],
    ) -> CompanyResult<LlmResponse> {
        let url = format!("{}/v1/messages", self.config.base_url());

        let api_messages: Vec<ClaudeMessage> = messages
            .iter()
            .filter_map(|m| {
                let role = match m.role {
                    Role::User | Role::Tool => "user",
                    Role::Assistant => "assistant",
                    Role::System => return None,
                };
                Some(ClaudeMessage {
                    role,
                    content: &m.content,
                })
            })
            .collect();

        let claude_tools: Vec<ClaudeTool> = tools
            .iter()
            .map(|t| ClaudeTool {
                name: &t.name,
                description: &t.description,
                input_schema: &t.parameters_schema,
            })
            .collect();

        let mut body = serde_json::json!({
            "model": self.config.model_id,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": api_messages,
        });

        if let Some(sys) = system_prompt {
            body["system"] = serde_json::json!(sys);
        }

        if !claude_tools.is_empty() {
            body["tools"] = serde_json::to_value(&claude_tools)?;
        }

        let resp = self
            .http
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
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
                "Claude API error {status}: {resp_body}"
            )));
        }

        parse_claude_response(&resp_body)
    }
}

// -- Claude wire types --

#[derive(Serialize)]
struct ClaudeMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ClaudeTool<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a serde_json::Value,
}

/// Map a Messages API response body to an [`LlmResponse`].
pub fn parse_claude_response(body: &serde_json::Value) -> CompanyResult<LlmResponse> {
    let content = body["content"]
        .as_array()
        .ok_or_else(|| CompanyError::Agent("Missing content in Claude response".into()))?;

    let mut text_parts = Vec::new();
    let mut tool_calls = Vec::new();

    for block in content {
        match block["type"].as_str() {
            Some("text") => {
                if let Some(t) = block["text"].as_str() {
                    text_parts.push(t.to_string());
                }
            }
            Some("tool_use") => {
                tool_calls.push(ToolCall::new(
                    block["id"].as_str().unwrap_or_default(),
                    block["name"].as_str().unwrap_or_default(),
                    block["input"].clone(),
                ));
            }
            _ => {}
        }
    }

    if !tool_calls.is_empty() {
        return Ok(LlmResponse::ToolUse {
            content: if text_parts.is_empty() {
                None
            } else {
                Some(text_parts.join("\n"))
            },
            tool_calls,
        });
    }

    let stop_reason = body["stop_reason"].as_str().unwrap_or("end_turn");
    let text = text_parts.join("\n");
    if stop_reason == "end_turn" {
        Ok(LlmResponse::Done(text))
    } else {
        Ok(LlmResponse::Text(text))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_response() {
        let body = serde_json::json!({
            "content": [{"type": "text", "text": "Scope drafted."}],
            "stop_reason": "end_turn"
        });
        match parse_claude_response(&body).unwrap() {
            LlmResponse::Done(text) => assert_eq!(text, "Scope drafted."),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_tool_use_response() {
        let body = serde_json::json!({
            "content": [
                {"type": "text", "text": "Saving the estimate."},
                {"type": "tool_use", "id": "toolu_1", "name": "write_artifact",
                 "input": {"relative_path": "finance/cost.md", "content": "x"}}
            ],
            "stop_reason": "tool_use"
        });
        match parse_claude_response(&body).unwrap() {
            LlmResponse::ToolUse { content, tool_calls } => {
                assert_eq!(content.as_deref(), Some("Saving the estimate."));
                assert_eq!(tool_calls[0].name, "write_artifact");
                assert_eq!(tool_calls[0].arguments["relative_path"], "finance/cost.md");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_max_tokens_is_partial_text() {
        let body = serde_json::json!({
            "content": [{"type": "text", "text": "Partial"}],
            "stop_reason": "max_tokens"
        });
        assert!(matches!(parse_claude_response(&body).unwrap(), LlmResponse::Text(_)));
    }

    #[test]
    fn test_parse_missing_content() {
        assert!(parse_claude_response(&serde_json::json!({"error": "x"})).is_err());
    }
}
