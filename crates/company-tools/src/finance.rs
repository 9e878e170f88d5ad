use crate::tool::{json_success, str_arg, Tool, ToolDescriptor};
use async_trait::async_trait;
use company_core::{CompanyResult, ToolCall, ToolResult};
use serde_json::json;

/// Low/base/high cost estimation template for an initiative.
pub struct CostModelTool {
    descriptor: ToolDescriptor,
}

impl CostModelTool {
    /// Tool name.
    pub const NAME: &'static str = "cost_model";

    /// Build the tool.
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: Self::NAME.to_string(),
                description: "Return a low/base/high cost estimation template.".to_string(),
                parameters_schema: json!({
                    "type": "object",
                    "properties": {
                        "initiative": {
                            "type": "string",
                            "description": "Name or summary of the initiative"
                        }
                    },
                    "required": ["initiative"]
                }),
                required_capabilities: vec![],
            },
        }
    }
}

impl Default for CostModelTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for CostModelTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, call: ToolCall) -> CompanyResult<ToolResult> {
        json_success(
            &call.id,
            &json!({
                "initiative": str_arg(&call, "initiative"),
                "currency": "USD",
                "estimate": {
                    "low": 50_000,
                    "base": 90_000,
                    "high": 150_000,
                },
                "drivers": [
                    "Engineering staffing",
                    "Model/API usage",
                    "Security and compliance review effort",
                    "QA and release hardening",
                ],
            }),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_estimate_is_ordered() {
        let tool = CostModelTool::new();
        let call = ToolCall::new("f1", "cost_model", json!({"initiative": "Budgeting app"}));
        let result = tool.execute(call).await.unwrap();
        let payload: serde_json::Value = serde_json::from_str(&result.content).unwrap();
        assert_eq!(payload["initiative"], "Budgeting app");
        let low = payload["estimate"]["low"].as_u64().unwrap();
        let base = payload["estimate"]["base"].as_u64().unwrap();
        let high = payload["estimate"]["high"].as_u64().unwrap();
        assert!(low < base && base < high);
        assert_eq!(payload["drivers"].as_array().unwrap().len(), 4);
    }
}
