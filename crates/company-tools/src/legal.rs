use crate::tool::{json_success, str_arg, Tool, ToolDescriptor};
use async_trait::async_trait;
use company_core::{CompanyResult, ToolCall, ToolResult};
use serde_json::json;

/// Structured placeholder legal review of a contract or policy summary.
pub struct ContractReviewTool {
    descriptor: ToolDescriptor,
}

impl ContractReviewTool {
    /// Tool name.
    pub const NAME: &'static str = "contract_review";

    /// Build the tool.
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: Self::NAME.to_string(),
                description: "Return a simple legal review placeholder structure.".to_string(),
                parameters_schema: json!({
                    "type": "object",
                    "properties": {
                        "document_summary": {
                            "type": "string",
                            "description": "Short summary of the contract or policy"
                        }
                    },
                    "required": ["document_summary"]
                }),
                required_capabilities: vec![],
            },
        }
    }
}

impl Default for ContractReviewTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ContractReviewTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, call: ToolCall) -> CompanyResult<ToolResult> {
        json_success(
            &call.id,
            &json!({
                "document_summary": str_arg(&call, "document_summary"),
                "risk_level": "medium",
                "key_concerns": [
                    "Data processing terms need explicit consent language.",
                    "Liability limitations should be reviewed against jurisdiction.",
                    "Retention policy references need to match internal policy.",
                ],
                "recommended_actions": [
                    "Request legal redline review.",
                    "Confirm regulatory references are up to date.",
                ],
            }),
        )
    }
}

/// Baseline compliance checklist with every item pending.
pub struct ComplianceChecklistTool {
    descriptor: ToolDescriptor,
}

impl ComplianceChecklistTool {
    /// Tool name.
    pub const NAME: &'static str = "compliance_checklist";

    const ITEMS: [&'static str; 5] = [
        "Data classification completed",
        "Privacy notice updated",
        "Access controls documented",
        "Audit logging requirements defined",
        "Incident response ownership assigned",
    ];

    /// Build the tool.
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: Self::NAME.to_string(),
                description: "Return a baseline compliance checklist template.".to_string(),
                parameters_schema: json!({
                    "type": "object",
                    "properties": {
                        "product_scope": {
                            "type": "string",
                            "description": "Product or initiative scope"
                        }
                    },
                    "required": ["product_scope"]
                }),
                required_capabilities: vec![],
            },
        }
    }
}

impl Default for ComplianceChecklistTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ComplianceChecklistTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, call: ToolCall) -> CompanyResult<ToolResult> {
        let checklist: Vec<serde_json::Value> = Self::ITEMS
            .iter()
            .map(|item| json!({"item": item, "status": "pending"}))
            .collect();
        json_success(
            &call.id,
            &json!({
                "scope": str_arg(&call, "product_scope"),
                "checklist": checklist,
            }),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_contract_review_shape() {
        let tool = ContractReviewTool::new();
        let args = json!({"document_summary": "Vendor DPA"});
        let call = ToolCall::new("l1", "contract_review", args);
        let payload: serde_json::Value =
            serde_json::from_str(&tool.execute(call).await.unwrap().content).unwrap();
        assert_eq!(payload["risk_level"], "medium");
        assert_eq!(payload["key_concerns"].as_array().unwrap().len(), 3);
        assert_eq!(payload["recommended_actions"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_checklist_items_all_pending() {
        let tool = ComplianceChecklistTool::new();
        let args = json!({"product_scope": "Budgeting app"});
        let call = ToolCall::new("l2", "compliance_checklist", args);
        let payload: serde_json::Value =
            serde_json::from_str(&tool.execute(call).await.unwrap().content).unwrap();
        assert_eq!(payload["scope"], "Budgeting app");
        let items = payload["checklist"].as_array().unwrap();
        assert_eq!(items.len(), 5);
        assert!(items.iter().all(|i| i["status"] == "pending"));
    }
}
