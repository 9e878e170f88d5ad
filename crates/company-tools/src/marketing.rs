use crate::tool::{json_success, Tool, ToolDescriptor};
use async_trait::async_trait;
use company_core::{CompanyError, CompanyResult, ToolCall, ToolResult};
use regex::{Regex, RegexBuilder};
use serde_json::json;

const RISKY_PATTERNS: [&str; 5] = [
    r"\bguarantee(d)?\b",
    r"\bzero risk\b",
    r"\b100%",
    r"\balways\b",
    r"\bnever fails?\b",
];

/// Case-insensitive heuristics for absolute marketing claims.
pub struct RiskyClaims {
    patterns: Vec<(&'static str, Regex)>,
}

impl RiskyClaims {
    /// Compile the claim patterns.
    pub fn new() -> CompanyResult<Self> {
        let patterns = RISKY_PATTERNS
            .iter()
            .map(|source| {
                RegexBuilder::new(source)
                    .case_insensitive(true)
                    .build()
                    .map(|re| (*source, re))
                    .map_err(|e| {
                        CompanyError::Configuration(format!("invalid claim pattern: {e}"))
                    })
            })
            .collect::<CompanyResult<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Source patterns that match `text`, in declaration order.
    pub fn flag(&self, text: &str) -> Vec<&'static str> {
        self.patterns
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(source, _)| *source)
            .collect()
    }
}

/// Flags risky marketing wording.
pub struct ClaimsCheckTool {
    descriptor: ToolDescriptor,
    claims: RiskyClaims,
}

impl ClaimsCheckTool {
    /// Tool name.
    pub const NAME: &'static str = "claims_check";

    /// Compile the claim patterns.
    pub fn new() -> CompanyResult<Self> {
        Ok(Self {
            descriptor: ToolDescriptor {
                name: Self::NAME.to_string(),
                description: "Flag risky marketing wording using simple heuristics.".to_string(),
                parameters_schema: json!({
                    "type": "object",
                    "properties": {
                        "text": {
                            "type": "string",
                            "description": "Marketing copy to check"
                        }
                    },
                    "required": ["text"]
                }),
                required_capabilities: vec![],
            },
            claims: RiskyClaims::new()?,
        })
    }
}

#[async_trait]
impl Tool for ClaimsCheckTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, call: ToolCall) -> CompanyResult<ToolResult> {
        let text = call.arguments["text"].as_str().unwrap_or_default();
        let flags = self.claims.flag(text);
        let recommendation = if flags.is_empty() {
            "No obvious risky claims detected."
        } else {
            "Replace absolute claims with measurable and qualified language."
        };
        json_success(
            &call.id,
            &json!({
                "risk_count": flags.len(),
                "matched_patterns": flags,
                "recommendation": recommendation,
            }),
        )
    }
}
