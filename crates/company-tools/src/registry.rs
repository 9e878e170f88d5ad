use crate::schema::validate_arguments;
use crate::tool::{Tool, ToolDescriptor};
use company_core::{CompanyError, CompanyResult, ToolCall, ToolResult};
use company_security::PermissionSet;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Central registry for all tools agents may call by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `tool`, replacing any tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.descriptor().name.clone();
        debug!(tool = %name, "Registered tool");
        self.tools.insert(name, tool);
    }

    /// The tool registered as `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Descriptors of every registered tool, unordered.
    pub fn list_descriptors(&self) -> Vec<&ToolDescriptor> {
        self.tools.values().map(|t| t.descriptor()).collect()
    }

    /// Descriptors for `names`, in the given order. Unknown names are a
    /// configuration error.
    pub fn descriptors_for(&self, names: &[String]) -> CompanyResult<Vec<ToolDescriptor>> {
        names
            .iter()
            .map(|name| {
                self.tools
                    .get(name)
                    .map(|t| t.descriptor().clone())
                    .ok_or_else(|| CompanyError::Configuration(format!("Unknown tool: {name}")))
            })
            .collect()
    }

    /// Permissions covering exactly the capabilities the named tools declare.
    pub fn permissions_for(&self, names: &[String]) -> CompanyResult<PermissionSet> {
        let mut permissions = PermissionSet::new();
        for descriptor in self.descriptors_for(names)? {
            permissions.grant_all(descriptor.required_capabilities);
        }
        Ok(permissions)
    }

    /// The first capability `tool` declares that `permissions` does not grant.
    /// Unknown tools have nothing to deny.
    pub fn denied_capability(
        &self,
        tool: &str,
        permissions: &PermissionSet,
    ) -> Option<&'static str> {
        self.tools
            .get(tool)?
            .descriptor()
            .required_capabilities
            .iter()
            .find(|cap| !permissions.has(cap))
            .map(|cap| cap.kind())
    }

    /// Execute a tool call: permission check, argument validation, then the tool.
    pub async fn execute(
        &self,
        call: ToolCall,
        permissions: &PermissionSet,
    ) -> CompanyResult<ToolResult> {
        let tool = self.tools.get(&call.name).ok_or_else(|| CompanyError::ToolExecution {
            tool: call.name.clone(),
            message: "unknown tool".to_string(),
        })?;

        if let Some(capability) = self.denied_capability(&call.name, permissions) {
            warn!(tool = %call.name, capability, "Permission denied for tool execution");
            return Ok(ToolResult::error_payload(
                &call.id,
                format!(
                    "Permission denied: tool '{}' requires capability {}",
                    call.name, capability
                ),
                serde_json::Value::Null,
            ));
        }

        let descriptor = tool.descriptor();
        validate_arguments(&descriptor.name, &descriptor.parameters_schema, &call.arguments)?;
        tool.execute(call).await
    }

    /// Number of registered tools.
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }
}
