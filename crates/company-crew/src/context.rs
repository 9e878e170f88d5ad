use serde::Serialize;

/// Output of one completed task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskOutput {
    /// Task key.
    pub task: String,
    /// Role of the agent that produced it.
    pub agent_role: String,
    /// The agent's final answer.
    pub output: String,
}

/// What a task sees: the original request plus every earlier task's output
/// in this crew, in execution order.
#[derive(Debug, Clone)]
pub struct TaskContext {
    request: String,
    prior: Vec<TaskOutput>,
}

impl TaskContext {
    /// Empty context for `request`.
    pub fn new(request: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            prior: Vec::new(),
        }
    }

    /// The CEO request the crew was started with.
    pub fn request(&self) -> &str {
        &self.request
    }

    /// Outputs of the tasks finished so far.
    pub fn prior_outputs(&self) -> &[TaskOutput] {
        &self.prior
    }

    /// Record a finished task.
    pub fn push(&mut self, output: TaskOutput) {
        self.prior.push(output);
    }

    /// Every recorded output, in execution order.
    pub fn into_outputs(self) -> Vec<TaskOutput> {
        self.prior
    }

    /// Prior outputs as prompt text, or `None` before the first task finished.
    pub fn render_prior(&self) -> Option<String> {
        if self.prior.is_empty() {
            return None;
        }
        Some(
            self.prior
                .iter()
                .map(|p| format!("### {} ({})\n{}", p.task, p.agent_role, p.output.trim()))
                .collect::<Vec<_>>()
                .join("\n\n"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_prior_in_order() {
        let mut ctx = TaskContext::new("Launch a budgeting app");
        assert!(ctx.render_prior().is_none());
        ctx.push(TaskOutput {
            task: "product_scoping".into(),
            agent_role: "Product Owner".into(),
            output: "Scope v1\n".into(),
        });
        ctx.push(TaskOutput {
            task: "ux_flows".into(),
            agent_role: "UX Designer".into(),
            output: "Flows".into(),
        });
        let rendered = ctx.render_prior().unwrap();
        assert_eq!(
            rendered,
            "### product_scoping (Product Owner)\nScope v1\n\n### ux_flows (UX Designer)\nFlows"
        );
        assert_eq!(ctx.request(), "Launch a budgeting app");
    }
}
