#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use company_agent::{LlmBackend, LlmResponse};
use company_core::{CompanyResult, Message, ToolCall};
use company_crew::{AgentSpec, BackendFactory, Crew, CrewConfig, LlmTaskExecutor, TaskSpec};
use company_security::AuditLog;
use company_tools::{build_registry, ToolDescriptor, ToolSettings};
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// One conversation turn as a backend saw it.
#[derive(Debug, Clone)]
struct Seen {
    agent: String,
    tools: Vec<String>,
    messages: Vec<Message>,
}

type Scripts = Arc<Mutex<HashMap<String, VecDeque<LlmResponse>>>>;

struct ScriptedBackend {
    agent: String,
    scripts: Scripts,
    seen: Arc<Mutex<Vec<Seen>>>,
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn chat(
        &self,
        _system_prompt: Option<&str>,
        messages: &[Message],
        tools: &[ToolDescriptor],
    ) -> CompanyResult<LlmResponse> {
        self.seen.lock().unwrap().push(Seen {
            agent: self.agent.clone(),
            tools: tools.iter().map(|t| t.name.clone()).collect(),
            messages: messages.to_vec(),
        });
        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&self.agent)
            .and_then(VecDeque::pop_front);
        Ok(next.unwrap_or_else(|| LlmResponse::Done(format!("{} done", self.agent))))
    }
}

const AGENTS: &str = r#"
cfo:
  role: Chief Financial Officer
  goal: Approve budgets
  backstory: Careful.
  allow_delegation: true
financial_analyst:
  role: Financial Analyst
  goal: Estimate costs
  backstory: Precise.
"#;

const TASKS: &str = r#"
cfo_approval_gate:
  description: "Approve the budget for: {ceo_request}"
  expected_output: "A decision."
  agent: cfo
"#;

#[tokio::test]
async fn test_executive_delegates_to_coworker() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(
        build_registry(&ToolSettings::new(dir.path().join("artifacts"), dir.path())).unwrap(),
    );

    let scripts: Scripts = Arc::new(Mutex::new(HashMap::new()));
    scripts.lock().unwrap().insert(
        "cfo".into(),
        VecDeque::from(vec![
            LlmResponse::ToolUse {
                content: Some("Asking the analyst.".into()),
                tool_calls: vec![ToolCall::new(
                    "d1",
                    "delegate_work",
                    json!({
                        "coworker": "financial analyst",
                        "task": "Estimate the yearly cost",
                        "context": "Budgeting app, two engineers"
                    }),
                )],
            },
            LlmResponse::Done("APPROVED at $90k".into()),
        ]),
    );
    scripts.lock().unwrap().insert(
        "financial_analyst".into(),
        VecDeque::from(vec![LlmResponse::Done("Base case $90k".into())]),
    );
    let seen = Arc::new(Mutex::new(Vec::new()));

    let factory: BackendFactory = {
        let scripts = scripts.clone();
        let seen = seen.clone();
        Arc::new(move |agent: &AgentSpec| {
            Ok(Box::new(ScriptedBackend {
                agent: agent.key.clone(),
                scripts: scripts.clone(),
                seen: seen.clone(),
            }) as Box<dyn LlmBackend>)
        })
    };
    let executor = Arc::new(LlmTaskExecutor::new(
        factory,
        registry.clone(),
        Arc::new(AuditLog::disabled()),
    ));

    let config = CrewConfig::from_yaml(AGENTS, TASKS).unwrap();
    let agents = vec![
        AgentSpec::from_config(&config, "cfo", vec!["write_artifact".into()]).unwrap(),
        AgentSpec::from_config(&config, "financial_analyst", vec!["cost_model".into()]).unwrap(),
    ];
    let tasks = vec![TaskSpec::from_config(&config, "cfo_approval_gate", &agents).unwrap()];
    let crew = Crew::new("Finance Crew", agents, tasks, executor, registry).unwrap();

    let output = crew.kickoff("Launch a budgeting app").await.unwrap();
    assert_eq!(output.output, "APPROVED at $90k");

    let seen = seen.lock().unwrap().clone();
    let agents: Vec<&str> = seen.iter().map(|s| s.agent.as_str()).collect();
    assert_eq!(agents, vec!["cfo", "financial_analyst", "cfo"]);

    assert_eq!(seen[0].tools, vec!["write_artifact", "delegate_work"]);
    assert_eq!(seen[1].tools, vec!["cost_model"]);

    let delegated = &seen[1].messages[0].content;
    assert!(delegated.contains("Estimate the yearly cost"));
    assert!(delegated.contains("Budgeting app, two engineers"));

    let backfilled = seen[2].messages.last().unwrap();
    assert!(backfilled.content.contains("Base case $90k"));
}

#[tokio::test]
async fn test_unknown_coworker_is_reported_to_the_agent() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(
        build_registry(&ToolSettings::new(dir.path().join("artifacts"), dir.path())).unwrap(),
    );
    let scripts: Scripts = Arc::new(Mutex::new(HashMap::new()));
    scripts.lock().unwrap().insert(
        "cfo".into(),
        VecDeque::from(vec![LlmResponse::ToolUse {
            content: None,
            tool_calls: vec![ToolCall::new(
                "d1",
                "delegate_work",
                json!({"coworker": "Chief Marketing Officer", "task": "Write copy"}),
            )],
        }]),
    );
    let seen = Arc::new(Mutex::new(Vec::new()));
    let factory: BackendFactory = {
        let scripts = scripts.clone();
        let seen = seen.clone();
        Arc::new(move |agent: &AgentSpec| {
            Ok(Box::new(ScriptedBackend {
                agent: agent.key.clone(),
                scripts: scripts.clone(),
                seen: seen.clone(),
            }) as Box<dyn LlmBackend>)
        })
    };
    let executor = Arc::new(LlmTaskExecutor::new(
        factory,
        registry.clone(),
        Arc::new(AuditLog::disabled()),
    ));

    let config = CrewConfig::from_yaml(AGENTS, TASKS).unwrap();
    let agents = vec![
        AgentSpec::from_config(&config, "cfo", vec![]).unwrap(),
        AgentSpec::from_config(&config, "financial_analyst", vec![]).unwrap(),
    ];
    let tasks = vec![TaskSpec::from_config(&config, "cfo_approval_gate", &agents).unwrap()];
    let crew = Crew::new("Finance Crew", agents, tasks, executor, registry).unwrap();

    let output = crew.kickoff("r").await.unwrap();
    assert_eq!(output.output, "cfo done");

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);
    let backfilled = &seen[1].messages.last().unwrap().content;
    assert!(backfilled.contains("Unknown coworker"));
    assert!(backfilled.contains("Financial Analyst"));
}
