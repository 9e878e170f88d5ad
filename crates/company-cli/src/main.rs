mod config;

use crate::config::{CompanyConfig, LogFormat};
use clap::{CommandFactory, Parser};
use company_agent::ModelConfig;
use company_crew::LlmTaskExecutor;
use company_flow::OrganizationFlow;
use company_security::{AuditLog, Capability};
use company_tools::{build_registry, InternetSettings, ToolRegistry};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "company-ai",
    version,
    about = "Run a CEO request through the AI company's crews and write a consolidated report"
)]
struct Cli {
    /// The CEO request. All words are joined with spaces.
    #[arg(value_name = "REQUEST")]
    request: Vec<String>,

    /// Path to config file (default: company.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the final report (overrides config)
    #[arg(long)]
    report_path: Option<PathBuf>,

    /// Root directory for task artifacts (overrides config)
    #[arg(long)]
    artifacts_dir: Option<PathBuf>,

    /// Directory with `<department>/agents.yaml` and `tasks.yaml` overrides
    #[arg(long)]
    crew_config_dir: Option<PathBuf>,

    /// Run the Finance and Compliance crews one after the other
    #[arg(long)]
    sequential: bool,

    /// List the tools agents can be bound to and exit
    #[arg(long)]
    list_tools: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: failed to load .env: {e}");
        }
    }

    let request = request_text(&cli);
    if request.is_none() && !cli.list_tools {
        eprintln!("{}", Cli::command().render_usage());
        eprintln!("A CEO request is required, e.g. company-ai \"Launch a budgeting app\"");
        return ExitCode::FAILURE;
    }

    let mut config = match config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);
    apply_overrides(&cli, &mut config);

    if cli.list_tools {
        return match tool_registry(&config) {
            Ok(registry) => {
                print_tools(&registry);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {e:#}");
                ExitCode::FAILURE
            }
        };
    }
    let Some(request) = request else {
        return ExitCode::FAILURE;
    };

    match run(config, &request).await {
        Ok(report) => {
            println!("Flow completed. Final report: {}", report.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// The request words joined with spaces, or `None` when blank.
fn request_text(cli: &Cli) -> Option<String> {
    let request = cli.request.join(" ").trim().to_string();
    (!request.is_empty()).then_some(request)
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

fn apply_overrides(cli: &Cli, config: &mut CompanyConfig) {
    if let Some(path) = &cli.report_path {
        config.flow.report_path = path.clone();
    }
    if let Some(dir) = &cli.artifacts_dir {
        config.tools.artifacts_dir = dir.clone();
    }
    if let Some(dir) = &cli.crew_config_dir {
        config.flow.crew_config_dir = Some(dir.clone());
    }
    if cli.sequential {
        config.flow.parallel_departments = false;
    }
}

fn tool_registry(config: &CompanyConfig) -> anyhow::Result<ToolRegistry> {
    let settings = config.tools.settings(InternetSettings::from_env());
    Ok(build_registry(&settings)?)
}

async fn run(config: CompanyConfig, request: &str) -> anyhow::Result<PathBuf> {
    let mut model = config.model.clone();
    model.resolve_api_keys(&|name: &str| std::env::var(name).ok());
    warn_missing_keys(&model);

    let run_id = Uuid::new_v4();
    let registry = Arc::new(tool_registry(&config)?);
    let audit = Arc::new(AuditLog::new(config.tools.artifacts_dir.join("audit")));
    let executor = Arc::new(
        LlmTaskExecutor::from_model_config(model.clone(), registry.clone(), audit.clone())
            .with_run_id(run_id),
    );

    let flow = OrganizationFlow::from_departments(
        executor,
        registry,
        config.flow.crew_config_dir.as_deref(),
        config.flow.task_retry.clone(),
        config.flow.report_path.clone(),
    )?
    .with_parallel_departments(config.flow.parallel_departments);

    info!(
        run_id = %run_id,
        provider = ?model.provider,
        model = %model.model_id,
        parallel = config.flow.parallel_departments,
        "Starting company flow"
    );
    let report = flow.kickoff(request).await;

    drop(flow);
    match Arc::try_unwrap(audit) {
        Ok(audit) => audit.shutdown().await,
        Err(_) => warn!(run_id = %run_id, "Audit log still in use, entries may be lost"),
    }
    Ok(report?)
}

fn warn_missing_keys(model: &ModelConfig) {
    let mut pending: Vec<&ModelConfig> = vec![model];
    while let Some(m) = pending.pop() {
        if m.api_key.trim().is_empty() && m.api_base_url.is_none() {
            let var = m.provider.api_key_env();
            warn!(provider = ?m.provider, env = var, "No API key configured");
        }
        pending.extend(m.fallback_models.iter());
    }
}

fn print_tools(registry: &ToolRegistry) {
    let mut tools = registry.list_descriptors();
    tools.sort_by(|a, b| a.name.cmp(&b.name));
    println!("Registered tools:");
    for tool in &tools {
        println!("  {}: {}", tool.name, tool.description);
        for cap in &tool.required_capabilities {
            let scope = match cap {
                Capability::FileRead { allowed_paths } => format!("{allowed_paths:?}"),
                Capability::FileWrite { allowed_paths } => format!("{allowed_paths:?}"),
                Capability::NetworkAccess { allowed_hosts } => format!("{allowed_hosts:?}"),
                Capability::ShellExec { allowed_commands } => format!("{allowed_commands:?}"),
            };
            println!("      {}: {scope}", cap.kind());
        }
    }
    println!("\nTotal: {} tool(s)", tools.len());
}
