use thiserror::Error;

/// A convenience `Result` alias using [`CompanyError`].
pub type CompanyResult<T> = Result<T, CompanyError>;

/// Top-level error type.
///
/// Tool-level failures (`ToolExecution`, `PathTraversal`) are normally turned
/// into error payloads at the tool boundary and handed back to the agent.
/// `Validation`, `Configuration`, `Template` and `CrewExecution` abort a run;
/// a failure inside a crew task reaches the flow as `CrewExecution`.
#[derive(Error, Debug)]
pub enum CompanyError {
    /// Empty or missing required input (CEO request, tool arguments).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced agent, task or tool key is absent, or a config file is malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A task description template could not be rendered.
    #[error("Template error: {0}")]
    Template(String),

    /// A tool's underlying operation failed (network, filesystem, subprocess).
    #[error("Tool '{tool}' failed: {message}")]
    ToolExecution {
        /// Name of the failing tool.
        tool: String,
        /// Human-readable failure description.
        message: String,
    },

    /// A task kept failing after the retry budget was spent.
    #[error("Crew '{crew}' failed at task '{task}': {reason}")]
    CrewExecution {
        /// Crew that was running.
        crew: String,
        /// Key of the task that failed.
        task: String,
        /// Last error observed.
        reason: String,
    },

    /// A requested path resolves outside its permitted root.
    #[error("Path traversal detected: '{0}' escapes the permitted root. Write denied.")]
    PathTraversal(String),

    /// An error from the agent reasoning loop.
    #[error("Agent error: {0}")]
    Agent(String),

    /// An error from an outbound HTTP request (LLM API call).
    #[error("HTTP error: {0}")]
    Http(String),

    /// A stage ordering or state invariant was violated.
    #[error("Flow error: {0}")]
    Flow(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
