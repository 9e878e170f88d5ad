//! LLM access and the agentic tool loop.
//!
//! # Main types
//!
//! - [`ModelConfig`] / [`LlmProvider`] — Which model to call and how.
//! - [`LlmBackend`] — Provider abstraction (Claude, OpenAI-compatible).
//! - [`FailoverBackend`] / [`RetryPolicy`] — Retries with backoff and fallback models.
//! - [`AgentRunner`] — Prompt → LLM → tool calls → backfill loop for one agent.

/// Provider backends.
pub mod backends;
/// Model configuration.
pub mod config;
/// Bounded message history.
pub mod context;
/// Retry and failover.
pub mod failover;
/// Client and response types.
pub mod llm;
/// The agentic loop.
pub mod runner;

pub use backends::LlmBackend;
pub use config::{LlmProvider, ModelConfig};
pub use context::ContextWindow;
pub use failover::{compute_backoff, is_retryable, FailoverBackend, RetryPolicy};
pub use llm::{build_backend, LlmClient, LlmResponse};
pub use runner::AgentRunner;
