//! Core types and error definitions shared by every company-ai crate.
//!
//! # Main types
//!
//! - [`CompanyError`] — Unified error enum for tools, crews and the flow.
//! - [`CompanyResult`] — Convenience alias for `Result<T, CompanyError>`.
//! - [`Message`] / [`Role`] — Conversation turns exchanged with an LLM.
//! - [`ToolCall`] — An LLM-initiated tool invocation request.
//! - [`ToolResult`] — The text (or structured error payload) a tool returns.

/// Error taxonomy.
pub mod error;
/// Conversation messages.
pub mod message;
/// Tool call and result types.
pub mod tool;

pub use error::{CompanyError, CompanyResult};
pub use message::{Message, Role};
pub use tool::{ToolCall, ToolResult};
