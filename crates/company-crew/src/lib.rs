//! Crews: role-specialized agents working through an ordered task list.
//!
//! A [`Crew`] executes its [`TaskSpec`]s strictly in order. Each task sees
//! the request and every prior output through a [`TaskContext`], runs on a
//! [`TaskExecutor`], and optionally persists its output via `write_artifact`.
//!
//! # Main entry points
//!
//! - [`Department`] — The four company crews, their rosters and task order.
//! - [`DepartmentCrew`] — A [`CrewRunner`] the orchestration flow can drive.
//! - [`LlmTaskExecutor`] — Runs tasks through the agent tool loop.

/// Agent specs.
pub mod agent;
/// YAML crew configuration.
pub mod config;
/// Task output accumulation.
pub mod context;
/// Sequential crew engine.
pub mod crew;
/// `delegate_work`.
pub mod delegation;
/// Department rosters and configuration.
pub mod departments;
/// Task executors.
pub mod executor;
/// The `CrewRunner` seam.
pub mod runner;
/// Task specs.
pub mod task;
/// Description templates.
pub mod template;

pub use agent::AgentSpec;
pub use config::{AgentConfig, CrewConfig, TaskConfig};
pub use context::{TaskContext, TaskOutput};
pub use crew::{Crew, CrewOutput};
pub use delegation::DelegateWorkTool;
pub use departments::Department;
pub use executor::{task_prompt, BackendFactory, LlmTaskExecutor, TaskExecutor};
pub use runner::{CrewRunner, DepartmentCrew};
pub use task::{TaskSpec, REQUEST_PLACEHOLDER};
