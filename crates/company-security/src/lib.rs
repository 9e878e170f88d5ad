//! Security primitives: capabilities, the audit trail, and root-confined paths.
//!
//! # Main types
//!
//! - [`Capability`] — A permission a tool needs (file, network, shell).
//! - [`PermissionSet`] — The capabilities granted to one agent invocation.
//! - [`AuditLog`] — Append-only JSONL trail of tool activity.
//! - [`ConfinedRoot`] — Resolves user-supplied relative paths inside a root.

/// Audit logging module.
pub mod audit;
/// Capability and permission definitions.
pub mod capability;
/// Root-confined path resolution.
pub mod paths;

pub use audit::{AuditLog, AuditOutcome};
pub use capability::{Capability, PermissionSet};
pub use paths::ConfinedRoot;
