use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A side-effect domain a tool operates in.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Read files under the listed roots.
    FileRead { allowed_paths: Vec<String> },
    /// Write files under the listed roots.
    FileWrite { allowed_paths: Vec<String> },
    /// Outbound HTTP to the listed hosts (`*` for any public host).
    NetworkAccess { allowed_hosts: Vec<String> },
    /// Run shell commands in the listed working directories.
    ShellExec { allowed_commands: Vec<String> },
}

impl Capability {
    /// Short label used in logs and permission-denied payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Capability::FileRead { .. } => "file_read",
            Capability::FileWrite { .. } => "file_write",
            Capability::NetworkAccess { .. } => "network_access",
            Capability::ShellExec { .. } => "shell_exec",
        }
    }
}

/// The set of capabilities granted to a single agent invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionSet {
    capabilities: HashSet<Capability>,
}

impl PermissionSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant every capability in `caps`.
    pub fn grant_all<I: IntoIterator<Item = Capability>>(&mut self, caps: I) {
        self.capabilities.extend(caps);
    }

    /// Exact-match check.
    pub fn has(&self, cap: &Capability) -> bool {
        self.capabilities.contains(cap)
    }

    /// No capabilities granted.
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Number of distinct capabilities.
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }
}
