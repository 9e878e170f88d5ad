use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

/// One line of `audit.jsonl`.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    /// When the action happened.
    pub timestamp: DateTime<Utc>,
    /// The flow run the action belongs to.
    pub run_id: Uuid,
    /// `tool_call`, `tool_result`, `tool_error`, `agent_response`.
    pub action: String,
    /// Tool involved, if any.
    pub tool_name: Option<String>,
    /// Action-specific payload.
    pub details: serde_json::Value,
    /// How the action ended.
    pub outcome: AuditOutcome,
}

/// Result of an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    /// Completed normally.
    Success,
    /// Refused because a required capability was not granted.
    Denied,
    /// Failed.
    Error,
}

/// Append-only audit log that records agent and tool activity as JSON lines.
///
/// Entries are written by a background task; call [`AuditLog::shutdown`]
/// before the runtime stops so queued entries reach the file.
pub struct AuditLog {
    tx: mpsc::UnboundedSender<AuditEntry>,
    writer: Option<JoinHandle<()>>,
}

impl AuditLog {
    /// Create a new AuditLog writing to `<log_dir>/audit.jsonl`.
    ///
    /// Spawns a background task, so it must be called inside a tokio runtime.
    pub fn new(log_dir: PathBuf) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<AuditEntry>();

        let writer = tokio::spawn(async move {
            if let Err(e) = tokio::fs::create_dir_all(&log_dir).await {
                warn!(dir = %log_dir.display(), error = %e, "Cannot create audit directory");
                return;
            }
            let log_file = log_dir.join("audit.jsonl");

            while let Some(entry) = rx.recv().await {
                let Ok(line) = serde_json::to_string(&entry) else {
                    continue;
                };
                let opened = tokio::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&log_file)
                    .await;
                match opened {
                    Ok(mut file) => {
                        if let Err(e) = file.write_all(format!("{line}\n").as_bytes()).await {
                            warn!(error = %e, "Audit write failed");
                        }
                    }
                    Err(e) => warn!(error = %e, "Audit file unavailable"),
                }
            }
        });

        Self {
            tx,
            writer: Some(writer),
        }
    }

    /// An audit log that discards every entry (still traced at debug level).
    pub fn disabled() -> Self {
        let (tx, _rx) = mpsc::unbounded_channel::<AuditEntry>();
        Self { tx, writer: None }
    }

    /// Queue an entry for writing.
    pub fn log(&self, entry: AuditEntry) {
        debug!(
            run_id = %entry.run_id,
            action = %entry.action,
            outcome = ?entry.outcome,
            "audit"
        );
        let _ = self.tx.send(entry);
    }

    /// Queue an entry stamped with the current time.
    pub fn log_action(
        &self,
        run_id: Uuid,
        action: impl Into<String>,
        tool_name: Option<String>,
        details: serde_json::Value,
        outcome: AuditOutcome,
    ) {
        self.log(AuditEntry {
            timestamp: Utc::now(),
            run_id,
            action: action.into(),
            tool_name,
            details,
            outcome,
        });
    }

    /// Close the log and wait until every queued entry has been written.
    pub async fn shutdown(self) {
        let Self { tx, writer } = self;
        drop(tx);
        if let Some(writer) = writer {
            if let Err(e) = writer.await {
                warn!(error = %e, "Audit writer task failed");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_audit_entries_are_appended_as_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let audit = AuditLog::new(dir.path().to_path_buf());
        let run_id = Uuid::new_v4();

        audit.log_action(
            run_id,
            "tool_call",
            Some("write_artifact".to_string()),
            json!({"call_id": "c1"}),
            AuditOutcome::Success,
        );
        audit.log_action(run_id, "agent_response", None, json!({}), AuditOutcome::Success);
        audit.shutdown().await;

        let content = std::fs::read_to_string(dir.path().join("audit.jsonl")).unwrap();
        assert_eq!(content.lines().count(), 2);
        let first: serde_json::Value =
            serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(first["action"], "tool_call");
        assert_eq!(first["tool_name"], "write_artifact");
    }

    #[tokio::test]
    async fn test_shutdown_flushes_every_queued_entry() {
        let dir = tempfile::tempdir().unwrap();
        let audit = AuditLog::new(dir.path().join("audit"));
        let run_id = Uuid::new_v4();
        for i in 0..200 {
            audit.log_action(run_id, "tool_call", None, json!({"n": i}), AuditOutcome::Success);
        }
        audit.shutdown().await;

        let path = dir.path().join("audit").join("audit.jsonl");
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 200);
        let last: serde_json::Value =
            serde_json::from_str(content.lines().last().unwrap()).unwrap();
        assert_eq!(last["details"]["n"], 199);
        assert_eq!(last["outcome"], "success");
    }

    #[tokio::test]
    async fn test_disabled_log_accepts_entries() {
        let audit = AuditLog::disabled();
        audit.log_action(Uuid::new_v4(), "noop", None, json!({}), AuditOutcome::Denied);
        audit.shutdown().await;
    }
}
