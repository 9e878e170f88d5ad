use crate::backends::LlmBackend;
use crate::llm::LlmResponse;
use async_trait::async_trait;
use company_core::{CompanyError, CompanyResult, Message};
use company_tools::ToolDescriptor;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Configures retry behaviour for failover across LLM backends and for
/// task-level retries in a crew.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of retries before giving up (or moving to the next backend).
    pub max_retries: u32,
    /// Base delay in milliseconds for exponential backoff.
    pub backoff_base_ms: u64,
    /// Maximum delay in milliseconds (cap for exponential backoff).
    pub backoff_max_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 500,
            backoff_max_ms: 30_000,
        }
    }
}

impl RetryPolicy {
    /// No retries, no delay.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff_base_ms: 0,
            backoff_max_ms: 0,
        }
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(compute_backoff(self, attempt))
    }
}

/// Determines whether an error is transient and worth retrying.
///
/// Rate limits (429), timeouts, connection failures and 5xx responses are
/// retryable; 400/401/403 are not expected to succeed on retry.
pub fn is_retryable(err: &CompanyError) -> bool {
    let lower = err.to_string().to_lowercase();

    if lower.contains("400") || lower.contains("401") || lower.contains("403") {
        return false;
    }

    lower.contains("429")
        || lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("error sending request")
        || lower.contains("500")
        || lower.contains("502")
        || lower.contains("503")
        || lower.contains("504")
}

/// Exponential backoff for `attempt`, capped at `backoff_max_ms`.
pub fn compute_backoff(policy: &RetryPolicy, attempt: u32) -> u64 {
    let delay = policy
        .backoff_base_ms
        .saturating_mul(2u64.saturating_pow(attempt));
    delay.min(policy.backoff_max_ms)
}

/// An `LlmBackend` that wraps multiple backends and performs automatic
/// failover with exponential-backoff retries.
///
/// Backends are tried in order. Within each backend, transient errors are
/// retried up to `max_retries` times; a non-retryable error moves on to the
/// next backend immediately. If every backend fails, the last error is returned.
pub struct FailoverBackend {
    backends: Vec<Box<dyn LlmBackend>>,
    policy: RetryPolicy,
}

impl FailoverBackend {
    /// Fails with `Configuration` when `backends` is empty.
    pub fn new(backends: Vec<Box<dyn LlmBackend>>, policy: RetryPolicy) -> CompanyResult<Self> {
        if backends.is_empty() {
            return Err(CompanyError::Configuration(
                "FailoverBackend requires at least one backend".into(),
            ));
        }
        Ok(Self { backends, policy })
    }
}

#[async_trait]
impl LlmBackend for FailoverBackend {
    async fn chat(
        &self,
        system_prompt: Option<&str>,
        messages: &[Message],
        tools: &[ToolDescriptor],
    ) -> CompanyResult<LlmResponse> {
        let mut last_err: Option<CompanyError> = None;

        for (backend_idx, backend) in self.backends.iter().enumerate() {
            for attempt in 0..=self.policy.max_retries {
                match backend.chat(system_prompt, messages, tools).await {
                    Ok(resp) => return Ok(resp),
                    Err(e) => {
                        if !is_retryable(&e) {
                            warn!(
                                backend = backend_idx,
                                attempt,
                                error = %e,
                                "Non-retryable error, moving to next backend"
                            );
                            last_err = Some(e);
                            break;
                        }

                        if attempt < self.policy.max_retries {
                            let delay = compute_backoff(&self.policy, attempt);
                            info!(
                                backend = backend_idx,
                                attempt,
                                delay_ms = delay,
                                error = %e,
                                "Retryable error, backing off"
                            );
                            tokio::time::sleep(Duration::from_millis(delay)).await;
                        }
                        last_err = Some(e);
                    }
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| CompanyError::Agent("All failover backends exhausted".into())))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Returns scripted results in order, counting calls.
    struct ScriptedBackend {
        results: tokio::sync::Mutex<Vec<CompanyResult<LlmResponse>>>,
        calls: Arc<AtomicU32>,
    }

    impl ScriptedBackend {
        fn new(results: Vec<CompanyResult<LlmResponse>>) -> (Self, Arc<AtomicU32>) {
            let calls = Arc::new(AtomicU32::new(0));
            (
                Self {
                    results: tokio::sync::Mutex::new(results),
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl LlmBackend for ScriptedBackend {
        async fn chat(
            &self,
            _system_prompt: Option<&str>,
            _messages: &[Message],
            _tools: &[ToolDescriptor],
        ) -> CompanyResult<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut results = self.results.lock().await;
            if results.is_empty() {
                Err(CompanyError::Agent("no more results".into()))
            } else {
                results.remove(0)
            }
        }
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            backoff_base_ms: 1,
            backoff_max_ms: 2,
        }
    }

    #[test]
    fn test_compute_backoff_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(compute_backoff(&policy, 0), 500);
        assert_eq!(compute_backoff(&policy, 1), 1000);
        assert_eq!(compute_backoff(&policy, 10), 30_000);
        assert_eq!(compute_backoff(&policy, 64), 30_000);
    }

    #[test]
    fn test_is_retryable() {
        assert!(is_retryable(&CompanyError::Http("Claude API error 429 Too Many Requests".into())));
        assert!(is_retryable(&CompanyError::Http("operation timed out".into())));
        assert!(!is_retryable(&CompanyError::Http("Claude API error 400 Bad Request".into())));
        assert!(!is_retryable(&CompanyError::Http("OpenAI API error 401 Unauthorized".into())));
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let (backend, calls) = ScriptedBackend::new(vec![
            Err(CompanyError::Http("503 Service Unavailable".into())),
            Ok(LlmResponse::Done("ok".into())),
        ]);
        let failover = FailoverBackend::new(vec![Box::new(backend)], fast_policy(2)).unwrap();
        let resp = failover.chat(None, &[], &[]).await.unwrap();
        assert!(matches!(resp, LlmResponse::Done(t) if t == "ok"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_moves_to_fallback() {
        let (primary, primary_calls) =
            ScriptedBackend::new(vec![Err(CompanyError::Http("400 Bad Request".into()))]);
        let (fallback, fallback_calls) =
            ScriptedBackend::new(vec![Ok(LlmResponse::Done("from fallback".into()))]);
        let backends: Vec<Box<dyn LlmBackend>> = vec![Box::new(primary), Box::new(fallback)];
        let failover = FailoverBackend::new(backends, fast_policy(3)).unwrap();

        let resp = failover.chat(None, &[], &[]).await.unwrap();
        assert!(matches!(resp, LlmResponse::Done(t) if t == "from fallback"));
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_backends_exhausted_returns_last_error() {
        let (backend, calls) = ScriptedBackend::new(vec![
            Err(CompanyError::Http("502".into())),
            Err(CompanyError::Http("502".into())),
        ]);
        let failover = FailoverBackend::new(vec![Box::new(backend)], fast_policy(1)).unwrap();
        let err = failover.chat(None, &[], &[]).await.unwrap_err();
        assert!(err.to_string().contains("502"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_empty_backend_list_is_rejected() {
        assert!(FailoverBackend::new(vec![], RetryPolicy::default()).is_err());
    }
}
