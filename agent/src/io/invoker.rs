//! Invoker abstraction for diagnostic tool execution.
//!
//! The [`Invoker`] trait decouples the loop orchestration from the actual
//! tool backends (currently file-backed analyzers). Tests use scripted
//! invokers that return predetermined payloads without touching the
//! filesystem. [`invoke_with_policy`] wraps an invocation with latency
//! measurement, a per-tool timeout and bounded retry, and always returns a
//! [`ToolResult`] — tool failure is data, never an orchestrator error.

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::core::types::{AdsMode, Flags, ToolData, ToolKind, ToolMeta, ToolResult};
use crate::io::tools;

/// Parameters for a tool invocation.
#[derive(Debug, Clone)]
pub struct InvokeRequest {
    pub tool: ToolKind,
    /// Directory holding the scenario's data files.
    pub scenario_dir: PathBuf,
    pub flags: Flags,
    /// Aggregation level for the ads tool; ignored by the others.
    pub ads_mode: AdsMode,
}

/// Tool-level failure. Missing data is kept distinct from other failures so
/// fallback messaging can be tool-aware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// A required data file is absent (or its absence was simulated).
    MissingData(String),
    /// The tool ran but could not produce a result.
    Failed(String),
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolError::MissingData(msg) => write!(f, "missing data: {msg}"),
            ToolError::Failed(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ToolError {}

/// Abstraction over tool execution backends.
pub trait Invoker {
    /// Run one tool and return its typed payload.
    fn invoke(&self, request: &InvokeRequest) -> Result<ToolData, ToolError>;
}

/// Invoker that reads and analyzes the scenario's JSON data files.
pub struct FsInvoker;

impl Invoker for FsInvoker {
    fn invoke(&self, request: &InvokeRequest) -> Result<ToolData, ToolError> {
        tools::run_tool(request)
    }
}

/// Resource discipline around a single tool call.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Wall-clock budget per invocation; overruns surface as failures.
    pub timeout: Duration,
    /// Total attempts (initial call plus retries).
    pub max_attempts: u32,
    /// Base backoff, doubled per retry.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 2,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Invoke a tool under the given policy and package the outcome.
pub fn invoke_with_policy<I: Invoker>(
    invoker: &I,
    request: &InvokeRequest,
    policy: &RetryPolicy,
) -> ToolResult {
    let source = request
        .scenario_dir
        .join(tools::data_file(request.tool, request.ads_mode))
        .display()
        .to_string();
    let start = Instant::now();
    let attempts = policy.max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        // The timeout budget is per attempt; a slow attempt must not bleed
        // into the next one's budget.
        let attempt_start = Instant::now();
        let outcome = invoker.invoke(request);
        let elapsed = attempt_start.elapsed();

        match outcome {
            // File-backed tools complete quickly; overruns are classified as
            // timeouts rather than cancelled mid-flight.
            Ok(_) if elapsed > policy.timeout => {
                last_error = format!("{} timed out after {elapsed:?}", request.tool);
            }
            Ok(data) => {
                debug!(tool = %request.tool, attempt, latency_ms = elapsed.as_millis() as u64, "tool succeeded");
                return ToolResult {
                    tool: request.tool,
                    ok: true,
                    data: Some(data),
                    meta: ToolMeta {
                        latency_ms: elapsed.as_millis() as u64,
                        source,
                        attempts: attempt,
                    },
                    error: None,
                };
            }
            Err(err) => {
                last_error = err.to_string();
            }
        }

        if attempt < attempts {
            let delay = policy.backoff * 2u32.saturating_pow(attempt - 1);
            warn!(tool = %request.tool, attempt, error = %last_error, "tool failed, retrying");
            std::thread::sleep(delay);
        }
    }

    warn!(tool = %request.tool, error = %last_error, "tool failed after {attempts} attempts");
    ToolResult {
        tool: request.tool,
        ok: false,
        data: None,
        meta: ToolMeta {
            latency_ms: start.elapsed().as_millis() as u64,
            source,
            attempts,
        },
        error: Some(last_error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FlakyInvoker {
        calls: Cell<u32>,
        succeed_on: u32,
    }

    impl Invoker for FlakyInvoker {
        fn invoke(&self, _request: &InvokeRequest) -> Result<ToolData, ToolError> {
            let call = self.calls.get() + 1;
            self.calls.set(call);
            if call >= self.succeed_on {
                Ok(ToolData::AdsCampaign(crate::core::types::AdsCampaignReport {
                    campaign_count: 0,
                    total_spend: 0.0,
                    total_sales: 0.0,
                }))
            } else {
                Err(ToolError::MissingData("not yet".to_string()))
            }
        }
    }

    fn request() -> InvokeRequest {
        InvokeRequest {
            tool: ToolKind::AdsMetrics,
            scenario_dir: PathBuf::from("/tmp/scenario"),
            flags: Flags::default(),
            ads_mode: AdsMode::Campaign,
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_secs(5),
            max_attempts: 2,
            backoff: Duration::ZERO,
        }
    }

    #[test]
    fn retry_recovers_from_transient_failure() {
        let invoker = FlakyInvoker {
            calls: Cell::new(0),
            succeed_on: 2,
        };
        let result = invoke_with_policy(&invoker, &request(), &fast_policy());
        assert!(result.ok);
        assert_eq!(result.meta.attempts, 2);
        assert!(result.error.is_none());
    }

    #[test]
    fn failure_surfaces_after_attempts_exhausted() {
        let invoker = FlakyInvoker {
            calls: Cell::new(0),
            succeed_on: 10,
        };
        let result = invoke_with_policy(&invoker, &request(), &fast_policy());
        assert!(!result.ok);
        assert!(result.data.is_none());
        assert_eq!(result.meta.attempts, 2);
        assert!(result.error.as_deref().expect("error").contains("not yet"));
        assert_eq!(invoker.calls.get(), 2);
    }

    struct SlowFirstInvoker {
        calls: Cell<u32>,
    }

    impl Invoker for SlowFirstInvoker {
        fn invoke(&self, _request: &InvokeRequest) -> Result<ToolData, ToolError> {
            let call = self.calls.get() + 1;
            self.calls.set(call);
            if call == 1 {
                std::thread::sleep(Duration::from_millis(50));
            }
            Ok(ToolData::AdsCampaign(crate::core::types::AdsCampaignReport {
                campaign_count: 0,
                total_spend: 0.0,
                total_sales: 0.0,
            }))
        }
    }

    #[test]
    fn timeout_is_measured_per_attempt() {
        let invoker = SlowFirstInvoker {
            calls: Cell::new(0),
        };
        let policy = RetryPolicy {
            timeout: Duration::from_millis(20),
            max_attempts: 2,
            backoff: Duration::ZERO,
        };
        // First attempt overruns and is retried; the fast second attempt
        // must succeed on its own clock.
        let result = invoke_with_policy(&invoker, &request(), &policy);
        assert!(result.ok);
        assert_eq!(result.meta.attempts, 2);
    }

    #[test]
    fn source_names_the_backing_data_file() {
        let invoker = FlakyInvoker {
            calls: Cell::new(0),
            succeed_on: 1,
        };
        let result = invoke_with_policy(&invoker, &request(), &fast_policy());
        assert!(result.meta.source.ends_with("ads_campaign.json"));
    }
}
